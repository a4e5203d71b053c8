use idl_gen::{CppCodeGenerator, CppCodeGeneratorOptions, GeneratedFile};
use idl_types::ObjectNode;

fn generate(node: &ObjectNode) -> Vec<GeneratedFile> {
    CppCodeGenerator::new(CppCodeGeneratorOptions::default())
        .emit_code(node)
        .expect("fixture should generate")
}

fn contents<'a>(files: &'a [GeneratedFile], name: &str) -> &'a str {
    &files
        .iter()
        .find(|file| file.name == name)
        .unwrap_or_else(|| panic!("{} was not generated", name))
        .contents
}

#[test]
fn yaml_model_generates_without_xml() {
    let node: ObjectNode =
        serde_yml::from_str(include_str!("fixtures/sensor.yaml")).expect("valid YAML model");
    let files = generate(&node);

    let types = contents(&files, "SensorTypes.h");
    assert!(types.contains("struct readingsStruct{\n    unsigned long long member0;\n    double member1;\n};\n"));
    assert!(types.contains("SENSOR_OBJECT_PATH"));

    let header = contents(&files, "SensorClient.h");
    assert!(header.contains(
        "QStatus Samples(unsigned long long since, readingsStruct *&readings, size_t& readingsNumElements);"
    ));
    assert!(header.contains("QStatus GetUnit(String& unit);"));

    let service = contents(&files, "SensorService.cc");
    assert!(service.contains(
        "return Signal(destination, sessionId, *member, args, 1, 0, ALLJOYN_FLAG_ENCRYPTED);"
    ));
}

#[test]
fn json_model_keeps_parent_interfaces_apart() {
    let node: ObjectNode = serde_json::from_str(include_str!("fixtures/switchboard.json"))
        .expect("valid JSON model");
    let files = generate(&node);

    let client = contents(&files, "SwitchboardClient.cc");
    assert!(client.contains(
        "MethodCall(\"org.example.Relay\", \"Open\", args, 1, replyMsg, ProxyBusObject::DefaultCallTimeout, ALLJOYN_FLAG_ENCRYPTED);"
    ));
    assert!(client.contains("SetProperty(\"org.example.Switch\", \"labels\", propValue);"));

    let service = contents(&files, "SwitchboardService.cc");
    assert!(service.contains("if (!val.HasSignature(\"a{ys}\")) {"));
}
