use idl_gen::{CppCodeGenerator, CppCodeGeneratorOptions, GenError, GeneratedFile, Registry};
use idl_loader::{LoaderOptions, XmlLoader};
use idl_types::ObjectNode;

fn load(xml: &str) -> ObjectNode {
    let mut loader = XmlLoader::new(LoaderOptions::default());
    loader.load_str(xml).expect("fixture should load");
    loader.into_objects().remove(0)
}

fn generate(xml: &str) -> Result<Vec<GeneratedFile>, GenError> {
    let generator = CppCodeGenerator::new(CppCodeGeneratorOptions {
        well_known_name: Some("org.example.Test".to_string()),
        emit_service: true,
    });
    generator.emit_code(&load(xml))
}

fn file<'a>(files: &'a [GeneratedFile], name: &str) -> &'a str {
    &files
        .iter()
        .find(|file| file.name == name)
        .unwrap_or_else(|| panic!("{} was not generated", name))
        .contents
}

#[test]
fn scalar_string_argument_has_no_composites() {
    let files = generate(
        r#"
<node name="Greeter">
  <interface name="org.example.Greeter">
    <method name="Greet">
      <arg name="greeting" type="s" direction="in"/>
    </method>
  </interface>
</node>
"#,
    )
    .unwrap();

    let types = file(&files, "GreeterTypes.h");
    assert!(!types.contains("struct "));

    let client = file(&files, "GreeterClient.cc");
    assert!(client.contains("    args[0].Set(\"s\", greeting.c_str());\n"));
    assert!(!client.contains("temp"));
    assert!(client.contains(
        "status = proxyBusObj->MethodCall(\"org.example.Greeter\", \"Greet\", args, 1, replyMsg);"
    ));

    let service = file(&files, "GreeterService.cc");
    assert!(service.contains("        char *tempgreeting;\n"));
    assert!(service.contains("        Greet(greeting);\n"));
    assert!(service.contains("    return MethodReply(msg, static_cast<const MsgArg *>(NULL), 0);\n"));
}

#[test]
fn dictionary_property_is_copied_out_of_the_reply() {
    let files = generate(
        r#"
<node name="Stats">
  <interface name="org.example.Stats">
    <property name="counts" type="a{si}" access="read"/>
  </interface>
</node>
"#,
    )
    .unwrap();

    let types = file(&files, "StatsTypes.h");
    assert!(types.contains("struct countsDictEntry{\n    String key;\n    int value;\n};\n"));
    assert!(types.contains("iface->AddProperty(\"counts\", \"a{si}\", PROP_ACCESS_READ);"));

    let header = file(&files, "StatsClient.h");
    assert!(header.contains("QStatus GetCounts(countsDictEntry *&counts, size_t& countsNumElements);"));
    assert!(!header.contains("SetCounts"));

    let client = file(&files, "StatsClient.cc");
    assert!(client.contains(
        "    propValue.Get(\"a{si}\", &countsNumElements, &tempcountsDictEntries);\n\
         \x20   counts = new countsDictEntry[countsNumElements];\n\
         \x20   for (size_t i0 = 0; i0 < countsNumElements; i0++) {\n\
         \x20       char *tempcountsi0_key;\n\
         \x20       tempcountsDictEntries[i0].Get(\"{si}\", &tempcountsi0_key, &counts[i0].value);\n\
         \x20       counts[i0].key = tempcountsi0_key;\n\
         \x20   }\n"
    ));

    let service = file(&files, "StatsService.cc");
    assert!(service.contains("tempcountsDictEntries[i0].Set(\"{si}\", counts[i0].key.c_str(), counts[i0].value);"));
    assert!(service.contains("        return ER_BUS_PROPERTY_ACCESS_DENIED;\n"));
}

#[test]
fn same_name_with_different_struct_signature_collides() {
    let err = generate(
        r#"
<node name="Plotter">
  <interface name="org.example.Plotter">
    <method name="MoveTo">
      <arg name="point" type="(ii)" direction="in"/>
    </method>
    <method name="Label">
      <arg name="point" type="(ss)" direction="in"/>
    </method>
  </interface>
</node>
"#,
    )
    .unwrap_err();
    match err {
        GenError::NameCollision { name, .. } => assert_eq!(name, "pointStruct"),
        other => panic!("expected a collision, got {}", other),
    }
}

#[test]
fn struct_array_parameters_and_packing() {
    let files = generate(
        r#"
<node name="Journal">
  <interface name="org.example.Journal">
    <method name="Append">
      <arg name="records" type="a(is)" direction="in"/>
    </method>
  </interface>
</node>
"#,
    )
    .unwrap();

    let types = file(&files, "JournalTypes.h");
    assert!(types.contains("struct recordsStruct{\n    int member0;\n    String member1;\n};\n"));

    let header = file(&files, "JournalClient.h");
    assert!(header.contains(
        "QStatus Append(const recordsStruct *records, size_t recordsNumElements);"
    ));

    let client = file(&files, "JournalClient.cc");
    let buffer = client
        .find("MsgArg *temprecordsArg = new MsgArg[recordsNumElements];")
        .expect("buffer allocation");
    let fill = client
        .find("temprecordsArg[i0].Set(\"(is)\", records[i0].member0, records[i0].member1.c_str());")
        .expect("buffer fill");
    let pack = client
        .find("args[0].Set(\"a(is)\", recordsNumElements, temprecordsArg);")
        .expect("final pack");
    assert!(buffer < fill && fill < pack);

    let methods = file(&files, "JournalServiceMethods.cc");
    assert!(methods.contains(
        "void JournalService::Append(const recordsStruct *records, size_t recordsNumElements)\n"
    ));
}

#[test]
fn signals_round_trip_through_client_and_service() {
    let files = generate(
        r#"
<node name="Door">
  <interface name="org.example.Door">
    <signal name="Opened">
      <annotation name="org.alljoyn.Bus.Item.IsSecure" value="true"/>
      <arg name="by" type="s"/>
      <arg name="at" type="t"/>
    </signal>
  </interface>
</node>
"#,
    )
    .unwrap();

    let service = file(&files, "DoorService.cc");
    assert!(service.contains("    args[0].Set(\"s\", by.c_str());\n    args[1].Set(\"t\", at);\n"));
    assert!(service.contains("return Signal(destination, sessionId, *member, args, 2, 0, ALLJOYN_FLAG_ENCRYPTED);"));

    let client = file(&files, "DoorClient.cc");
    assert!(client.contains("AddMatch(\"type='signal',interface='org.example.Door',member='Opened'\")"));
    assert!(client.contains("        OpenedHandler(by, at);\n"));

    let handlers = file(&files, "DoorClientHandlers.cc");
    assert!(handlers.contains("void DoorClient::OpenedHandler(String by, unsigned long long at)\n"));
}

#[test]
fn merged_interfaces_route_members_to_their_parent() {
    let files = generate(
        r#"
<node name="Lamp">
  <interface name="org.example.Switch">
    <method name="Toggle">
      <annotation name="org.freedesktop.DBus.Method.NoReply" value="true"/>
    </method>
  </interface>
  <interface name="org.example.Dimmer">
    <property name="level" type="y" access="readwrite"/>
  </interface>
</node>
"#,
    )
    .unwrap();

    let client = file(&files, "LampClient.cc");
    assert!(client.contains(
        "proxyBusObj->MethodCall(\"org.example.Switch\", \"Toggle\", NULL, 0, ALLJOYN_FLAG_NO_REPLY_EXPECTED);"
    ));
    assert!(client.contains("proxyBusObj->GetProperty(\"org.example.Dimmer\", \"level\", propValue);"));

    let service = file(&files, "LampService.cc");
    assert!(service.contains("iface = myBusAttachment->GetInterface(\"org.example.Dimmer\");"));
    assert!(service.contains("iface = myBusAttachment->GetInterface(\"org.example.Switch\");"));
    assert!(service.contains("if (val.typeId != ALLJOYN_BYTE) {"));
}

#[test]
fn discovery_is_available_without_generation() {
    let node = load(
        r#"
<node name="Atlas">
  <interface name="org.example.Atlas">
    <method name="Lookup">
      <arg name="places" type="a{s(dd)}" direction="out"/>
    </method>
  </interface>
</node>
"#,
    );
    let generator = CppCodeGenerator::new(CppCodeGeneratorOptions::default());
    let registry: Registry = generator.discover_types(&node).unwrap();
    let names: Vec<_> = registry
        .declarations()
        .into_iter()
        .map(|entry| entry.type_name.as_str())
        .collect();
    assert_eq!(names, vec!["placesDictEntry"]);

    let json = serde_json::to_value(&registry).unwrap();
    assert_eq!(json["interface"], "org.example.Atlas");
}

#[test]
fn interfaces_sharing_a_method_name_fail_to_generate() {
    let err = generate(
        r#"
<node name="Device">
  <interface name="org.example.A">
    <method name="Reset"/>
  </interface>
  <interface name="org.example.B">
    <method name="Reset"/>
  </interface>
</node>
"#,
    )
    .unwrap_err();
    match err {
        GenError::DuplicateMember { name, second, .. } => {
            assert_eq!(name, "Reset");
            assert_eq!(second, "org.example.B");
        }
        other => panic!("expected a duplicate member, got {}", other),
    }
}

#[test]
fn dictionary_setter_rejects_other_dictionaries() {
    let files = generate(
        r#"
<node name="Tally">
  <interface name="org.example.Tally">
    <property name="counts" type="a{si}" access="readwrite"/>
  </interface>
</node>
"#,
    )
    .unwrap();
    let service = file(&files, "TallyService.cc");
    assert!(service.contains("        if (!val.HasSignature(\"a{si}\")) {\n"));
    assert!(!service.contains("val.typeId != ALLJOYN_ARRAY"));
}
