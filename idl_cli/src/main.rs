//! ajgen - generate AllJoyn C++ client and service stubs from introspection XML

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod generate;
mod output;

use config::GenConfig;
use generate::ModelFormat;

#[derive(Parser)]
#[command(name = "ajgen")]
#[command(about = "Generate AllJoyn C++ client and service stubs from XML interface descriptions")]
#[command(version)]
struct Cli {
    /// Well-known bus name the service requests and the client looks for
    #[arg(short = 'w', long = "well-known-name", value_name = "NAME")]
    well_known_name: String,

    /// Parent object path of the root object
    #[arg(short = 'b', long = "object-path", value_name = "PATH")]
    object_path: Option<String>,

    /// Class name of the root object, overriding the XML
    #[arg(short = 'n', long = "object-name", value_name = "NAME")]
    object_name: Option<String>,

    /// Generate only the client files
    #[arg(short = 'c', long = "client-only")]
    client_only: bool,

    /// Directory the files are written to
    #[arg(short = 'p', long = "output-path", value_name = "DIR", default_value = ".")]
    output_path: PathBuf,

    /// Overwrite existing signal handler and method implementation files
    #[arg(short = 'o', long = "overwrite")]
    overwrite: bool,

    /// Generate names for unnamed arguments instead of failing
    #[arg(short = 'l', long = "lax-naming")]
    lax_naming: bool,

    /// Log level when RUST_LOG is not set
    #[arg(short = 'u', long = "log-level", value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Print the parsed interface model and exit
    #[arg(long = "dump-model", value_enum, value_name = "FORMAT")]
    dump_model: Option<ModelFormat>,

    /// Print the discovered composite types as JSON and exit
    #[arg(long = "dump-types")]
    dump_types: bool,

    /// Introspection XML files
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let config = GenConfig {
        well_known_name: cli.well_known_name,
        object_path: cli.object_path,
        object_name: cli.object_name,
        client_only: cli.client_only,
        output_path: cli.output_path,
        overwrite: cli.overwrite,
        lax_naming: cli.lax_naming,
        files: cli.files,
    }
    .validate()?;

    if let Some(format) = cli.dump_model {
        println!("{}", generate::dump_model(&config, format)?);
        return Ok(());
    }
    if cli.dump_types {
        println!("{}", generate::dump_types(&config)?);
        return Ok(());
    }

    let written = generate::run(&config)?;
    for path in &written {
        println!("[✓] Wrote {}", path.display());
    }
    Ok(())
}
