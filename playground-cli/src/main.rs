use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use playground_core::{Bridge, HostResponse, render_diagnostics};
use playground_frontend::{PlaygroundCompiler, SAMPLES, find_sample};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `playground_core=trace`).
const LOG_ENV: &str = "PLAYGROUND_LOG";

/// Command line front end for the compile bridge.
///
/// Without `--lang`, `--disable-types` or `--runtime` the source is passed
/// as a bare string; with any of them it is passed as a request record.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, help = "Source file to compile (reads stdin when omitted)")]
    input: Option<PathBuf>,

    #[arg(short, long, help = "Write the response to this file instead of stdout")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "LANG", help = "Target language, e.g. ts or go")]
    lang: Option<String>,

    #[arg(long, help = "Omit type annotations from the emitted code")]
    disable_types: bool,

    #[arg(long, value_name = "PATH", help = "Runtime module imported by the emitted code")]
    runtime: Option<String>,

    #[arg(
        long,
        value_name = "JSON",
        conflicts_with_all = ["input", "sample", "lang", "disable_types", "runtime"],
        help = "Raw JSON array passed as the host argument list"
    )]
    args: Option<String>,

    #[arg(long, value_name = "NAME", conflicts_with = "input", help = "Compile a bundled sample")]
    sample: Option<String>,

    #[arg(long, help = "List the bundled samples and exit")]
    list_samples: bool,

    #[arg(long, value_enum, default_value_t = Format::Json, help = "Response format")]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The host response record, as a host would receive it.
    Json,
    /// The artifact, or one line per diagnostic.
    Text,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    execute(cli)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<ExitCode> {
    if cli.list_samples {
        for sample in SAMPLES {
            println!("{}", sample.name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let args = host_arguments(&cli)?;
    let bridge = Bridge::new(PlaygroundCompiler::new());
    let response = bridge.call(&args);
    tracing::info!(usage_error = response.is_usage_error(), "bridge call finished");

    let rendered = render(&response, cli.format)?;
    write_output(cli.output.as_deref(), &rendered)?;
    Ok(exit_code(&response))
}

fn host_arguments(cli: &Cli) -> Result<Vec<Value>> {
    if let Some(raw) = &cli.args {
        let value: Value = serde_json::from_str(raw).context("--args is not valid JSON")?;
        let Value::Array(args) = value else {
            bail!("--args must be a JSON array of host arguments");
        };
        return Ok(args);
    }

    let source = read_source(cli)?;
    if cli.lang.is_none() && !cli.disable_types && cli.runtime.is_none() {
        return Ok(vec![Value::String(source)]);
    }

    let mut record = Map::new();
    record.insert("source".to_string(), Value::String(source));
    if let Some(lang) = &cli.lang {
        record.insert("lang".to_string(), Value::String(lang.clone()));
    }
    if cli.disable_types {
        record.insert("disableTypes".to_string(), Value::Bool(true));
    }
    if let Some(runtime) = &cli.runtime {
        record.insert("runtime".to_string(), Value::String(runtime.clone()));
    }
    Ok(vec![Value::Object(record)])
}

fn read_source(cli: &Cli) -> Result<String> {
    if let Some(name) = &cli.sample {
        let Some(sample) = find_sample(name) else {
            bail!("unknown sample '{name}' (see --list-samples)");
        };
        return Ok(sample.source.to_string());
    }

    match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read source from stdin")?;
            Ok(buffer)
        }
    }
}

fn render(response: &HostResponse, format: Format) -> Result<String> {
    let text = match (format, response) {
        (Format::Json, _) => {
            let mut json =
                serde_json::to_string_pretty(response).context("failed to encode response")?;
            json.push('\n');
            json
        }
        (Format::Text, HostResponse::Usage(message)) => format!("{message}\n"),
        (Format::Text, HostResponse::Result(result)) => match result.output() {
            Some(output) => output.to_string(),
            None => render_diagnostics(result.errors()),
        },
    };
    Ok(text)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    let Some(path) = path else {
        print!("{text}");
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(path, text).with_context(|| format!("failed to write output file {}", path.display()))
}

fn exit_code(response: &HostResponse) -> ExitCode {
    match response {
        HostResponse::Usage(_) => ExitCode::from(2),
        HostResponse::Result(result) if result.is_success() => ExitCode::SUCCESS,
        HostResponse::Result(_) => ExitCode::FAILURE,
    }
}
