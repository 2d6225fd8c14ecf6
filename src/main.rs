//! `munch` reads a JSON or YAML document and prints it as munches.
//!
//! ```text
//! munch [--config FILE] [--nest] [--json | --yaml] DOCUMENT [PATH ...]
//! ```
//!
//! Without paths the whole document is printed, otherwise the value at each
//! attribute path (`servers.0.host`). Integer segments index lists and
//! tuples, negative ones from the end. `--nest` first expands compound keys
//! such as `"db.host"` into nested mappings.

use std::error::Error;
use std::fs;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt};

use munch::serial::{self, JsonOptions, TagRegistry, YamlStyle};
use munch::{Settings, Value, flatten_join, munchify, unmunchify};

/// Prints a JSON or YAML document as munches.
#[derive(Debug, Parser)]
#[command(name = "munch", long_about = None)]
struct Cli {
    /// Settings file (defaults to munch.toml, munch.yaml or munch.json when present)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
    /// Expand compound keys such as "db.host" into nested mappings first
    #[arg(long)]
    nest: bool,
    /// Print JSON instead of the representation
    #[arg(long, group = "output")]
    json: bool,
    /// Print YAML instead of the representation
    #[arg(long, group = "output")]
    yaml: bool,
    /// JSON or YAML file, picked by extension
    #[arg(value_name = "DOCUMENT")]
    document: String,
    /// Attribute paths to print instead of the whole document
    #[arg(value_name = "PATH")]
    paths: Vec<String>,
}

#[derive(Debug, PartialEq)]
enum Output {
    Repr,
    Json,
    Yaml,
}

impl Cli {
    fn output(&self) -> Output {
        if self.json {
            Output::Json
        } else if self.yaml {
            Output::Yaml
        } else {
            Output::Repr
        }
    }
}

fn load(document: &str) -> Result<Value, Box<dyn Error>> {
    let text = fs::read_to_string(document)?;
    let value = if document.ends_with(".yaml") || document.ends_with(".yml") {
        serial::load_yaml(&text, &TagRegistry::with_defaults())?
    } else {
        serial::load_json(&text)?
    };
    Ok(value)
}

// path segments are attributes, or indexes into lists and tuples
fn resolve(root: &Value, path: &str, separator: &str) -> munch::Result<Value> {
    let mut value = root.clone();
    for segment in path.split(separator) {
        value = match segment.parse::<i64>() {
            Ok(index) if !value.is_mapping() => value.item(index)?,
            _ => value.attr(segment)?,
        };
    }
    Ok(value)
}

fn render(value: &Value, output: &Output, settings: &Settings) -> munch::Result<String> {
    match output {
        Output::Repr => Ok(value.to_string()),
        Output::Json => serial::to_json(
            value,
            &JsonOptions {
                indent: settings.json_indent,
                sort_keys: false,
            },
        ),
        Output::Yaml => {
            let style = if settings.yaml_tagged { YamlStyle::Tagged } else { YamlStyle::Safe };
            serial::to_yaml(value, style)
        }
    }
}

fn run(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let output = cli.output();
    let mut data = load(&cli.document)?;
    if cli.nest {
        let Value::Dict(flat) = unmunchify(&data)? else {
            return Err("--nest needs a mapping document".into());
        };
        data = Value::Dict(flatten_join(&flat, &settings.separator)?);
    }
    let data = munchify(&data)?;
    debug!(document = %cli.document, kind = data.type_name(), "document loaded");
    if cli.paths.is_empty() {
        println!("{}", render(&data, &output, settings)?);
    }
    for path in &cli.paths {
        let value = resolve(&data, path, &settings.separator)?;
        println!("{}", render(&value, &output, settings)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "munch failed");
            ExitCode::FAILURE
        }
    }
}
