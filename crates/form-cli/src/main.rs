mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use component_form::{
    answer_schema, definition_schema, describe, describe_group, filter_elements, navigation,
    validate_form, validate_group,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form filtering and validation CLI",
    long_about = "Applies visibility statuses to a form definition and validates recorded observations against it"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SchemaKind {
    Form,
    Observations,
}

#[derive(clap::Args)]
struct FormArgs {
    /// Path to the form definition JSON (defaults to the bundled household survey).
    #[arg(long, value_name = "FORM")]
    form: Option<PathBuf>,
    /// Optional JSON file of extra form elements, each naming its `formElementGroupUUID`.
    #[arg(long, value_name = "ELEMENTS")]
    elements: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the form, or one of its groups, in its wire shape.
    Describe {
        #[command(flatten)]
        form: FormArgs,
        /// Uuid of the form element group to print.
        #[arg(long, value_name = "GROUP")]
        group: Option<String>,
    },
    /// Print a group's position among its siblings and its style.
    Navigate {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, value_name = "GROUP")]
        group: String,
    },
    /// Print the form element instances that apply for a set of statuses.
    Filter {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, value_name = "GROUP")]
        group: String,
        /// Path to the form element statuses JSON.
        #[arg(long, value_name = "STATUSES")]
        statuses: PathBuf,
    },
    /// Validate observations against a group, or the whole form.
    Validate {
        #[command(flatten)]
        form: FormArgs,
        /// Restrict validation to one form element group.
        #[arg(long, value_name = "GROUP")]
        group: Option<String>,
        #[arg(long, value_name = "STATUSES")]
        statuses: PathBuf,
        /// Path to the observations JSON (omit when nothing is recorded yet).
        #[arg(long, value_name = "OBSERVATIONS")]
        observations: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print a JSON schema for form definitions or observations.
    Schema {
        #[arg(long, value_enum, default_value_t = SchemaKind::Form)]
        kind: SchemaKind,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Command::Describe { form, group } => run_describe(&form, group.as_deref()),
        Command::Navigate { form, group } => {
            let config = config_json(&form)?;
            print_payload(&navigation(&group, &config))
        }
        Command::Filter {
            form,
            group,
            statuses,
        } => run_filter(&form, &group, &statuses),
        Command::Validate {
            form,
            group,
            statuses,
            observations,
            format,
        } => run_validate(
            &form,
            group.as_deref(),
            &statuses,
            observations.as_deref(),
            format,
        ),
        Command::Schema { kind } => {
            let schema = match kind {
                SchemaKind::Form => definition_schema(),
                SchemaKind::Observations => answer_schema(),
            };
            print_payload(&schema)
        }
    }
}

fn config_json(args: &FormArgs) -> CliResult<String> {
    if args.form.is_none() && args.elements.is_none() {
        return Ok(String::new());
    }
    let mut config = serde_json::Map::new();
    if let Some(path) = &args.form {
        config.insert("form_json".into(), Value::String(fs::read_to_string(path)?));
    }
    if let Some(path) = &args.elements {
        let elements: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.insert("elements".into(), elements);
    }
    Ok(Value::Object(config).to_string())
}

fn read_optional(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(String::new()),
    }
}

/// Parses a component response, turning `{"error": ...}` into a CLI error.
fn parse_payload(payload: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(payload)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(error.into());
    }
    Ok(value)
}

fn print_payload(payload: &str) -> CliResult<()> {
    let value = parse_payload(payload)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn run_describe(form: &FormArgs, group: Option<&str>) -> CliResult<()> {
    let config = config_json(form)?;
    let payload = match group {
        Some(group) => describe_group(group, &config),
        None => describe(&config),
    };
    print_payload(&payload)
}

fn run_filter(form: &FormArgs, group: &str, statuses: &Path) -> CliResult<()> {
    let config = config_json(form)?;
    let statuses_json = fs::read_to_string(statuses)?;
    print_payload(&filter_elements(group, &config, &statuses_json))
}

fn run_validate(
    form: &FormArgs,
    group: Option<&str>,
    statuses: &Path,
    observations: Option<&Path>,
    format: OutputFormat,
) -> CliResult<()> {
    let config = config_json(form)?;
    let statuses_json = fs::read_to_string(statuses)?;
    let observations_json = read_optional(observations)?;

    let payload = match group {
        Some(group) => validate_group(group, &config, &statuses_json, &observations_json),
        None => validate_form(&config, &statuses_json, &observations_json),
    };
    let report = parse_payload(&payload)?;
    let valid = report["valid"].as_bool().unwrap_or(false);
    let results = report["results"].as_array().cloned().unwrap_or_default();
    info!(results = results.len(), valid, "validation finished");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!(
                "Validation result: {}",
                if valid { "valid" } else { "invalid" }
            );
            for result in &results {
                println!("  {}", describe_result(result));
            }
        }
    }

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_result(result: &Value) -> String {
    let mut line = result["formIdentifier"]
        .as_str()
        .unwrap_or("<unknown>")
        .to_string();
    if let Some(index) = result["questionGroupIndex"].as_u64() {
        line.push_str(&format!(" [{}]", index));
    }
    let outcome = &result["outcome"];
    match outcome["status"].as_str() {
        Some("pass") => line.push_str(": ok"),
        _ => line.push_str(&format!(
            ": {} - {}",
            outcome["code"].as_str().unwrap_or("failed"),
            outcome["message"].as_str().unwrap_or_default()
        )),
    }
    line
}
