//! Netparse CLI Application
//!
//! A command-line interface for decomposing domains, URLs and CIDR blocks.
//! Every subcommand calls a function from the netparse-lib registry once per
//! input and renders the records as text, JSON or CSV.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use netparse_lib::functions::{self, Argument, FunctionSpec, ReturnSpec};
use netparse_lib::{
    load_env_config, ConfigManager, DomainParser, FileConfig, NetparseError, OutputFormat,
    Settings,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for netparse
#[derive(Parser, Debug)]
#[command(name = "netparse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decompose domains, URLs and CIDR blocks into their parts")]
#[command(
    long_about = "Decompose domains, URLs and CIDR blocks into their parts.\n\nDomains are split along the Public Suffix List, URLs follow the WHATWG URL standard and networks accept both IPv4 and IPv6."
)]
#[command(styles = STYLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Input file with one value per line
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        global = true,
        help_heading = "Input"
    )]
    pub file: Option<String>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", global = true, help_heading = "Output Format")]
    pub json: bool,

    /// Output results in CSV format
    #[arg(long = "csv", global = true, help_heading = "Output Format")]
    pub csv: bool,

    /// Pretty-print JSON output
    #[arg(short = 'p', long = "pretty", global = true, help_heading = "Output Format")]
    pub pretty: bool,

    /// Reject domains whose public suffix has no manager
    #[arg(long = "strict", global = true, help_heading = "Validation")]
    pub strict: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Configuration"
    )]
    pub config: Option<String>,

    /// Show debug logging on stderr
    #[arg(short = 'd', long = "debug", global = true, help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        help_heading = "Configuration"
    )]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Split hosts into subdomain, registrable domain and public suffix
    Domain {
        /// Hosts to parse
        #[arg(value_name = "HOST")]
        hosts: Vec<String>,
    },

    /// Split URLs into their components
    Url {
        /// URLs to parse
        #[arg(value_name = "URL")]
        urls: Vec<String>,
    },

    /// Parse addresses with prefix length in CIDR notation
    Cidr {
        /// Addresses in CIDR notation
        #[arg(value_name = "CIDR")]
        blocks: Vec<String>,
    },

    /// Check whether addresses lie inside a network
    Contains {
        /// Network in CIDR notation
        #[arg(value_name = "NETWORK")]
        network: String,

        /// Addresses to check
        #[arg(value_name = "IP")]
        ips: Vec<String>,
    },

    /// List the available functions with their parameters
    Functions,
}

impl Command {
    /// Registry name of the function behind this subcommand.
    fn function(&self) -> Option<&'static str> {
        match self {
            Command::Domain { .. } => Some(functions::PARSE_DOMAIN),
            Command::Url { .. } => Some(functions::PARSE_URL),
            Command::Cidr { .. } => Some(functions::PARSE_CIDR),
            Command::Contains { .. } => Some(functions::CONTAINS_IP),
            Command::Functions => None,
        }
    }

    /// Values given on the command line, one call each.
    fn inputs(&self) -> &[String] {
        match self {
            Command::Domain { hosts } => hosts,
            Command::Url { urls } => urls,
            Command::Cidr { blocks } => blocks,
            Command::Contains { ips, .. } => ips,
            Command::Functions => &[],
        }
    }

    fn input_name(&self) -> &'static str {
        match self {
            Command::Domain { .. } => "host",
            Command::Url { .. } => "URL",
            Command::Cidr { .. } => "CIDR block",
            Command::Contains { .. } => "IP address",
            Command::Functions => "function",
        }
    }

    /// Arguments of the registry call for one input.
    fn call_arguments(&self, input: &str) -> Vec<String> {
        match self {
            Command::Contains { network, .. } => vec![network.clone(), input.to_string()],
            _ => vec![input.to_string()],
        }
    }
}

/// Result of one function call.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) args: Vec<String>,
    pub(crate) result: Result<Value, NetparseError>,
}

impl Outcome {
    /// The value that varied between calls (the last argument).
    pub(crate) fn input(&self) -> &str {
        self.args.last().map(String::as_str).unwrap_or_default()
    }

    /// Named fields of a successful call, in registry order.
    ///
    /// Boolean functions report their arguments followed by a `contains` field.
    pub(crate) fn fields(&self, spec: &FunctionSpec) -> Option<Vec<(&'static str, String)>> {
        let value = self.result.as_ref().ok()?;

        let fields = match &spec.returns {
            ReturnSpec::Object(attributes) => attributes
                .iter()
                .map(|attr| (attr.name, value.get(attr.name).map(field_text).unwrap_or_default()))
                .collect(),
            ReturnSpec::Bool => spec
                .parameters
                .iter()
                .zip(&self.args)
                .map(|(param, arg)| (param.name, arg.clone()))
                .chain(std::iter::once(("contains", field_text(value))))
                .collect(),
        };

        Some(fields)
    }
}

/// JSON entry for an input that failed.
#[derive(Debug, Serialize)]
struct FailedInput<'a> {
    input: &'a str,
    error: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(&args);

    match run(args).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // Can't have multiple output formats
    let output_formats = [args.json, args.csv].iter().filter(|&&x| x).count();
    if output_formats > 1 {
        return Err("Cannot specify multiple output formats (--json, --csv)".to_string());
    }

    match &args.command {
        Command::Functions => {
            if args.file.is_some() {
                return Err("--file cannot be used with the functions command".to_string());
            }
        }
        command => {
            if command.inputs().is_empty() && args.file.is_none() {
                return Err(format!(
                    "You must specify at least one {} or a file with --file",
                    command.input_name()
                ));
            }
        }
    }

    Ok(())
}

/// Send diagnostics to stderr so stdout only carries results.
fn init_logging(args: &Args) {
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the selected subcommand. Returns whether every input succeeded.
async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;
    debug!(?settings, "resolved settings");

    let Some(name) = args.command.function() else {
        display_functions(&functions::function_specs(), &settings)?;
        return Ok(true);
    };
    let spec = functions::function_spec(name)
        .ok_or_else(|| NetparseError::UnknownFunction {
            name: name.to_string(),
        })?;

    let mut inputs = args.command.inputs().to_vec();
    if let Some(path) = &args.file {
        info!(path = %path, "reading inputs from file");
        inputs.extend(read_inputs_from_file(path).await?);
    }

    let parser = DomainParser::new().strict(settings.strict);
    let outcomes = evaluate(&parser, &args.command, name, &inputs);

    display_outcomes(spec, &outcomes, &settings)?;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        info!(failed, total = outcomes.len(), "some inputs could not be parsed");
    }

    Ok(failed == 0)
}

/// Call `name` once per input.
fn evaluate(parser: &DomainParser, command: &Command, name: &str, inputs: &[String]) -> Vec<Outcome> {
    inputs
        .iter()
        .map(|input| {
            let args = command.call_arguments(input);
            let call: Vec<Argument> = args.iter().map(|a| Argument::from(a.as_str())).collect();
            let result = functions::invoke_with(parser, name, &call)
                .map(|invocation| invocation.into_value().unwrap_or(Value::Null));

            Outcome { args, result }
        })
        .collect()
}

/// Resolve settings from config files, environment and CLI flags.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (NP_*)
/// 3. Local config file (./netparse.toml or ./.netparse.toml)
/// 4. Global config file (~/.netparse.toml)
/// 5. XDG config file (~/.config/netparse/config.toml)
/// 6. Built-in defaults
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();
    let env_config = load_env_config();

    let file_config = if let Some(path) = &args.config {
        info!(path = %path, "using explicit config file (--config)");
        load_explicit_config(&config_manager, path)?
    } else if let Some(path) = &env_config.config {
        info!(path = %path, "using explicit config file (NP_CONFIG)");
        load_explicit_config(&config_manager, path)?
    } else {
        config_manager.discover_and_load()
    };

    let settings = Settings::default()
        .apply_file(&file_config)?
        .apply_env(&env_config);

    Ok(apply_cli_args(settings, args))
}

fn load_explicit_config(manager: &ConfigManager, path: &str) -> Result<FileConfig, String> {
    manager
        .load_file(path)
        .map_err(|e| format!("Failed to load config file '{}': {}", path, e))
}

/// Apply CLI flags on top of file and environment settings.
///
/// Flags only switch behaviour on; an absent flag keeps the resolved value.
fn apply_cli_args(mut settings: Settings, args: &Args) -> Settings {
    if args.strict {
        settings.strict = true;
    }
    if args.json {
        settings.format = OutputFormat::Json;
    } else if args.csv {
        settings.format = OutputFormat::Csv;
    }
    if args.pretty {
        settings.pretty = true;
    }
    settings
}

/// Read inputs from a file, skipping blank lines and `#` comments.
async fn read_inputs_from_file(file_path: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|e| NetparseError::file_error(file_path, e.to_string()))?;

    let inputs = parse_input_lines(&content);
    if inputs.is_empty() {
        return Err(format!("No inputs found in file '{}'", file_path).into());
    }

    Ok(inputs)
}

// Only whole-line comments: URLs carry '#' fragments
fn parse_input_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn display_outcomes(
    spec: &FunctionSpec,
    outcomes: &[Outcome],
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    match settings.format {
        OutputFormat::Json => display_json_outcomes(spec, outcomes, settings.pretty)?,
        OutputFormat::Csv => display_csv_outcomes(spec, outcomes, settings.csv_headers),
        OutputFormat::Text => display_text_outcomes(spec, outcomes),
    }

    Ok(())
}

/// Display results in JSON format
fn display_json_outcomes(
    spec: &FunctionSpec,
    outcomes: &[Outcome],
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = outcomes
        .iter()
        .map(|outcome| json_entry(spec, outcome))
        .collect::<Result<Vec<_>, _>>()?;

    let json = if pretty {
        serde_json::to_string_pretty(&entries)?
    } else {
        serde_json::to_string(&entries)?
    };
    println!("{}", json);
    Ok(())
}

fn json_entry(spec: &FunctionSpec, outcome: &Outcome) -> Result<Value, serde_json::Error> {
    match (&outcome.result, &spec.returns) {
        (Ok(value), ReturnSpec::Object(_)) => Ok(value.clone()),
        (Ok(value), ReturnSpec::Bool) => {
            let mut entry: Map<String, Value> = spec
                .parameters
                .iter()
                .zip(&outcome.args)
                .map(|(param, arg)| (param.name.to_string(), Value::String(arg.clone())))
                .collect();
            entry.insert("contains".to_string(), value.clone());
            Ok(Value::Object(entry))
        }
        (Err(e), _) => serde_json::to_value(FailedInput {
            input: outcome.input(),
            error: e.to_string(),
        }),
    }
}

/// Display results in CSV format
fn display_csv_outcomes(spec: &FunctionSpec, outcomes: &[Outcome], headers: bool) {
    if headers {
        let mut columns = vec!["input"];
        columns.extend(csv_columns(spec));
        columns.push("error");
        println!("{}", columns.join(","));
    }

    for outcome in outcomes {
        println!("{}", csv_row(spec, outcome));
    }
}

fn csv_columns(spec: &FunctionSpec) -> Vec<&'static str> {
    match &spec.returns {
        ReturnSpec::Object(attributes) => attributes.iter().map(|attr| attr.name).collect(),
        ReturnSpec::Bool => spec
            .parameters
            .iter()
            .map(|param| param.name)
            .chain(std::iter::once("contains"))
            .collect(),
    }
}

fn csv_row(spec: &FunctionSpec, outcome: &Outcome) -> String {
    let mut row = vec![outcome.input().to_string()];

    match &outcome.result {
        Ok(_) => {
            let fields = outcome.fields(spec).unwrap_or_default();
            row.extend(fields.into_iter().map(|(_, value)| value));
            row.push(String::new());
        }
        Err(e) => {
            row.extend(csv_columns(spec).iter().map(|_| String::new()));
            row.push(e.to_string());
        }
    }

    row.iter()
        .map(|field| csv_escape(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Display results in human-readable text format
fn display_text_outcomes(spec: &FunctionSpec, outcomes: &[Outcome]) {
    for outcome in outcomes {
        ui::print_outcome(spec, outcome);
    }

    if outcomes.len() > 1 {
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        println!();
        ui::print_summary(outcomes.len(), failed);
    }
}

fn display_functions(
    specs: &[&FunctionSpec],
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    match settings.format {
        OutputFormat::Json => {
            let json = if settings.pretty {
                serde_json::to_string_pretty(specs)?
            } else {
                serde_json::to_string(specs)?
            };
            println!("{}", json);
        }
        OutputFormat::Csv => {
            if settings.csv_headers {
                println!("name,parameters,returns,summary");
            }
            for spec in specs {
                let parameters: Vec<_> = spec.parameters.iter().map(|p| p.name).collect();
                let returns = match spec.returns {
                    ReturnSpec::Object(_) => "object",
                    ReturnSpec::Bool => "bool",
                };
                println!(
                    "{},{},{},{}",
                    spec.name,
                    csv_escape(&parameters.join(";")),
                    returns,
                    csv_escape(spec.summary)
                );
            }
        }
        OutputFormat::Text => {
            for spec in specs {
                ui::print_function(spec);
            }
        }
    }

    Ok(())
}

/// Text form of a JSON field: strings unquoted, everything else as JSON.
pub(crate) fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn outcome_for(command: &Command, input: &str) -> Outcome {
        let name = command.function().unwrap();
        evaluate(&DomainParser::new(), command, name, &[input.to_string()]).remove(0)
    }

    #[test]
    fn test_validate_args_multiple_formats() {
        let args = parse_args(&["netparse", "domain", "example.com", "--json", "--csv"]);
        let result = validate_args(&args);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .contains("Cannot specify multiple output formats"));
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = parse_args(&["netparse", "cidr"]);
        let err = validate_args(&args).unwrap_err();
        assert!(err.contains("at least one CIDR block"));

        let args = parse_args(&["netparse", "contains", "192.0.2.0/24"]);
        assert!(validate_args(&args).unwrap_err().contains("IP address"));
    }

    #[test]
    fn test_validate_args_file_counts_as_input() {
        let args = parse_args(&["netparse", "url", "--file", "urls.txt"]);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_functions_rejects_file() {
        let args = parse_args(&["netparse", "functions", "--file", "x.txt"]);
        assert!(validate_args(&args).is_err());

        let args = parse_args(&["netparse", "functions", "--json"]);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let args = parse_args(&["netparse", "--strict", "-j", "domain", "example.com"]);
        assert!(args.strict);
        assert!(args.json);
        assert_eq!(
            args.command,
            Command::Domain {
                hosts: vec!["example.com".to_string()]
            }
        );
    }

    #[test]
    fn test_strict_flag_only_enables() {
        // Config strict=true must survive when --strict is not passed
        let args = parse_args(&["netparse", "domain", "example.com"]);
        let settings = Settings {
            strict: true,
            ..Settings::default()
        };
        assert!(apply_cli_args(settings, &args).strict);

        let args = parse_args(&["netparse", "domain", "example.com", "--strict"]);
        assert!(apply_cli_args(Settings::default(), &args).strict);
    }

    #[test]
    fn test_format_flags_override_config() {
        let args = parse_args(&["netparse", "url", "https://example.com", "--csv"]);
        let settings = Settings {
            format: OutputFormat::Json,
            ..Settings::default()
        };
        assert_eq!(apply_cli_args(settings.clone(), &args).format, OutputFormat::Csv);

        let args = parse_args(&["netparse", "url", "https://example.com"]);
        assert_eq!(apply_cli_args(settings, &args).format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_input_lines() {
        let content = "# hosts\nexample.com\n\n  www.example.org  \n# done\nhttps://example.com/#top\n";
        assert_eq!(
            parse_input_lines(content),
            vec!["example.com", "www.example.org", "https://example.com/#top"]
        );
    }

    #[test]
    fn test_read_inputs_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# networks\n192.0.2.1/24\n\n2001:db8::1/32").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let inputs = tokio_test::block_on(read_inputs_from_file(&path)).unwrap();
        assert_eq!(inputs, vec!["192.0.2.1/24", "2001:db8::1/32"]);
    }

    #[test]
    fn test_read_inputs_from_empty_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let err = tokio_test::block_on(read_inputs_from_file(&path)).unwrap_err();
        assert!(err.to_string().contains("No inputs found"));
    }

    #[test]
    fn test_read_inputs_from_missing_file() {
        let err = tokio_test::block_on(read_inputs_from_file("/nonexistent/inputs.txt"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/inputs.txt"));
    }

    #[test]
    fn test_evaluate_contains_passes_network_first() {
        let command = Command::Contains {
            network: "192.0.2.0/24".to_string(),
            ips: vec![],
        };
        let outcome = outcome_for(&command, "192.0.2.4");
        assert_eq!(outcome.args, vec!["192.0.2.0/24", "192.0.2.4"]);
        assert_eq!(outcome.input(), "192.0.2.4");
        assert_eq!(outcome.result.unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_evaluate_honours_strict_parser() {
        let command = Command::Domain { hosts: vec![] };
        let inputs = ["host.corp.notarealtld".to_string()];

        let permissive = evaluate(&DomainParser::new(), &command, functions::PARSE_DOMAIN, &inputs);
        assert!(permissive[0].result.is_ok());

        let strict = DomainParser::new().strict(true);
        let rejected = evaluate(&strict, &command, functions::PARSE_DOMAIN, &inputs);
        assert!(rejected[0].result.is_err());
    }

    #[test]
    fn test_outcome_fields_follow_registry_order() {
        let command = Command::Cidr { blocks: vec![] };
        let outcome = outcome_for(&command, "192.0.2.1/24");
        let spec = functions::function_spec(functions::PARSE_CIDR).unwrap();

        assert_eq!(
            outcome.fields(spec).unwrap(),
            vec![
                ("cidr", "192.0.2.1/24".to_string()),
                ("ip", "192.0.2.1".to_string()),
                ("network", "192.0.2.0/24".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_entry_for_contains() {
        let command = Command::Contains {
            network: "192.0.2.0/24".to_string(),
            ips: vec![],
        };
        let outcome = outcome_for(&command, "192.1.0.0");
        let spec = functions::function_spec(functions::CONTAINS_IP).unwrap();

        assert_eq!(
            json_entry(spec, &outcome).unwrap(),
            serde_json::json!({"network": "192.0.2.0/24", "ip": "192.1.0.0", "contains": false})
        );
    }

    #[test]
    fn test_json_entry_for_failure() {
        let command = Command::Url { urls: vec![] };
        let outcome = outcome_for(&command, "://example.com");
        let spec = functions::function_spec(functions::PARSE_URL).unwrap();

        let entry = json_entry(spec, &outcome).unwrap();
        assert_eq!(entry["input"], "://example.com");
        assert!(entry["error"]
            .as_str()
            .unwrap()
            .contains("missing protocol scheme"));
    }

    #[test]
    fn test_csv_rows() {
        let spec = functions::function_spec(functions::PARSE_CIDR).unwrap();
        let command = Command::Cidr { blocks: vec![] };

        let ok = outcome_for(&command, "192.0.2.1/24");
        assert_eq!(csv_row(spec, &ok), "192.0.2.1/24,192.0.2.1/24,192.0.2.1,192.0.2.0/24,");

        let failed = outcome_for(&command, "192.0.2.1");
        let row = csv_row(spec, &failed);
        assert!(row.starts_with("192.0.2.1,,,,"));
        assert!(row.contains("invalid CIDR address"));
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("foo=bar&baz=qux"), "foo=bar&baz=qux");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&Value::String("ICANN".into())), "ICANN");
        assert_eq!(field_text(&Value::Bool(true)), "true");
    }
}
