//! Text-mode display logic for the netparse CLI.
//!
//! Colored result blocks, function listings and the run summary. Uses only
//! the `console` crate, which turns styling off when stdout is not a terminal.

use console::{pad_str, style, Alignment};
use netparse_lib::functions::{FunctionSpec, ReturnSpec};

use crate::Outcome;

const FIELD_WIDTH: usize = 12;

// ── Results ──────────────────────────────────────────────────────────────────

/// Print one outcome: a status line followed by its fields.
pub fn print_outcome(spec: &FunctionSpec, outcome: &Outcome) {
    match (&outcome.result, &spec.returns) {
        (Err(e), _) => {
            println!(
                "{} {}  {}",
                style("✗").red().bold(),
                style(outcome.input()).bold(),
                style(e).red(),
            );
        }
        (Ok(value), ReturnSpec::Bool) => {
            let network = outcome.args.first().map(String::as_str).unwrap_or_default();
            if value.as_bool().unwrap_or(false) {
                println!(
                    "{} {} {} {}",
                    style("✓").green().bold(),
                    style(outcome.input()).bold(),
                    style("is in").green(),
                    network,
                );
            } else {
                println!(
                    "{} {} {} {}",
                    style("○").yellow().bold(),
                    style(outcome.input()).bold(),
                    style("is not in").yellow(),
                    network,
                );
            }
        }
        (Ok(_), ReturnSpec::Object(_)) => {
            println!("{} {}", style("✓").green().bold(), style(outcome.input()).bold());
            for (name, value) in outcome.fields(spec).unwrap_or_default() {
                println!("    {}", format_field(name, &value));
            }
        }
    }
}

/// One aligned `name value` line; empty values render as a dim dash.
pub fn format_field(name: &str, value: &str) -> String {
    let label = pad_str(name, FIELD_WIDTH, Alignment::Left, None);
    if value.is_empty() {
        format!("{} {}", style(label).dim(), style("-").dim())
    } else {
        format!("{} {}", style(label).dim(), value)
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(total: usize, failed: usize) {
    println!("{}", style("────────────────────────────────────────").dim());
    println!(
        "{} input{}  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        style("|").dim(),
        style(format!("{} parsed", total - failed)).green(),
        style("|").dim(),
        if failed == 0 {
            style(format!("{} failed", failed)).dim()
        } else {
            style(format!("{} failed", failed)).red()
        },
    );
}

// ── Functions ────────────────────────────────────────────────────────────────

/// Print a function signature with its summary.
pub fn print_function(spec: &FunctionSpec) {
    println!(
        "{}  {}",
        style(signature(spec)).green().bold(),
        style(spec.summary).dim()
    );
}

/// `name(param, ...) -> object|bool`
pub fn signature(spec: &FunctionSpec) -> String {
    let params: Vec<_> = spec.parameters.iter().map(|p| p.name).collect();
    let returns = match spec.returns {
        ReturnSpec::Object(_) => "object",
        ReturnSpec::Bool => "bool",
    };
    format!("{}({}) -> {}", spec.name, params.join(", "), returns)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use netparse_lib::functions::{function_spec, CONTAINS_IP, PARSE_URL};

    #[test]
    fn test_signature() {
        assert_eq!(
            signature(function_spec(CONTAINS_IP).unwrap()),
            "contains_ip(network, ip) -> bool"
        );
        assert_eq!(
            signature(function_spec(PARSE_URL).unwrap()),
            "parse_url(url) -> object"
        );
    }

    #[test]
    fn test_format_field_pads_name() {
        console::set_colors_enabled(false);
        assert_eq!(format_field("sld", "example"), "sld          example");
        assert_eq!(format_field("subdomain", ""), "subdomain    -");
    }
}
