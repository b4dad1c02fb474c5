//! Output formatters for CLI commands.
//!
//! Every command builds a serializable report and renders it through
//! [`format_output`], so all three formats carry the same fields.

use anyhow::Result;
use calc_core::cli::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Formats data according to the specified output format.
///
/// # Errors
///
/// Returns an error if the data cannot be converted to JSON.
///
/// # Examples
///
/// ```
/// use calc_cli::formatters::format_output;
/// use calc_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Report {
///     display: String,
/// }
///
/// let report = Report { display: "42".to_string() };
/// assert_eq!(format_output(&report, OutputFormat::Text)?, "display: 42");
/// assert!(format_output(&report, OutputFormat::Json)?.contains("\"display\": \"42\""));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Formats data as indented JSON.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Plain text output for scripts.
pub mod text {
    use super::{Result, Serialize, Value};

    /// Formats data as `key: value` lines.
    ///
    /// Nested keys are joined with dots and array items are numbered, so
    /// every line can be picked out with `grep`. A bare scalar is printed
    /// on its own.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        if !matches!(value, Value::Object(_) | Value::Array(_)) {
            return Ok(scalar(&value));
        }
        let mut lines = Vec::new();
        flatten("", &value, &mut lines);
        Ok(lines.join("\n"))
    }

    fn flatten(prefix: &str, value: &Value, lines: &mut Vec<String>) {
        let join = |key: &str| {
            if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}.{key}")
            }
        };
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, item) in map {
                    flatten(&join(key), item, lines);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (index, item) in items.iter().enumerate() {
                    flatten(&join(&index.to_string()), item, lines);
                }
            }
            Value::Object(_) => lines.push(format!("{prefix}: {{}}")),
            Value::Array(_) => lines.push(format!("{prefix}: []")),
            scalar_value => lines.push(format!("{prefix}: {}", scalar(scalar_value))),
        }
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Colorized output for terminals.
pub mod pretty {
    use super::{Colorize, Result, Serialize, Value};

    /// Formats data as an indented, colorized outline.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        match &value {
            Value::Object(_) | Value::Array(_) => write_block(&value, 0, &mut out),
            scalar_value => out.push_str(&scalar(scalar_value)),
        }
        Ok(out.trim_end().to_string())
    }

    fn write_block(value: &Value, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match value {
            Value::Object(map) => {
                for (key, item) in map {
                    let label = key.blue().bold();
                    if is_nested(item) {
                        out.push_str(&format!("{pad}{label}:\n"));
                        write_block(item, indent + 1, out);
                    } else {
                        out.push_str(&format!("{pad}{label}: {}\n", scalar(item)));
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if is_nested(item) {
                        out.push_str(&format!("{pad}-\n"));
                        write_block(item, indent + 1, out);
                    } else {
                        out.push_str(&format!("{pad}- {}\n", scalar(item)));
                    }
                }
            }
            other => out.push_str(&format!("{pad}{}\n", scalar(other))),
        }
    }

    fn is_nested(value: &Value) -> bool {
        match value {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        }
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::Null => "none".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => s.green().to_string(),
            Value::Array(_) => "[]".dimmed().to_string(),
            Value::Object(_) => "{}".dimmed().to_string(),
        }
    }
}
