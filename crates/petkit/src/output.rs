//! Rendering for `--output`: tables for people, serde formats for scripts.

use std::io::Write;

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

/// Serialized form for the machine-readable formats, `None` for the rest.
fn structured<T: Serialize + ?Sized>(format: &OutputFormat, data: &T) -> Option<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(rendered.unwrap_or_else(|e| format!("<unserializable: {e}>")))
}

/// A list: one table row per item, or one id per line in plain mode.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    if let Some(out) = structured(format, data) {
        return out;
    }
    if matches!(format, OutputFormat::Plain) {
        return data.iter().map(id_fn).collect::<Vec<_>>().join("\n");
    }
    Table::new(data.iter().map(to_row))
        .with(Style::rounded())
        .to_string()
}

/// A single item. Table mode prints `detail_fn`'s key/value block.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize + ?Sized,
{
    structured(format, data).unwrap_or_else(|| match format {
        OutputFormat::Plain => id_fn(data),
        _ => detail_fn(data),
    })
}

/// A raw vendor payload; tables fall back to pretty JSON.
pub fn render_value(format: &OutputFormat, value: &serde_json::Value) -> String {
    render_single(
        format,
        value,
        |v| serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        |v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    )
}

/// Write to stdout unless quiet or empty.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let _ = writeln!(std::io::stdout().lock(), "{output}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_value_prints_strings_bare() {
        assert_eq!(render_value(&OutputFormat::Plain, &json!("success")), "success");
        assert_eq!(render_value(&OutputFormat::Plain, &json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_value(&OutputFormat::JsonCompact, &json!({ "a": [1, 2] }));
        assert_eq!(out, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn table_value_is_pretty_json() {
        let out = render_value(&OutputFormat::Table, &json!({ "a": 1 }));
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn plain_list_is_one_id_per_line() {
        #[derive(Serialize)]
        struct Item(u8);
        #[derive(Tabled)]
        struct Row {
            n: u8,
        }
        let out = render_list(
            &OutputFormat::Plain,
            &[Item(1), Item(2)],
            |i| Row { n: i.0 },
            |i| i.0.to_string(),
        );
        assert_eq!(out, "1\n2");
    }
}
