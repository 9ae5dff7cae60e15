//! Export filename patterns.
//!
//! Patterns use `{key}` placeholders, with `{{` and `}}` producing literal
//! braces. Keys come from the export `metadata` table plus `region_slug`.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Fill the `{key}` placeholders of `pattern` from `values`.
pub fn render_pattern(pattern: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(Error::Pattern(format!(
                                "unterminated placeholder in '{}'",
                                pattern
                            )));
                        }
                        Some(ch) => key.push(ch),
                    }
                }

                if key.is_empty() {
                    return Err(Error::Pattern(format!(
                        "empty placeholder in '{}'",
                        pattern
                    )));
                }

                let value = values.get(&key).ok_or_else(|| {
                    Error::Pattern(format!("unknown key '{}' in '{}'", key, pattern))
                })?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(Error::Pattern(format!(
                    "single '}}' encountered in '{}'",
                    pattern
                )));
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

/// Build the placeholder values for an export: metadata plus `region_slug`.
///
/// `region_slug` always wins over a metadata entry of the same name.
pub fn export_values(
    metadata: &BTreeMap<String, toml::Value>,
    region_slug: &str,
) -> BTreeMap<String, String> {
    let mut values: BTreeMap<String, String> = metadata
        .iter()
        .map(|(k, v)| (k.clone(), value_to_text(v)))
        .collect();
    values.insert("region_slug".to_string(), region_slug.to_string());
    values
}

/// Render the export name for a pattern, metadata table and region.
pub fn render_export_name(
    pattern: &str,
    metadata: &BTreeMap<String, toml::Value>,
    region_slug: &str,
) -> Result<String> {
    render_pattern(pattern, &export_values(metadata, region_slug))
}

/// Text of a metadata value, as existing export names spell it:
/// `1.0` keeps its fraction and booleans are `True`/`False`.
fn value_to_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => float_text(*f),
        toml::Value::Boolean(true) => "True".to_string(),
        toml::Value::Boolean(false) => "False".to_string(),
        toml::Value::Datetime(d) => d.to_string(),
        other => other.to_string(),
    }
}

/// Shortest round-trip float text with a signed, two-digit exponent.
fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}
