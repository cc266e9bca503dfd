//! # Schema Inference
//!
//! Samples the first records of a JSONL file and infers, for every dotted
//! path, the set of value types observed there. Objects are descended
//! into; for lists whose first element is an object, the first
//! [`LIST_OBJECT_SAMPLE`] elements are descended into under the list's own
//! path.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use epstat_core::jsonl::count_non_blank_lines;
use epstat_core::{scan_file, EpstatError};

use crate::format;

/// List elements inspected to label a list's element type.
pub const LIST_TYPE_SAMPLE: usize = 5;
/// Objects inside a list that are descended into.
pub const LIST_OBJECT_SAMPLE: usize = 3;
/// Parse errors printed per file.
pub const MAX_PRINTED_ERRORS: usize = 5;
/// Example values are cut at this many characters.
pub const EXAMPLE_CHARS: usize = 60;
/// The pretty-printed sample record is cut at this many characters.
pub const SAMPLE_RECORD_CHARS: usize = 2000;

/// Dotted path to the type labels seen there.
pub type Schema = BTreeMap<String, BTreeSet<String>>;

/// Type label of a JSON value.
///
/// Lists are labelled by the types of their first [`LIST_TYPE_SAMPLE`]
/// elements: `list[empty]`, `list[T]` or `list[mixed: A, B]`.
pub fn type_label(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(n) if n.is_i64() || n.is_u64() => "int".to_string(),
        Value::Number(_) => "float".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Object(_) => "object".to_string(),
        Value::Array(items) if items.is_empty() => "list[empty]".to_string(),
        Value::Array(items) => {
            let types: BTreeSet<String> = items.iter().take(LIST_TYPE_SAMPLE).map(type_label).collect();
            if types.len() == 1 {
                format!("list[{}]", types.iter().next().map_or("", String::as_str))
            } else {
                let joined: Vec<&str> = types.iter().map(String::as_str).collect();
                format!("list[mixed: {}]", joined.join(", "))
            }
        }
    }
}

/// Add the paths of `object` below `prefix` to `schema`.
pub fn collect_paths(object: &Map<String, Value>, prefix: &str, schema: &mut Schema) {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        schema.entry(path.clone()).or_default().insert(type_label(value));

        match value {
            Value::Object(nested) => collect_paths(nested, &path, schema),
            Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
                for item in items.iter().take(LIST_OBJECT_SAMPLE) {
                    if let Value::Object(nested) = item {
                        collect_paths(nested, &path, schema);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Value at a dotted path, following object members only.
pub fn value_at<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, key| value.get(key))
}

/// Schema of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaReport {
    /// The analyzed file.
    pub path: PathBuf,
    /// Non-blank lines in the whole file.
    pub total_lines: usize,
    /// Records parsed and analyzed.
    pub lines_analyzed: usize,
    /// Lines that failed to parse within the sampled range.
    pub parse_errors: usize,
    /// The first [`MAX_PRINTED_ERRORS`] parse errors as `(line, message)`.
    pub first_errors: Vec<(usize, String)>,
    /// Inferred schema.
    pub schema: Schema,
    /// First parsed record.
    pub sample: Option<Value>,
}

/// Infer the schema of up to `max_lines` records of `path`.
pub fn analyze_schema(path: &Path, max_lines: usize) -> Result<SchemaReport, EpstatError> {
    let scan = scan_file(path, Some(max_lines))?;
    let total_lines = count_non_blank_lines(path)?;

    let mut schema = Schema::new();
    for record in &scan.records {
        if let Value::Object(object) = &record.value {
            collect_paths(object, "", &mut schema);
        }
    }

    Ok(SchemaReport {
        path: path.to_path_buf(),
        total_lines,
        lines_analyzed: scan.records.len(),
        parse_errors: scan.errors.len(),
        first_errors: scan
            .errors
            .iter()
            .take(MAX_PRINTED_ERRORS)
            .map(|e| (e.line, e.message.clone()))
            .collect(),
        schema,
        sample: scan.records.into_iter().next().map(|r| r.value),
    })
}

/// Render the schema report as an indented tree.
pub fn render_text(report: &SchemaReport) -> String {
    let mut out = String::new();
    format::banner(&mut out, &format!("Analyzing: {}", report.path.display()));
    for (line, message) in &report.first_errors {
        let _ = writeln!(out, "Error on line {line}: {message}");
    }
    let _ = writeln!(out, "Total lines in file: {}", report.total_lines);
    let _ = writeln!(out, "Lines analyzed: {}", report.lines_analyzed);
    let _ = writeln!(out, "Parse errors: {}", report.parse_errors);

    format::banner(&mut out, "SCHEMA STRUCTURE");
    for (path, types) in &report.schema {
        let depth = path.matches('.').count();
        let indent = "  ".repeat(depth);
        let key = path.rsplit('.').next().unwrap_or(path);
        let labels: Vec<&str> = types.iter().map(String::as_str).collect();
        let _ = writeln!(out, "{indent}{key}: {}", labels.join(" | "));

        if let Some(example) = scalar_example(report, path, types) {
            let _ = writeln!(
                out,
                "{indent}  └─ example: {}",
                format::truncate_chars(&example, EXAMPLE_CHARS)
            );
        }
    }

    if let Some(sample) = &report.sample {
        format::banner(&mut out, "SAMPLE RECORD (first entry)");
        let pretty = serde_json::to_string_pretty(sample).unwrap_or_default();
        match pretty.char_indices().nth(SAMPLE_RECORD_CHARS) {
            Some((idx, _)) => {
                let _ = writeln!(out, "{}", &pretty[..idx]);
                let _ = writeln!(out, "\n... (truncated)");
            }
            None => {
                let _ = writeln!(out, "{pretty}");
            }
        }
    }
    out
}

fn scalar_example(report: &SchemaReport, path: &str, types: &BTreeSet<String>) -> Option<String> {
    if types.len() != 1 {
        return None;
    }
    let only = types.iter().next()?;
    if !matches!(only.as_str(), "string" | "int" | "float" | "bool") {
        return None;
    }
    match value_at(report.sample.as_ref()?, path)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_labels() {
        assert_eq!(type_label(&json!(null)), "null");
        assert_eq!(type_label(&json!(true)), "bool");
        assert_eq!(type_label(&json!(3)), "int");
        assert_eq!(type_label(&json!(3.5)), "float");
        assert_eq!(type_label(&json!("x")), "string");
        assert_eq!(type_label(&json!({})), "object");
    }

    #[test]
    fn list_labels_sample_first_five() {
        assert_eq!(type_label(&json!([])), "list[empty]");
        assert_eq!(type_label(&json!([1, 2])), "list[int]");
        assert_eq!(type_label(&json!([1, "a", 2.5])), "list[mixed: float, int, string]");
        // The sixth element is not inspected.
        assert_eq!(type_label(&json!([1, 2, 3, 4, 5, "late"])), "list[int]");
        assert_eq!(type_label(&json!([[1], [2]])), "list[list[int]]");
    }

    #[test]
    fn paths_descend_into_objects_and_object_lists() {
        let record = json!({
            "trajectory": {
                "rewards": [-1, 99],
                "actions": [
                    {"action_type": "A"},
                    {"action_type": "B", "parameters": {"x": 1}},
                    {"action_type": "C"},
                    {"late": true}
                ]
            },
            "end_reason": null
        });
        let mut schema = Schema::new();
        collect_paths(record.as_object().unwrap(), "", &mut schema);
        assert!(schema["trajectory"].contains("object"));
        assert!(schema["trajectory.rewards"].contains("list[int]"));
        assert!(schema["trajectory.actions"].contains("list[object]"));
        assert!(schema["trajectory.actions.action_type"].contains("string"));
        assert!(schema["trajectory.actions.parameters.x"].contains("int"));
        assert!(schema["end_reason"].contains("null"));
        assert!(!schema.contains_key("trajectory.actions.late"));
    }

    #[test]
    fn value_at_follows_members() {
        let record = json!({"a": {"b": {"c": 5}}});
        assert_eq!(value_at(&record, "a.b.c"), Some(&json!(5)));
        assert_eq!(value_at(&record, "a.x"), None);
    }

    #[test]
    fn file_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        std::fs::write(
            &path,
            "{\"agent_name\": \"q\", \"n\": 1}\nbroken\n\n{\"agent_name\": 5}\n{\"extra\": 1}\n",
        )
        .unwrap();

        let report = analyze_schema(&path, 2).unwrap();
        assert_eq!(report.total_lines, 4);
        assert_eq!(report.lines_analyzed, 2);
        assert_eq!(report.parse_errors, 1);
        assert_eq!(report.first_errors[0].0, 2);
        assert_eq!(
            report.schema["agent_name"].iter().cloned().collect::<Vec<_>>(),
            vec!["int".to_string(), "string".to_string()]
        );
        assert!(!report.schema.contains_key("extra"));

        let text = render_text(&report);
        assert!(text.contains("agent_name: int | string"));
        assert!(text.contains("n: int\n  └─ example: 1"));
        assert!(text.contains("Error on line 2:"));
        assert!(text.contains("SAMPLE RECORD (first entry)"));
    }

    #[test]
    fn bool_examples_use_json_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.jsonl");
        std::fs::write(&path, "{\"done\": true}\n").unwrap();

        let text = render_text(&analyze_schema(&path, 100).unwrap());
        assert!(text.contains("done: bool\n  └─ example: true\n"));
        assert!(!text.contains("True"));
    }

    #[test]
    fn long_examples_and_samples_are_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.jsonl");
        let long = "x".repeat(3000);
        std::fs::write(&path, format!("{{\"blob\": \"{long}\"}}\n")).unwrap();

        let text = render_text(&analyze_schema(&path, 100).unwrap());
        assert!(text.contains(&format!("example: {}...", "x".repeat(60))));
        assert!(text.contains("... (truncated)"));
    }

    #[test]
    fn missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyze_schema(&dir.path().join("none.jsonl"), 10).unwrap_err();
        assert!(err.is_not_found());
    }
}
