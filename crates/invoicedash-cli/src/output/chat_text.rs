use std::io;

use serde_json::Value;

use super::format::{self, Column};

const MAX_PREVIEW_ROWS: usize = 20;

pub fn render_chat(data: &Value) -> io::Result<String> {
    if !data.is_object() {
        return Err(io::Error::other("chat output requires an object"));
    }

    let mut lines = Vec::new();
    if let Some(explanation) = data
        .get("explanation")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
    {
        lines.push(explanation.to_string());
        lines.push(String::new());
    }

    if let Some(sql) = data.get("sql").and_then(Value::as_str).filter(|sql| !sql.is_empty()) {
        lines.push("SQL:".to_string());
        lines.extend(sql.lines().map(|line| format!("  {line}")));
        lines.push(String::new());
    }

    match data.get("data") {
        Some(Value::Array(rows)) if !rows.is_empty() => lines.extend(render_rows(rows)),
        Some(Value::Array(_)) => lines.push("The query returned no rows.".to_string()),
        Some(Value::Null) | None => {}
        Some(other) => lines.push(scalar_text(other)),
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push("The service returned an empty answer.".to_string());
    }
    Ok(lines.join("\n"))
}

/// Object rows become a table keyed by the first row's fields; anything else
/// is listed one value per line.
fn render_rows(rows: &[Value]) -> Vec<String> {
    let Some(first) = rows.first().and_then(Value::as_object) else {
        return rows.iter().map(|row| format!("  {}", scalar_text(row))).collect();
    };

    let keys = first.keys().cloned().collect::<Vec<String>>();
    let columns = keys
        .iter()
        .map(|key| Column::left(key.as_str()))
        .collect::<Vec<Column<'_>>>();
    let table_rows = rows
        .iter()
        .take(MAX_PREVIEW_ROWS)
        .map(|row| {
            keys.iter()
                .map(|key| row.get(key).map(scalar_text).unwrap_or_default())
                .collect::<Vec<String>>()
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = format::render_table(&columns, &table_rows, format::terminal_width());
    if rows.len() > MAX_PREVIEW_ROWS {
        lines.push(format!(
            "  … {} more rows (use --json for all of them)",
            rows.len() - MAX_PREVIEW_ROWS
        ));
    }
    lines
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_chat;

    #[test]
    fn renders_explanation_sql_and_rows() {
        let rendered = render_chat(&json!({
            "sql": "SELECT name FROM vendors",
            "data": [{ "name": "Acme Corp" }, { "name": "Globex" }],
            "explanation": "Two vendors on record."
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Two vendors on record."));
            assert!(text.contains("  SELECT name FROM vendors"));
            assert!(text.contains("  Acme Corp"));
        }
    }

    #[test]
    fn long_results_are_previewed() {
        let rows = (0..25).map(|index| json!({ "n": index })).collect::<Vec<_>>();
        let rendered = render_chat(&json!({ "data": rows }));
        assert!(rendered.is_ok_and(|text| text.contains("5 more rows")));
    }

    #[test]
    fn empty_answer_is_reported() {
        let rendered = render_chat(&json!({}));
        assert!(rendered.is_ok_and(|text| text == "The service returned an empty answer."));
    }
}
