use std::io;

use serde_json::Value;

use super::format::{self, Column, i64_field, str_field};

pub fn render_ingest_run(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .filter(|summary| summary.is_object())
        .ok_or_else(|| io::Error::other("ingest output requires summary"))?;
    let aborted = summary
        .get("aborted")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut lines = vec![str_field(data, "message").to_string(), String::new()];
    lines.push("Summary:".to_string());

    let source = match data.get("path").and_then(Value::as_str) {
        Some(path) if path != "-" => path.to_string(),
        _ => "stdin".to_string(),
    };
    lines.extend(format::key_value_rows(
        &[
            ("Run ID:", str_field(data, "run_id").to_string()),
            ("Source:", source),
            ("Line items:", str_field(data, "line_item_policy").to_string()),
            ("Records read:", i64_field(summary, "records_read").to_string()),
            ("Processed:", i64_field(summary, "processed").to_string()),
            ("Skipped:", i64_field(summary, "skipped").to_string()),
            ("Errors:", i64_field(summary, "errors").to_string()),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if aborted || i64_field(summary, "errors") > 0 {
        lines.push("  1. Re-run with `--verbose` to see which records failed and why.".to_string());
        lines.push("  2. Fix or remove those records; re-ingesting the rest is safe.".to_string());
    } else {
        lines.push("  1. Run `invoicedash stats` for the headline numbers.".to_string());
        lines.push("  2. Run `invoicedash invoices` to browse what was loaded.".to_string());
    }

    Ok(lines.join("\n"))
}

pub fn render_ingest_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("ingest list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No ingestion runs yet.",
            "",
            "Load your first export:",
            "  1. invoicedash ingest --help",
            "  2. invoicedash ingest <path>",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 ingestion run found.".to_string()
    } else {
        format!("{} ingestion runs found.", rows.len())
    };

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_field(row, "run_id").to_string(),
                str_field(row, "status").to_string(),
                str_field(row, "started_at").to_string(),
                source_label(row),
                i64_field(row, "processed").to_string(),
                i64_field(row, "skipped").to_string(),
                i64_field(row, "errors").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![count_label, String::new()];
    lines.extend(format::render_table(
        &[
            Column::left("Run ID"),
            Column::left("Status"),
            Column::left("Started"),
            Column::left("Source"),
            Column::right("Processed"),
            Column::right("Skipped"),
            Column::right("Errors"),
        ],
        &table_rows,
        format::terminal_width(),
    ));
    Ok(lines.join("\n"))
}

fn source_label(row: &Value) -> String {
    match row.get("source_ref").and_then(Value::as_str) {
        Some(reference) if !reference.is_empty() => reference.to_string(),
        _ => str_field(row, "source_kind").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_ingest_list, render_ingest_run};

    #[test]
    fn completed_run_points_at_the_dashboard() {
        let rendered = render_ingest_run(&json!({
            "run_id": "run_1",
            "path": "-",
            "source_kind": "stdin",
            "line_item_policy": "append",
            "message": "Ingestion completed. Processed 2, skipped 0, errors 0.",
            "summary": { "records_read": 2, "processed": 2, "skipped": 0, "errors": 0, "aborted": false }
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Ingestion completed."));
            assert!(text.contains("  Source:        stdin"));
            assert!(text.contains("invoicedash stats"));
        }
    }

    #[test]
    fn aborted_run_suggests_verbose_rerun() {
        let rendered = render_ingest_run(&json!({
            "run_id": "run_1",
            "path": "export.json",
            "message": "Ingestion aborted after 11 errors. 0 records were processed before stopping.",
            "summary": { "records_read": 20, "processed": 0, "skipped": 0, "errors": 11, "aborted": true }
        }));
        assert!(rendered.is_ok_and(|text| text.contains("--verbose") && text.contains("export.json")));
    }

    #[test]
    fn empty_list_explains_how_to_start() {
        let rendered = render_ingest_list(&json!({ "rows": [] }));
        assert!(rendered.is_ok_and(|text| text.starts_with("No ingestion runs yet.")));
    }

    #[test]
    fn list_prefers_source_path_over_kind() {
        let rendered = render_ingest_list(&json!({ "rows": [{
            "run_id": "run_1",
            "status": "completed",
            "source_kind": "file",
            "source_ref": "/data/export.json",
            "started_at": "2024-03-16T09:12:00Z",
            "processed": 3,
            "skipped": 0,
            "errors": 0
        }] }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("1 ingestion run found."));
            assert!(text.contains("/data/export.json"));
        }
    }
}
