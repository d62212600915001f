use std::io;

use serde_json::Value;

use super::format::{self, Column, f64_field, i64_field, str_field};

const TABLES: [&str; 6] = [
    "documents",
    "vendors",
    "customers",
    "invoices",
    "payments",
    "line_items",
];

pub fn render_db_status(data: &Value) -> io::Result<String> {
    let counts = data
        .get("counts")
        .filter(|counts| counts.is_object())
        .ok_or_else(|| io::Error::other("db status output requires counts"))?;

    let mut lines = vec!["Analytics store:".to_string()];
    lines.extend(format::key_value_rows(
        &[
            ("Home:", str_field(data, "home").to_string()),
            ("Database:", str_field(data, "db_path").to_string()),
            ("Schema:", str_field(data, "schema_version").to_string()),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Rows:".to_string());
    let count_entries = TABLES
        .iter()
        .map(|table| (*table, i64_field(counts, table).to_string()))
        .collect::<Vec<(&str, String)>>();
    lines.extend(format::key_value_rows(&count_entries, 2));

    lines.push(String::new());
    match data.get("sample_invoice").filter(|sample| sample.is_object()) {
        Some(sample) => {
            lines.push("Sample invoice:".to_string());
            let vendor = match str_field(sample, "vendor_name") {
                "" => "-",
                name => name,
            };
            lines.extend(format::key_value_rows(
                &[
                    ("Number:", str_field(sample, "invoice_number").to_string()),
                    ("Total:", format::format_amount(f64_field(sample, "total_amount"))),
                    ("Vendor:", vendor.to_string()),
                    ("Line items:", i64_field(sample, "line_item_count").to_string()),
                ],
                2,
            ));
        }
        None => lines.push("No invoices yet. Run `invoicedash ingest <path>` to load some.".to_string()),
    }

    Ok(lines.join("\n"))
}

pub fn render_export(data: &Value) -> io::Result<String> {
    let files = data
        .get("files")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("export output requires files"))?;

    let table_rows = files
        .iter()
        .map(|file| {
            vec![
                str_field(file, "table").to_string(),
                i64_field(file, "rows").to_string(),
                str_field(file, "path").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!("Exported to {}:", str_field(data, "directory"))];
    lines.push(String::new());
    lines.extend(format::render_table(
        &[Column::left("Table"), Column::right("Rows"), Column::left("File")],
        &table_rows,
        format::terminal_width(),
    ));
    Ok(lines.join("\n"))
}

pub fn render_health(data: &Value) -> io::Result<String> {
    Ok(format!(
        "{} ({})",
        str_field(data, "status"),
        str_field(data, "timestamp")
    ))
}
