use std::io;

use serde_json::Value;

use super::format::{
    self, Column, day_field, f64_field, format_amount, i64_field, str_field,
};

fn rows_of<'a>(data: &'a Value, command: &str) -> io::Result<&'a Vec<Value>> {
    data.as_array()
        .ok_or_else(|| io::Error::other(format!("{command} output requires an array")))
}

pub fn render_stats(data: &Value) -> io::Result<String> {
    if !data.is_object() {
        return Err(io::Error::other("stats output requires an object"));
    }

    let mut lines = vec!["This year so far:".to_string()];
    lines.extend(format::key_value_rows(
        &[
            ("Total spend:", format_amount(f64_field(data, "totalSpend"))),
            ("Invoices:", i64_field(data, "totalInvoices").to_string()),
            ("Documents uploaded:", i64_field(data, "documentsUploaded").to_string()),
            (
                "Average invoice:",
                format_amount(f64_field(data, "averageInvoiceValue")),
            ),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_trends(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "trends")?;
    if rows.is_empty() {
        return Ok("No dated invoices yet. Run `invoicedash ingest <path>` first.".to_string());
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_field(row, "month").to_string(),
                i64_field(row, "count").to_string(),
                format_amount(f64_field(row, "value")),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec!["Invoices per month:".to_string(), String::new()];
    lines.extend(format::render_table(
        &[
            Column::left("Month"),
            Column::right("Invoices"),
            Column::right("Value"),
        ],
        &table_rows,
        format::terminal_width(),
    ));
    Ok(lines.join("\n"))
}

pub fn render_top_vendors(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "vendors top")?;
    if rows.is_empty() {
        return Ok("No vendors yet.".to_string());
    }

    let table_rows = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            vec![
                (index + 1).to_string(),
                str_field(row, "vendorName").to_string(),
                format_amount(f64_field(row, "totalSpend")),
                str_field(row, "vendorId").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec!["Top vendors by spend:".to_string(), String::new()];
    lines.extend(format::render_table(
        &[
            Column::right("#"),
            Column::left("Vendor"),
            Column::right("Spend"),
            Column::left("Vendor ID"),
        ],
        &table_rows,
        format::terminal_width(),
    ));
    Ok(lines.join("\n"))
}

pub fn render_categories(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "categories")?;
    if rows.is_empty() {
        return Ok("No categorized spend yet.".to_string());
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_field(row, "category").to_string(),
                format_amount(f64_field(row, "spend")),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec!["Spend by category:".to_string(), String::new()];
    lines.extend(format::render_table(
        &[Column::left("Category"), Column::right("Spend")],
        &table_rows,
        format::terminal_width(),
    ));
    Ok(lines.join("\n"))
}

pub fn render_cash_outflow(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "cash-outflow")?;
    if rows.is_empty() {
        return Ok("No payments with a due date in range.".to_string());
    }

    let total = rows.iter().map(|row| f64_field(row, "amount")).sum::<f64>();
    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_field(row, "date").to_string(),
                format_amount(f64_field(row, "amount")),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec!["Amounts due by date:".to_string(), String::new()];
    lines.extend(format::render_table(
        &[Column::left("Due date"), Column::right("Amount")],
        &table_rows,
        format::terminal_width(),
    ));
    lines.push(String::new());
    lines.push(format!("  Total due: {}", format_amount(total)));
    Ok(lines.join("\n"))
}

pub fn render_invoices(data: &Value) -> io::Result<String> {
    let rows = data
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("invoices output requires data"))?;
    let pagination = data.get("pagination").cloned().unwrap_or(Value::Null);
    let page = i64_field(&pagination, "page");
    let total_pages = i64_field(&pagination, "totalPages");
    let total = i64_field(&pagination, "total");

    if rows.is_empty() {
        if total == 0 {
            return Ok("No invoices match these filters.".to_string());
        }
        return Ok(format!(
            "Page {page} is past the last page ({total_pages}). {total} invoices match."
        ));
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_field(row, "invoiceNumber").to_string(),
                day_field(row, "invoiceDate"),
                str_field(row, "vendor").to_string(),
                format!(
                    "{} {}",
                    format_amount(f64_field(row, "amount")),
                    str_field(row, "currency")
                ),
                str_field(row, "status").to_string(),
                day_field(row, "dueDate"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!(
        "Invoices (page {page} of {total_pages}, {total} total):"
    )];
    lines.push(String::new());
    lines.extend(format::render_table(
        &[
            Column::left("Number"),
            Column::left("Date"),
            Column::left("Vendor"),
            Column::right("Amount"),
            Column::left("Status"),
            Column::left("Due"),
        ],
        &table_rows,
        format::terminal_width(),
    ));
    if page < total_pages {
        lines.push(String::new());
        lines.push(format!("  Next page: invoicedash invoices --page {}", page + 1));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_cash_outflow, render_invoices, render_stats, render_trends};

    #[test]
    fn stats_render_amounts_and_counts() {
        let rendered = render_stats(&json!({
            "totalSpend": 1200.5,
            "totalInvoices": 1,
            "documentsUploaded": 2,
            "averageInvoiceValue": 1200.5
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("Total spend:"));
            assert!(text.contains("1,200.50"));
            assert!(text.contains("Documents uploaded:  2"));
        }
    }

    #[test]
    fn empty_trends_point_at_ingest() {
        let rendered = render_trends(&json!([]));
        assert!(rendered.is_ok_and(|text| text.contains("invoicedash ingest")));
    }

    #[test]
    fn cash_outflow_prints_a_total() {
        let rendered = render_cash_outflow(&json!([
            { "date": "2024-04-01", "amount": 150.0 },
            { "date": "2024-04-20", "amount": 25.0 }
        ]));
        assert!(rendered.is_ok_and(|text| text.ends_with("  Total due: 175.00")));
    }

    #[test]
    fn invoices_show_paging_hint_until_the_last_page() {
        let row = json!({
            "id": "inv_1",
            "invoiceNumber": "INV-1",
            "invoiceDate": "2024-03-15T00:00:00Z",
            "vendor": "Acme Corp",
            "vendorId": "ven_1",
            "amount": 1200.5,
            "currency": "EUR",
            "status": "pending",
            "dueDate": null
        });
        let first = render_invoices(&json!({
            "data": [row.clone()],
            "pagination": { "page": 1, "limit": 1, "total": 2, "totalPages": 2 }
        }));
        assert!(first.is_ok());
        if let Ok(text) = first {
            assert!(text.starts_with("Invoices (page 1 of 2, 2 total):"));
            assert!(text.contains("1,200.50 EUR"));
            assert!(text.contains("2024-03-15"));
            assert!(text.contains("--page 2"));
        }

        let last = render_invoices(&json!({
            "data": [row],
            "pagination": { "page": 2, "limit": 1, "total": 2, "totalPages": 2 }
        }));
        assert!(last.is_ok_and(|text| !text.contains("Next page")));
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(render_trends(&json!({})).is_err());
        assert!(render_invoices(&json!([])).is_err());
    }
}
