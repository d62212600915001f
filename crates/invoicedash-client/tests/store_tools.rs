mod support;

use std::fs;

use invoicedash_client::commands::{db, export, health};
use serde_json::{Value, json};
use support::invoice_testkit::{ingest_records, record, temp_home};

#[test]
fn db_status_reports_counts_and_the_first_invoice() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1")
                    .vendor("Acme Corp", "")
                    .customer("Globex")
                    .invoice("INV-1", "2024-03-15")
                    .total(1200.50, "EUR")
                    .payment("2024-04-14", "pending")
                    .line_items(&[(Some("Office Supplies"), 200.0), (None, 1000.5)])
                    .build(),
                record("doc-2").invoice("INV-2", "2024-03-16").build(),
            ],
        );

        let result = db::status_with_home_override(Some(&home));
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            assert_eq!(envelope.command, "db status");
            assert_eq!(
                envelope.data["counts"],
                json!({
                    "documents": 2,
                    "vendors": 1,
                    "customers": 1,
                    "invoices": 2,
                    "payments": 1,
                    "line_items": 2
                })
            );
            let sample = &envelope.data["sample_invoice"];
            assert_eq!(sample["invoice_number"], json!("INV-1"));
            assert_eq!(sample["vendor_name"], json!("Acme Corp"));
            assert_eq!(sample["line_item_count"], json!(2));
            assert!(envelope.data["schema_version"].as_str().is_some_and(|version| !version.is_empty()));
        }
    }
}

#[test]
fn db_status_on_a_fresh_store_has_no_sample() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let result = db::status_with_home_override(Some(&home));
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            assert_eq!(envelope.data["counts"]["invoices"], json!(0));
            assert_eq!(envelope.data["sample_invoice"], Value::Null);
            assert!(home.join("analytics.db").exists());
        }
    }
}

#[test]
fn export_writes_one_csv_per_table_with_headers() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((dir, home)) = temp {
        ingest_records(
            &home,
            &[record("doc-1")
                .vendor("Acme, Inc.", "")
                .invoice("INV-1", "2024-03-15")
                .total(10.0, "EUR")
                .build()],
        );

        let target = dir.path().join("export");
        let result = export::csv_with_home_override(&target, Some(&home));
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            let files = envelope.data["files"].as_array().cloned().unwrap_or_default();
            let tables = files
                .iter()
                .filter_map(|file| file["table"].as_str())
                .collect::<Vec<&str>>();
            assert_eq!(
                tables,
                vec!["documents", "vendors", "customers", "invoices", "payments", "line_items"]
            );
            assert_eq!(files[1]["rows"], json!(1));
            assert_eq!(files[4]["rows"], json!(0));
        }

        let vendors = fs::read_to_string(target.join("vendors.csv"));
        assert!(vendors.is_ok());
        if let Ok(contents) = vendors {
            let mut lines = contents.lines();
            assert!(lines.next().is_some_and(|header| header.starts_with("id,")));
            assert!(lines.next().is_some_and(|row| row.contains("\"Acme, Inc.\"")));
        }
        let payments = fs::read_to_string(target.join("payments.csv"));
        assert!(payments.is_ok_and(|contents| contents.lines().count() == 1));
    }
}

#[test]
fn health_reports_ok_with_a_millisecond_timestamp() {
    let result = health::run();
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert_eq!(envelope.data["status"], json!("ok"));
        let timestamp = envelope.data["timestamp"].as_str().unwrap_or_default();
        assert!(timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert_eq!(timestamp.split('.').nth(1).map(str::len), Some(4));
    }
}
