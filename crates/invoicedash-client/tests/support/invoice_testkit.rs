use std::fs;
use std::path::{Path, PathBuf};

use invoicedash_client::commands::ingest::{self, IngestRunOptions};
use invoicedash_client::ingest::{IngestOptions, LineItemPolicy};
use rusqlite::Connection;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

pub fn temp_home() -> std::io::Result<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let home = dir.path().join("invoicedash-home");
    Ok((dir, home))
}

/// Builder for one extraction record in the nested value-envelope layout.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    id: String,
    llm: serde_json::Map<String, Value>,
    document: serde_json::Map<String, Value>,
}

pub fn record(id: &str) -> RecordBuilder {
    RecordBuilder {
        id: id.to_string(),
        llm: serde_json::Map::new(),
        document: serde_json::Map::new(),
    }
}

impl RecordBuilder {
    pub fn vendor(mut self, name: &str, party_number: &str) -> Self {
        self.llm.insert(
            "vendor".to_string(),
            json!({ "value": {
                "vendorName": { "value": name },
                "vendorPartyNumber": { "value": party_number }
            } }),
        );
        self
    }

    pub fn customer(mut self, name: &str) -> Self {
        self.llm.insert(
            "customer".to_string(),
            json!({ "value": { "customerName": { "value": name } } }),
        );
        self
    }

    pub fn invoice(mut self, invoice_id: &str, invoice_date: &str) -> Self {
        self.llm.insert(
            "invoice".to_string(),
            json!({ "value": {
                "invoiceId": { "value": invoice_id },
                "invoiceDate": { "value": invoice_date }
            } }),
        );
        self
    }

    pub fn invoice_with_category(mut self, invoice_id: &str, category: &str) -> Self {
        self.llm.insert(
            "invoice".to_string(),
            json!({ "value": {
                "invoiceId": { "value": invoice_id },
                "category": { "value": category }
            } }),
        );
        self
    }

    pub fn total(mut self, total: f64, currency: &str) -> Self {
        self.llm.insert(
            "summary".to_string(),
            json!({ "value": {
                "invoiceTotal": { "value": total },
                "currencySymbol": { "value": currency }
            } }),
        );
        self
    }

    pub fn payment(mut self, due_date: &str, status: &str) -> Self {
        self.llm.insert(
            "payment".to_string(),
            json!({ "value": {
                "dueDate": { "value": due_date },
                "status": { "value": status }
            } }),
        );
        self
    }

    /// `items` are `(category, total_price)` pairs in the `items.value` layout.
    pub fn line_items(mut self, items: &[(Option<&str>, f64)]) -> Self {
        let entries = items
            .iter()
            .map(|(category, total)| match category {
                Some(name) => json!({
                    "category": { "value": name },
                    "totalPrice": { "value": total }
                }),
                None => json!({ "totalPrice": { "value": total } }),
            })
            .collect::<Vec<Value>>();
        self.llm.insert(
            "lineItems".to_string(),
            json!({ "value": { "items": { "value": entries } } }),
        );
        self
    }

    pub fn created_at(mut self, timestamp: &str) -> Self {
        self.document
            .insert("createdAt".to_string(), json!({ "$date": timestamp }));
        self
    }

    pub fn build(self) -> Value {
        let mut object = self.document;
        object.insert("_id".to_string(), json!(self.id));
        object.insert("name".to_string(), json!(format!("{}.pdf", self.id)));
        object.insert(
            "extractedData".to_string(),
            json!({ "llmData": Value::Object(self.llm) }),
        );
        Value::Object(object)
    }
}

pub fn ingest_records(home: &Path, records: &[Value]) -> Value {
    ingest_records_with(home, records, IngestOptions::default())
}

pub fn ingest_records_with_policy(home: &Path, records: &[Value], policy: LineItemPolicy) -> Value {
    ingest_records_with(
        home,
        records,
        IngestOptions {
            line_item_policy: policy,
            ..IngestOptions::default()
        },
    )
}

pub fn ingest_records_with(home: &Path, records: &[Value], options: IngestOptions) -> Value {
    let body = serde_json::to_string(records).unwrap_or_default();
    let result = ingest::run_with_options(IngestRunOptions {
        path: Some("-".to_string()),
        ingest: options,
        home_override: Some(home),
        stdin_override: Some(body),
    });
    assert!(result.is_ok());
    result.map(|envelope| envelope.data).unwrap_or(Value::Null)
}

pub fn write_fixture(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(records).unwrap_or_default();
    assert!(fs::write(&path, body).is_ok());
    path
}

pub fn open_db(home: &Path) -> Option<Connection> {
    Connection::open(home.join("analytics.db")).ok()
}

pub fn count(home: &Path, table: &str) -> i64 {
    open_db(home)
        .and_then(|connection| {
            connection
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .ok()
        })
        .unwrap_or(-1)
}

pub fn single_string(home: &Path, sql: &str) -> Option<String> {
    open_db(home).and_then(|connection| connection.query_row(sql, [], |row| row.get(0)).ok())
}
