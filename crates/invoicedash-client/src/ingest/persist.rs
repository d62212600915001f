use std::path::Path;

use rusqlite::{Connection, params};
use ulid::Ulid;

use crate::ClientResult;
use crate::ingest::LineItemPolicy;
use crate::ingest::normalize::{DocumentRow, InvoiceRow, LineItemRow, NormalizedRecord, PaymentRow};
use crate::resolve::{EntityKind, resolve};
use crate::state::map_sqlite_write_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PersistOutcome {
    pub(crate) document_id: String,
    pub(crate) invoice_id: String,
    pub(crate) invoice_created: bool,
    pub(crate) vendor_id: Option<String>,
    pub(crate) customer_id: Option<String>,
    pub(crate) line_items_written: usize,
}

/// Writes one normalized record. Every upsert is create-if-absent: rows that
/// already exist for the same natural key are reused, never refreshed.
pub(crate) fn persist_record(
    connection: &Connection,
    db_path: &Path,
    record: &NormalizedRecord,
    policy: LineItemPolicy,
    timestamp: &str,
) -> ClientResult<PersistOutcome> {
    let vendor_id = match &record.vendor {
        Some(party) => Some(resolve(connection, db_path, EntityKind::Vendor, party, timestamp)?.id),
        None => None,
    };
    let customer_id = match &record.customer {
        Some(party) => {
            Some(resolve(connection, db_path, EntityKind::Customer, party, timestamp)?.id)
        }
        None => None,
    };

    let document_id = upsert_document(connection, db_path, &record.document)?;
    let (invoice_id, invoice_created) = upsert_invoice(
        connection,
        db_path,
        &document_id,
        &record.invoice,
        vendor_id.as_deref(),
        customer_id.as_deref(),
        timestamp,
    )?;

    if let Some(payment) = &record.payment {
        upsert_payment(connection, db_path, &invoice_id, payment, timestamp)?;
    }

    let write_line_items = match policy {
        LineItemPolicy::Append => true,
        LineItemPolicy::SkipExisting => invoice_created,
    };
    let mut line_items_written = 0_usize;
    if write_line_items {
        for item in &record.line_items {
            insert_line_item(connection, db_path, &invoice_id, item, timestamp)?;
            line_items_written += 1;
        }
    }

    Ok(PersistOutcome {
        document_id,
        invoice_id,
        invoice_created,
        vendor_id,
        customer_id,
        line_items_written,
    })
}

fn upsert_document(connection: &Connection, db_path: &Path, row: &DocumentRow) -> ClientResult<String> {
    let candidate_id = format!("doc_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO documents (
                id,
                external_id,
                name,
                file_path,
                file_size,
                file_type,
                status,
                organization_id,
                department_id,
                uploaded_by_id,
                is_validated,
                created_at,
                updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT (external_id) DO NOTHING",
            params![
                &candidate_id,
                &row.external_id,
                &row.name,
                &row.file_path,
                row.file_size,
                &row.file_type,
                &row.status,
                &row.organization_id,
                &row.department_id,
                &row.uploaded_by_id,
                row.is_validated,
                &row.created_at,
                &row.updated_at
            ],
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;

    connection
        .query_row(
            "SELECT id FROM documents WHERE external_id = ?1",
            params![&row.external_id],
            |result| result.get::<_, String>(0),
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))
}

fn upsert_invoice(
    connection: &Connection,
    db_path: &Path,
    document_id: &str,
    row: &InvoiceRow,
    vendor_id: Option<&str>,
    customer_id: Option<&str>,
    timestamp: &str,
) -> ClientResult<(String, bool)> {
    let candidate_id = format!("inv_{}", Ulid::new());
    let inserted = connection
        .execute(
            "INSERT INTO invoices (
                id,
                document_id,
                invoice_id,
                invoice_number,
                invoice_date,
                delivery_date,
                total_amount,
                subtotal,
                tax_amount,
                currency,
                category,
                vendor_id,
                customer_id,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT (document_id) DO NOTHING",
            params![
                &candidate_id,
                document_id,
                &row.invoice_id,
                &row.invoice_number,
                &row.invoice_date,
                &row.delivery_date,
                row.total_amount,
                row.subtotal,
                row.tax_amount,
                &row.currency,
                &row.category,
                vendor_id,
                customer_id,
                timestamp
            ],
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;

    let invoice_id = connection
        .query_row(
            "SELECT id FROM invoices WHERE document_id = ?1",
            params![document_id],
            |result| result.get::<_, String>(0),
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;

    Ok((invoice_id, inserted > 0))
}

fn upsert_payment(
    connection: &Connection,
    db_path: &Path,
    invoice_id: &str,
    row: &PaymentRow,
    timestamp: &str,
) -> ClientResult<()> {
    let candidate_id = format!("pay_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO payments (
                id,
                invoice_id,
                due_date,
                payment_terms,
                payment_method,
                paid_date,
                paid_amount,
                status,
                net_days,
                discount_percentage,
                discount_days,
                discount_due_date,
                discounted_total,
                bank_account_number,
                bic,
                account_name,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT (invoice_id) DO NOTHING",
            params![
                &candidate_id,
                invoice_id,
                &row.due_date,
                &row.payment_terms,
                &row.payment_method,
                &row.paid_date,
                row.paid_amount,
                &row.status,
                row.net_days,
                row.discount_percentage,
                row.discount_days,
                &row.discount_due_date,
                row.discounted_total,
                &row.bank_account_number,
                &row.bic,
                &row.account_name,
                timestamp
            ],
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;
    Ok(())
}

fn insert_line_item(
    connection: &Connection,
    db_path: &Path,
    invoice_id: &str,
    row: &LineItemRow,
    timestamp: &str,
) -> ClientResult<()> {
    let line_item_id = format!("li_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO line_items (
                id,
                invoice_id,
                description,
                quantity,
                unit_price,
                total_price,
                category,
                tax_rate,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &line_item_id,
                invoice_id,
                &row.description,
                row.quantity,
                row.unit_price,
                row.total_price,
                &row.category,
                row.tax_rate,
                timestamp
            ],
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;
    Ok(())
}
