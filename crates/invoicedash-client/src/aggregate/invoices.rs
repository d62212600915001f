use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};

use crate::ClientResult;
use crate::aggregate::collect_rows;
use crate::contracts::types::{InvoiceListData, InvoiceListRow, Pagination};
use crate::state::map_sqlite_error;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub vendor_id: Option<String>,
    pub status: Option<String>,
    /// Canonical UTC timestamps; both bounds inclusive.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Default for InvoiceQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            vendor_id: None,
            status: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// One page of invoices plus the size of the whole filtered set. Ordering is
/// newest invoice date first, undated invoices last, then invoice id, so pages
/// never overlap.
pub fn list_invoices(
    connection: &Connection,
    db_path: &Path,
    query: &InvoiceQuery,
) -> ClientResult<InvoiceListData> {
    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let (where_sql, mut values) = filter_clause(query);

    let total = connection
        .query_row(
            &format!(
                "SELECT COUNT(*)
                 FROM invoices i
                 LEFT JOIN vendors v ON v.id = i.vendor_id
                 LEFT JOIN payments p ON p.invoice_id = i.id
                 {where_sql}"
            ),
            params_from_iter(values.iter()),
            |row| row.get::<_, i64>(0),
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    values.push(SqlValue::Integer(limit));
    values.push(SqlValue::Integer((page - 1).saturating_mul(limit)));

    let mut statement = connection
        .prepare(&format!(
            "SELECT
                i.id,
                COALESCE(i.invoice_number, i.invoice_id, 'N/A'),
                i.invoice_date,
                COALESCE(v.name, 'Unknown'),
                i.vendor_id,
                COALESCE(i.total_amount, 0),
                COALESCE(i.currency, 'EUR'),
                COALESCE(p.status, 'pending'),
                p.due_date
             FROM invoices i
             LEFT JOIN vendors v ON v.id = i.vendor_id
             LEFT JOIN payments p ON p.invoice_id = i.id
             {where_sql}
             ORDER BY i.invoice_date IS NULL ASC, i.invoice_date DESC, i.id ASC
             LIMIT ? OFFSET ?"
        ))
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows = statement
        .query_map(params_from_iter(values.iter()), |row| {
            Ok(InvoiceListRow {
                id: row.get(0)?,
                invoice_number: row.get(1)?,
                invoice_date: row.get(2)?,
                vendor: row.get(3)?,
                vendor_id: row.get(4)?,
                amount: row.get(5)?,
                currency: row.get(6)?,
                status: row.get(7)?,
                due_date: row.get(8)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(InvoiceListData {
        data: collect_rows(rows, db_path)?,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        },
    })
}

fn filter_clause(query: &InvoiceQuery) -> (String, Vec<SqlValue>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(search) = non_blank(query.search.as_deref()) {
        conditions.push(
            "(instr(fold_case(i.invoice_number), ?) > 0
              OR instr(fold_case(i.invoice_id), ?) > 0
              OR instr(fold_case(v.name), ?) > 0)",
        );
        let needle = fold_needle(search);
        for _ in 0..3 {
            values.push(SqlValue::Text(needle.clone()));
        }
    }
    if let Some(vendor_id) = non_blank(query.vendor_id.as_deref()) {
        conditions.push("i.vendor_id = ?");
        values.push(SqlValue::Text(vendor_id.to_string()));
    }
    if let Some(status) = non_blank(query.status.as_deref()) {
        conditions.push("p.status = ?");
        values.push(SqlValue::Text(status.to_string()));
    }
    if let Some(start) = &query.start_date {
        conditions.push("i.invoice_date >= ?");
        values.push(SqlValue::Text(start.clone()));
    }
    if let Some(end) = &query.end_date {
        conditions.push("i.invoice_date <= ?");
        values.push(SqlValue::Text(end.clone()));
    }

    if conditions.is_empty() {
        return (String::new(), values);
    }
    (format!("WHERE {}", conditions.join(" AND ")), values)
}

/// Substring match through `instr`, so the needle carries no wildcards. Both
/// sides are folded with the same Unicode lowercase mapping.
fn fold_needle(needle: &str) -> String {
    needle.to_lowercase()
}

pub(crate) fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    total / limit + i64::from(total % limit != 0)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}
