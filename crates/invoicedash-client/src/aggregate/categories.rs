use std::path::Path;

use rusqlite::Connection;

use crate::ClientResult;
use crate::aggregate::collect_rows;
use crate::contracts::types::CategorySpend;
use crate::state::map_sqlite_error;

pub const UNCATEGORIZED: &str = "Uncategorized";

const LINE_ITEM_CATEGORY_SQL: &str = "SELECT category, COALESCE(SUM(total_price), 0)
     FROM line_items
     WHERE category IS NOT NULL
     GROUP BY category";

const INVOICE_CATEGORY_SQL: &str = "SELECT COALESCE(category, 'Uncategorized'), COALESCE(SUM(total_amount), 0)
     FROM invoices
     GROUP BY COALESCE(category, 'Uncategorized')";

/// Spend per category. Line-item categories are the primary source; invoice
/// categories are used only when no line item carries a category at all.
pub fn category_spend(connection: &Connection, db_path: &Path) -> ClientResult<Vec<CategorySpend>> {
    let mut groups = grouped_spend(connection, db_path, LINE_ITEM_CATEGORY_SQL)?;
    if groups.is_empty() {
        groups = grouped_spend(connection, db_path, INVOICE_CATEGORY_SQL)?;
    }

    let mut result = groups
        .into_iter()
        .filter(|group| group.spend > 0.0)
        .collect::<Vec<CategorySpend>>();
    result.sort_by(|left, right| {
        right
            .spend
            .total_cmp(&left.spend)
            .then_with(|| left.category.cmp(&right.category))
    });
    Ok(result)
}

fn grouped_spend(connection: &Connection, db_path: &Path, sql: &str) -> ClientResult<Vec<CategorySpend>> {
    let mut statement = connection
        .prepare(sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows = statement
        .query_map([], |row| {
            Ok(CategorySpend {
                category: row.get(0)?,
                spend: row.get(1)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    collect_rows(rows, db_path)
}
