//! Entity resolution for vendors and customers.
//!
//! Identity is the composite natural key `(name, party_number)`, with an absent
//! party number stored as the empty string. Both kinds resolve through the same
//! atomic upsert against a `UNIQUE (name, party_number)` constraint, so repeated
//! or concurrent resolution of one key converges on a single row. Existing rows
//! are never updated: the first record to mint an identity owns its details.

use std::path::Path;

use rusqlite::{Connection, params};
use ulid::Ulid;

use crate::ClientResult;
use crate::state::map_sqlite_write_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vendor,
    Customer,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Customer => "customer",
        }
    }

    const fn id_prefix(self) -> &'static str {
        match self {
            Self::Vendor => "ven",
            Self::Customer => "cus",
        }
    }

    const fn insert_sql(self) -> &'static str {
        match self {
            Self::Vendor => {
                "INSERT INTO vendors (id, name, party_number, address, tax_id, email, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (name, party_number) DO NOTHING"
            }
            Self::Customer => {
                "INSERT INTO customers (id, name, party_number, address, tax_id, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?8)
                 ON CONFLICT (name, party_number) DO NOTHING"
            }
        }
    }

    const fn lookup_sql(self) -> &'static str {
        match self {
            Self::Vendor => "SELECT id FROM vendors WHERE name = ?1 AND party_number = ?2",
            Self::Customer => "SELECT id FROM customers WHERE name = ?1 AND party_number = ?2",
        }
    }
}

/// Details of a vendor or customer as extracted from one source record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyRecord {
    pub name: String,
    pub party_number: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PartyRecord {
    pub fn natural_key(&self) -> (&str, &str) {
        (
            self.name.as_str(),
            self.party_number.as_deref().unwrap_or(""),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub id: String,
    pub created: bool,
}

pub fn resolve(
    connection: &Connection,
    db_path: &Path,
    kind: EntityKind,
    party: &PartyRecord,
    timestamp: &str,
) -> ClientResult<Resolution> {
    let (name, party_number) = party.natural_key();
    let candidate_id = format!("{}_{}", kind.id_prefix(), Ulid::new());

    // Customers have no phone column; the customer statement skips ?7.
    let inserted = connection
        .execute(
            kind.insert_sql(),
            params![
                &candidate_id,
                name,
                party_number,
                &party.address,
                &party.tax_id,
                &party.email,
                &party.phone,
                timestamp
            ],
        )
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;

    let id = connection
        .query_row(kind.lookup_sql(), params![name, party_number], |row| {
            row.get::<_, String>(0)
        })
        .map_err(|error| map_sqlite_write_error(db_path, &error))?;

    Ok(Resolution {
        id,
        created: inserted > 0,
    })
}
