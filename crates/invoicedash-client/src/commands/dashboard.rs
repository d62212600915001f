//! Dashboard endpoints. Any failure, including opening the store, surfaces as
//! `aggregation_failed` with a fixed per-endpoint message; the cause is only
//! logged.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::error;

use crate::aggregate::cash_outflow::{DueDateRange, cash_outflow};
use crate::aggregate::categories::category_spend;
use crate::aggregate::invoices::{InvoiceQuery, list_invoices};
use crate::aggregate::stats::current_year_stats;
use crate::aggregate::trends::invoice_trends;
use crate::aggregate::vendors::top_vendors;
use crate::commands::open_store;
use crate::contracts::envelope::{SuccessEnvelope, endpoint};
use crate::extract::fields::{format_timestamp, parse_date};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Stats,
    InvoiceTrends,
    TopVendors,
    CategorySpend,
    CashOutflow,
    Invoices,
}

impl Endpoint {
    pub fn command(self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::InvoiceTrends => "trends",
            Self::TopVendors => "vendors top",
            Self::CategorySpend => "categories",
            Self::CashOutflow => "cash-outflow",
            Self::Invoices => "invoices",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Stats => "Failed to fetch statistics",
            Self::InvoiceTrends => "Failed to fetch invoice trends",
            Self::TopVendors => "Failed to fetch top vendors",
            Self::CategorySpend => "Failed to fetch category spend",
            Self::CashOutflow => "Failed to fetch cash outflow forecast",
            Self::Invoices => "Failed to fetch invoices",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CashOutflowFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub vendor_id: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub fn stats(home_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    run_endpoint(Endpoint::Stats, home_override, |connection, db_path| {
        endpoint(Endpoint::Stats.command(), current_year_stats(connection, db_path)?)
    })
}

pub fn trends(home_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    run_endpoint(Endpoint::InvoiceTrends, home_override, |connection, db_path| {
        endpoint(Endpoint::InvoiceTrends.command(), invoice_trends(connection, db_path)?)
    })
}

pub fn vendors_top(home_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    run_endpoint(Endpoint::TopVendors, home_override, |connection, db_path| {
        endpoint(Endpoint::TopVendors.command(), top_vendors(connection, db_path)?)
    })
}

pub fn categories(home_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    run_endpoint(Endpoint::CategorySpend, home_override, |connection, db_path| {
        endpoint(Endpoint::CategorySpend.command(), category_spend(connection, db_path)?)
    })
}

pub fn cash_outflow_forecast(
    filter: &CashOutflowFilter,
    home_override: Option<&Path>,
) -> ClientResult<SuccessEnvelope> {
    let range = DueDateRange {
        start: parse_day(filter.start_date.as_deref(), "--from", Endpoint::CashOutflow)?,
        end: parse_day(filter.end_date.as_deref(), "--to", Endpoint::CashOutflow)?,
    };
    run_endpoint(Endpoint::CashOutflow, home_override, |connection, db_path| {
        endpoint(Endpoint::CashOutflow.command(), cash_outflow(connection, db_path, range)?)
    })
}

pub fn invoices(filter: &InvoiceFilter, home_override: Option<&Path>) -> ClientResult<SuccessEnvelope> {
    let query = invoice_query(filter)?;
    run_endpoint(Endpoint::Invoices, home_override, |connection, db_path| {
        endpoint(Endpoint::Invoices.command(), list_invoices(connection, db_path, &query)?)
    })
}

fn run_endpoint<F>(endpoint: Endpoint, home_override: Option<&Path>, query: F) -> ClientResult<SuccessEnvelope>
where
    F: FnOnce(&Connection, &Path) -> ClientResult<SuccessEnvelope>,
{
    let result = open_store(home_override).and_then(|store| query(&store.connection, &store.db_path));
    result.map_err(|cause| {
        error!(
            endpoint = endpoint.command(),
            code = %cause.code,
            error = %cause,
            "aggregation failed"
        );
        ClientError::aggregation_failed(endpoint.command(), endpoint.failure_message())
    })
}

fn invoice_query(filter: &InvoiceFilter) -> ClientResult<InvoiceQuery> {
    let defaults = InvoiceQuery::default();
    let page = filter.page.unwrap_or(defaults.page);
    let limit = filter.limit.unwrap_or(defaults.limit);
    if page < 1 {
        return Err(ClientError::invalid_argument_for_command(
            "`--page` must be 1 or greater.",
            Some(Endpoint::Invoices.command()),
        ));
    }
    if limit < 1 {
        return Err(ClientError::invalid_argument_for_command(
            "`--limit` must be 1 or greater.",
            Some(Endpoint::Invoices.command()),
        ));
    }

    Ok(InvoiceQuery {
        page,
        limit,
        search: filter.search.clone(),
        vendor_id: filter.vendor_id.clone(),
        status: filter.status.clone(),
        start_date: parse_bound(filter.start_date.as_deref(), "--from")?,
        end_date: parse_bound(filter.end_date.as_deref(), "--to")?,
    })
}

fn parse_bound(value: Option<&str>, flag: &str) -> ClientResult<Option<String>> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    parse_date(raw)
        .map(|parsed| Some(format_timestamp(&parsed)))
        .ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!("`{flag}` must be a date such as 2024-03-15, got `{raw}`."),
                Some(Endpoint::Invoices.command()),
            )
        })
}

fn parse_day(value: Option<&str>, flag: &str, endpoint: Endpoint) -> ClientResult<Option<NaiveDate>> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    parse_date(raw)
        .map(|parsed| Some(parsed.date_naive()))
        .ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!("`{flag}` must be a date such as 2024-03-15, got `{raw}`."),
                Some(endpoint.command()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::{InvoiceFilter, invoice_query};

    #[test]
    fn invoice_query_applies_defaults() {
        let query = invoice_query(&InvoiceFilter::default());
        assert!(query.is_ok_and(|query| query.page == 1 && query.limit == 50));
    }

    #[test]
    fn invoice_query_rejects_bad_paging_and_dates() {
        let bad_page = InvoiceFilter {
            page: Some(0),
            ..InvoiceFilter::default()
        };
        assert!(invoice_query(&bad_page).is_err_and(|error| error.code == "invalid_argument"));

        let bad_date = InvoiceFilter {
            start_date: Some("someday".to_string()),
            ..InvoiceFilter::default()
        };
        assert!(invoice_query(&bad_date).is_err_and(|error| error.message.contains("--from")));
    }

    #[test]
    fn date_bounds_are_canonicalized() {
        let filter = InvoiceFilter {
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-03-31T23:59:59Z".to_string()),
            ..InvoiceFilter::default()
        };
        let query = invoice_query(&filter);
        assert!(query.is_ok());
        if let Ok(query) = query {
            assert_eq!(query.start_date.as_deref(), Some("2024-03-01T00:00:00Z"));
            assert_eq!(query.end_date.as_deref(), Some("2024-03-31T23:59:59Z"));
        }
    }
}
