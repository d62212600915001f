use serde::Serialize;

// Operator-facing contracts (ingest, store status, export) use snake_case keys.

#[derive(Debug, Clone, Serialize)]
pub struct IngestData {
    pub run_id: String,
    pub path: Option<String>,
    pub source_kind: String,
    pub line_item_policy: String,
    pub message: String,
    pub summary: IngestSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub records_read: i64,
    pub processed: i64,
    pub skipped: i64,
    pub errors: i64,
    pub aborted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestListData {
    pub rows: Vec<IngestRunItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunItem {
    pub run_id: String,
    pub status: String,
    pub source_kind: String,
    pub source_ref: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub records_read: i64,
    pub processed: i64,
    pub skipped: i64,
    pub errors: i64,
    pub aborted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatusData {
    pub home: String,
    pub db_path: String,
    pub schema_version: String,
    pub counts: TableCounts,
    pub sample_invoice: Option<SampleInvoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub documents: i64,
    pub vendors: i64,
    pub customers: i64,
    pub invoices: i64,
    pub payments: i64,
    pub line_items: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleInvoice {
    pub id: String,
    pub invoice_number: Option<String>,
    pub total_amount: Option<f64>,
    pub vendor_name: Option<String>,
    pub line_item_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportData {
    pub directory: String,
    pub files: Vec<ExportedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub table: String,
    pub path: String,
    pub rows: i64,
}

// Dashboard contracts keep the camelCase keys the dashboard consumes.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub total_spend: f64,
    pub total_invoices: i64,
    pub documents_uploaded: i64,
    pub average_invoice_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: String,
    pub count: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSpend {
    pub vendor_id: String,
    pub vendor_name: String,
    pub total_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category: String,
    pub spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutflowPoint {
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListData {
    pub data: Vec<InvoiceListRow>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListRow {
    pub id: String,
    pub invoice_number: String,
    pub invoice_date: Option<String>,
    pub vendor: String,
    pub vendor_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}
