use serde::Deserialize;
use serde_json::Value;

/// `{ "value": T }` wrapper used by the extraction pipeline for every leaf.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    pub value: Option<T>,
}

/// A leaf that may be missing entirely, present without a value, or present.
pub type Field<T> = Option<Envelope<T>>;

/// Leaf value. Objects, arrays and nulls land in `Other` so an odd leaf reads
/// as absent instead of rejecting the whole record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberLong {
    Wrapped {
        #[serde(rename = "$numberLong")]
        number_long: String,
    },
    Integer(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Wrapped {
        #[serde(rename = "$date")]
        date: String,
    },
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    #[serde(rename = "_id")]
    pub external_id: String,
    pub name: Option<String>,
    pub file_path: Option<String>,
    pub file_size: Option<NumberLong>,
    pub file_type: Option<String>,
    pub status: Option<String>,
    pub organization_id: Option<String>,
    pub department_id: Option<String>,
    pub uploaded_by_id: Option<String>,
    pub is_validated_by_human: Option<bool>,
    pub created_at: Option<DateValue>,
    pub updated_at: Option<DateValue>,
    pub extracted_data: Option<ExtractedData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub llm_data: Option<LlmData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmData {
    pub invoice: Field<InvoiceBlock>,
    pub vendor: Field<VendorBlock>,
    pub customer: Field<CustomerBlock>,
    pub payment: Field<PaymentBlock>,
    pub summary: Field<SummaryBlock>,
    /// Kept untyped: see [`crate::extract::line_items::LineItemsShape`].
    pub line_items: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceBlock {
    pub invoice_id: Field<Scalar>,
    pub invoice_number: Field<Scalar>,
    pub invoice_date: Field<Scalar>,
    pub delivery_date: Field<Scalar>,
    pub category: Field<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorBlock {
    pub vendor_name: Field<Scalar>,
    pub vendor_party_number: Field<Scalar>,
    pub vendor_address: Field<Scalar>,
    pub vendor_tax_id: Field<Scalar>,
    pub vendor_email: Field<Scalar>,
    pub vendor_phone: Field<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBlock {
    pub customer_name: Field<Scalar>,
    pub customer_party_number: Field<Scalar>,
    pub customer_address: Field<Scalar>,
    pub customer_tax_id: Field<Scalar>,
    pub customer_email: Field<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBlock {
    pub due_date: Field<Scalar>,
    pub payment_terms: Field<Scalar>,
    pub payment_method: Field<Scalar>,
    pub paid_date: Field<Scalar>,
    pub paid_amount: Field<Scalar>,
    pub status: Field<Scalar>,
    pub net_days: Field<Scalar>,
    pub discount_percentage: Field<Scalar>,
    pub discount_days: Field<Scalar>,
    pub discount_due_date: Field<Scalar>,
    pub discounted_total: Field<Scalar>,
    pub bank_account_number: Field<Scalar>,
    #[serde(rename = "BIC")]
    pub bic: Field<Scalar>,
    pub account_name: Field<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBlock {
    pub sub_total: Field<Scalar>,
    pub total_tax: Field<Scalar>,
    pub invoice_total: Field<Scalar>,
    pub currency_symbol: Field<Scalar>,
    pub category: Field<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLineItem {
    pub description: Field<Scalar>,
    pub quantity: Field<Scalar>,
    pub unit_price: Field<Scalar>,
    pub total_price: Field<Scalar>,
    pub category: Field<Scalar>,
    pub tax_rate: Field<Scalar>,
}

/// Returns the block wrapped by an envelope, if both are present.
pub fn block<T>(field: &Field<T>) -> Option<&T> {
    field.as_ref().and_then(|envelope| envelope.value.as_ref())
}
