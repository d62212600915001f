use crate::extract::envelope::{
    CustomerBlock, DateValue, Field, InvoiceBlock, PaymentBlock, Scalar, SourceLineItem, SourceRecord,
    SummaryBlock, VendorBlock, block,
};
use crate::extract::fields::{date, date_value, format_timestamp, integer, number, number_long, text};
use crate::extract::line_items::source_line_items;
use crate::resolve::PartyRecord;

pub(crate) const DEFAULT_DOCUMENT_STATUS: &str = "processed";
pub(crate) const DEFAULT_CURRENCY: &str = "EUR";
pub(crate) const DEFAULT_PAYMENT_STATUS: &str = "pending";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedRecord {
    pub(crate) document: DocumentRow,
    pub(crate) vendor: Option<PartyRecord>,
    pub(crate) customer: Option<PartyRecord>,
    pub(crate) invoice: InvoiceRow,
    pub(crate) payment: Option<PaymentRow>,
    pub(crate) line_items: Vec<LineItemRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DocumentRow {
    pub(crate) external_id: String,
    pub(crate) name: String,
    pub(crate) file_path: Option<String>,
    pub(crate) file_size: Option<i64>,
    pub(crate) file_type: Option<String>,
    pub(crate) status: String,
    pub(crate) organization_id: Option<String>,
    pub(crate) department_id: Option<String>,
    pub(crate) uploaded_by_id: Option<String>,
    pub(crate) is_validated: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InvoiceRow {
    pub(crate) invoice_id: Option<String>,
    pub(crate) invoice_number: Option<String>,
    pub(crate) invoice_date: Option<String>,
    pub(crate) delivery_date: Option<String>,
    pub(crate) total_amount: Option<f64>,
    pub(crate) subtotal: Option<f64>,
    pub(crate) tax_amount: Option<f64>,
    pub(crate) currency: String,
    pub(crate) category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PaymentRow {
    pub(crate) due_date: Option<String>,
    pub(crate) payment_terms: Option<String>,
    pub(crate) payment_method: Option<String>,
    pub(crate) paid_date: Option<String>,
    pub(crate) paid_amount: Option<f64>,
    pub(crate) status: String,
    pub(crate) net_days: Option<i64>,
    pub(crate) discount_percentage: Option<f64>,
    pub(crate) discount_days: Option<i64>,
    pub(crate) discount_due_date: Option<String>,
    pub(crate) discounted_total: Option<f64>,
    pub(crate) bank_account_number: Option<String>,
    pub(crate) bic: Option<String>,
    pub(crate) account_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LineItemRow {
    pub(crate) description: Option<String>,
    pub(crate) quantity: Option<f64>,
    pub(crate) unit_price: Option<f64>,
    pub(crate) total_price: Option<f64>,
    pub(crate) category: Option<String>,
    pub(crate) tax_rate: Option<f64>,
}

/// Maps one decoded source record onto row structs. Returns `Ok(None)` when the
/// record carries no extraction payload; an unreadable line-item entry is the
/// only shape error that survives decoding.
pub(crate) fn normalize_record(
    record: &SourceRecord,
    now: &str,
) -> Result<Option<NormalizedRecord>, serde_json::Error> {
    let Some(llm) = record
        .extracted_data
        .as_ref()
        .and_then(|data| data.llm_data.as_ref())
    else {
        return Ok(None);
    };

    let line_items = source_line_items(llm.line_items.as_ref())?
        .iter()
        .map(line_item_row)
        .collect();

    Ok(Some(NormalizedRecord {
        document: document_row(record, now),
        vendor: block(&llm.vendor).and_then(vendor_party),
        customer: block(&llm.customer).and_then(customer_party),
        invoice: invoice_row(block(&llm.invoice), block(&llm.summary)),
        payment: block(&llm.payment).map(payment_row),
        line_items,
    }))
}

fn document_row(record: &SourceRecord, now: &str) -> DocumentRow {
    let timestamp_or_now = |value: Option<&DateValue>| {
        date_value(value)
            .map(|parsed| format_timestamp(&parsed))
            .unwrap_or_else(|| now.to_string())
    };

    DocumentRow {
        external_id: record.external_id.clone(),
        name: non_blank(record.name.as_deref()).unwrap_or_else(|| record.external_id.clone()),
        file_path: non_blank(record.file_path.as_deref()),
        file_size: number_long(record.file_size.as_ref()),
        file_type: non_blank(record.file_type.as_deref()),
        status: non_blank(record.status.as_deref())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_STATUS.to_string()),
        organization_id: non_blank(record.organization_id.as_deref()),
        department_id: non_blank(record.department_id.as_deref()),
        uploaded_by_id: non_blank(record.uploaded_by_id.as_deref()),
        is_validated: record.is_validated_by_human.unwrap_or(false),
        created_at: timestamp_or_now(record.created_at.as_ref()),
        updated_at: timestamp_or_now(record.updated_at.as_ref()),
    }
}

fn vendor_party(vendor: &VendorBlock) -> Option<PartyRecord> {
    Some(PartyRecord {
        name: text(&vendor.vendor_name)?,
        party_number: text(&vendor.vendor_party_number),
        address: text(&vendor.vendor_address),
        tax_id: text(&vendor.vendor_tax_id),
        email: text(&vendor.vendor_email),
        phone: text(&vendor.vendor_phone),
    })
}

fn customer_party(customer: &CustomerBlock) -> Option<PartyRecord> {
    Some(PartyRecord {
        name: text(&customer.customer_name)?,
        party_number: text(&customer.customer_party_number),
        address: text(&customer.customer_address),
        tax_id: text(&customer.customer_tax_id),
        email: text(&customer.customer_email),
        phone: None,
    })
}

fn invoice_row(invoice: Option<&InvoiceBlock>, summary: Option<&SummaryBlock>) -> InvoiceRow {
    let invoice = invoice.cloned().unwrap_or_default();
    let summary = summary.cloned().unwrap_or_default();

    let invoice_id = text(&invoice.invoice_id);
    InvoiceRow {
        invoice_number: text(&invoice.invoice_number).or_else(|| invoice_id.clone()),
        invoice_id,
        invoice_date: timestamp(&invoice.invoice_date),
        delivery_date: timestamp(&invoice.delivery_date),
        total_amount: number(&summary.invoice_total),
        subtotal: number(&summary.sub_total),
        tax_amount: number(&summary.total_tax),
        currency: text(&summary.currency_symbol).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        category: text(&invoice.category).or_else(|| text(&summary.category)),
    }
}

fn payment_row(payment: &PaymentBlock) -> PaymentRow {
    PaymentRow {
        due_date: timestamp(&payment.due_date),
        payment_terms: text(&payment.payment_terms),
        payment_method: text(&payment.payment_method),
        paid_date: timestamp(&payment.paid_date),
        paid_amount: number(&payment.paid_amount),
        status: text(&payment.status).unwrap_or_else(|| DEFAULT_PAYMENT_STATUS.to_string()),
        net_days: integer(&payment.net_days),
        discount_percentage: number(&payment.discount_percentage),
        discount_days: integer(&payment.discount_days),
        discount_due_date: timestamp(&payment.discount_due_date),
        discounted_total: number(&payment.discounted_total),
        bank_account_number: text(&payment.bank_account_number),
        bic: text(&payment.bic),
        account_name: text(&payment.account_name),
    }
}

fn line_item_row(item: &SourceLineItem) -> LineItemRow {
    LineItemRow {
        description: text(&item.description),
        quantity: number(&item.quantity),
        unit_price: number(&item.unit_price),
        total_price: number(&item.total_price),
        category: text(&item.category),
        tax_rate: number(&item.tax_rate),
    }
}

fn timestamp(field: &Field<Scalar>) -> Option<String> {
    date(field).map(|parsed| format_timestamp(&parsed))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
