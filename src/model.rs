use serde::Serialize;
use serde_json::{Map, Value};

/// Applied when neither the CLI nor a template supplies a description.
pub const DEFAULT_SERVICE_DESCRIPTION: &str = "Contractor services - Software Engineer";

/// Root object persisted in the store file. Absence of the file is
/// equivalent to the default value.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StoreDocument {
    pub last_invoice_number: u64,
    pub templates: Map<String, Value>,
}

/// A named, reusable subset of invoice fields for a recurring billing
/// relationship. Empty string means "not set". Invoice number, issue date,
/// amount and service period are per-invoice and never stored here.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TemplateRecord {
    pub client_name: String,
    pub client_address: String,
    pub client_ein: String,
    pub contractor_name: String,
    pub contractor_cuil: String,
    pub contractor_tax_status: String,
    pub service_description: String,
    pub account_holder: String,
    pub dolartag: String,
    pub additional_payment_info: String,
}

impl TemplateRecord {
    /// Decodes a stored template value field by field. Missing or
    /// wrongly-typed fields become empty strings so older or hand-edited
    /// store files keep loading.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| -> String {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        TemplateRecord {
            client_name: field("client_name"),
            client_address: field("client_address"),
            client_ein: field("client_ein"),
            contractor_name: field("contractor_name"),
            contractor_cuil: field("contractor_cuil"),
            contractor_tax_status: field("contractor_tax_status"),
            service_description: field("service_description"),
            account_holder: field("account_holder"),
            dolartag: field("dolartag"),
            additional_payment_info: field("additional_payment_info"),
        }
    }
}

/// Fully resolved data for one invoice. Built once per generation by
/// merging explicit inputs over template defaults; not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub issue_date: String,
    pub client_name: String,
    pub client_address: String,
    pub client_ein: String,
    pub contractor_name: String,
    pub contractor_cuil: String,
    pub contractor_tax_status: String,
    pub service_description: String,
    pub service_period: String,
    pub amount: f64,
    pub account_holder: String,
    pub dolartag: String,
    pub additional_payment_info: String,
}

impl InvoiceRecord {
    /// Projects the template-eligible subset of this invoice. Invoice
    /// number, issue date, amount and service period stay per-invoice.
    pub fn as_template(&self) -> TemplateRecord {
        TemplateRecord {
            client_name: self.client_name.clone(),
            client_address: self.client_address.clone(),
            client_ein: self.client_ein.clone(),
            contractor_name: self.contractor_name.clone(),
            contractor_cuil: self.contractor_cuil.clone(),
            contractor_tax_status: self.contractor_tax_status.clone(),
            service_description: self.service_description.clone(),
            account_holder: self.account_holder.clone(),
            dolartag: self.dolartag.clone(),
            additional_payment_info: self.additional_payment_info.clone(),
        }
    }
}
