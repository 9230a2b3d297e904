use chrono::{Local, NaiveDate};

use crate::error::{InvoiceError, Result};
use crate::model::{DEFAULT_SERVICE_DESCRIPTION, InvoiceRecord, TemplateRecord};

/// Explicit, possibly partial invoice inputs prior to merging.
///
/// Every field is an `Option` so "not supplied" is distinct from any value;
/// defaults are applied at merge time, never at parse time.
#[derive(Debug, Default, Clone)]
pub struct InvoiceDraft {
    pub client_name: Option<String>,
    pub client_address: Option<String>,
    pub client_ein: Option<String>,
    pub contractor_name: Option<String>,
    pub contractor_cuil: Option<String>,
    pub contractor_tax_status: Option<String>,
    pub service_description: Option<String>,
    pub service_period: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub account_holder: Option<String>,
    pub dolartag: Option<String>,
    pub additional_payment_info: Option<String>,
}

impl InvoiceDraft {
    /// True when any of the argument-mode fields was supplied, even
    /// insufficiently. Distinguishes "fall back to interactive" from
    /// "half-finished command line".
    pub fn wants_argument_mode(&self) -> bool {
        self.amount.is_some()
            || non_empty(&self.account_holder)
            || non_empty(&self.dolartag)
    }

    /// Argument-mode sufficiency: amount supplied, and account holder and
    /// dolartag each resolvable explicitly or from the loaded template.
    pub fn can_run_unattended(&self, template: Option<&TemplateRecord>) -> bool {
        let from_template = |field: fn(&TemplateRecord) -> &str| {
            template.map(field).is_some_and(|v| !v.trim().is_empty())
        };
        self.amount.is_some()
            && (non_empty(&self.account_holder) || from_template(|t| &t.account_holder))
            && (non_empty(&self.dolartag) || from_template(|t| &t.dolartag))
    }

    /// Merges explicit values over template defaults into the final record.
    ///
    /// Precedence per field: explicit non-empty value, then template value,
    /// then the hardcoded default (service description) or empty. The issue
    /// date defaults to today; the service period never comes from a
    /// template.
    pub fn resolve(
        self,
        invoice_number: String,
        template: Option<&TemplateRecord>,
    ) -> Result<InvoiceRecord> {
        let amount = self
            .amount
            .ok_or(InvoiceError::MissingRequiredField("amount"))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(InvoiceError::InvalidAmount(amount.to_string()));
        }

        let t = template.cloned().unwrap_or_default();
        let issue_date = self
            .issue_date
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string();

        Ok(InvoiceRecord {
            invoice_number,
            issue_date,
            client_name: pick(self.client_name, &t.client_name),
            client_address: pick(self.client_address, &t.client_address),
            client_ein: pick(self.client_ein, &t.client_ein),
            contractor_name: pick(self.contractor_name, &t.contractor_name),
            contractor_cuil: pick(self.contractor_cuil, &t.contractor_cuil),
            contractor_tax_status: pick(self.contractor_tax_status, &t.contractor_tax_status),
            service_description: pick_or_default(
                self.service_description,
                &t.service_description,
                DEFAULT_SERVICE_DESCRIPTION,
            ),
            service_period: self
                .service_period
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_default(),
            amount,
            account_holder: pick(self.account_holder, &t.account_holder),
            dolartag: pick(self.dolartag, &t.dolartag),
            additional_payment_info: pick(self.additional_payment_info, &t.additional_payment_info),
        })
    }
}

/// Parses user-entered amounts, tolerating `$` prefixes and thousands
/// separators ("$5,000.00" -> 5000.0).
pub fn parse_amount(input: &str) -> Result<f64> {
    let cleaned = input.trim().replace(['$', ','], "");
    let value: f64 = cleaned
        .parse()
        .map_err(|_| InvoiceError::InvalidAmount(input.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(InvoiceError::InvalidAmount(input.to_string()));
    }
    Ok(value)
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn pick(explicit: Option<String>, template: &str) -> String {
    explicit
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| template.to_string())
}

fn pick_or_default(explicit: Option<String>, template: &str, default: &str) -> String {
    let value = pick(explicit, template);
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}
