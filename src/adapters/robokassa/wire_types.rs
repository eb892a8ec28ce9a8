//! JSON bodies of the invoice API.

use serde::{Deserialize, Serialize};

/// `POST {api_base_url}/CreateInvoice` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateInvoiceBody<'a> {
    pub merchant_login: &'a str,
    pub invoice_type: &'static str,
    pub inv_id: i64,
    /// Rendered with exactly two decimals; the signature covers this text.
    pub out_sum: String,
    pub description: &'a str,
    pub signature_value: String,
    pub is_test: bool,
}

/// Response of `CreateInvoice`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponse {
    pub is_success: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}
