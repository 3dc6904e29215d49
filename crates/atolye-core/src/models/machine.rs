use serde::{Deserialize, Serialize};

use super::Customer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "serialNumber")]
    pub serial_number: String,
    pub model: String,
    #[serde(rename = "customerId", default)]
    pub customer_id: Option<i64>,
    #[serde(rename = "isDelivered", default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "invoiceNumber", default)]
    pub invoice_number: Option<String>,
    /// data:image/png;base64 URI attached by the backend, if generated
    #[serde(rename = "qrCode", default)]
    pub qr_code: Option<String>,
    /// Present when the backend expands the owning customer
    #[serde(default)]
    pub customer: Option<Customer>,
}

impl Machine {
    /// "model - serial" label the way machine pickers show entries
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.model, self.serial_number)
    }
}

/// Body for `POST /api/machines`
#[derive(Debug, Clone, Serialize)]
pub struct NewMachine {
    #[serde(rename = "serialNumber")]
    pub serial_number: String,
    pub model: String,
    #[serde(rename = "customerId")]
    pub customer_id: i64,
}
