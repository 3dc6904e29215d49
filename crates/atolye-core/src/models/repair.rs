use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::{Machine, Operation, SparePart};

/// Lifecycle states a repair ticket moves through.
///
/// The backend stores the Turkish display strings; the record keeps whatever
/// string the backend sent, and unknown values simply parse to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStatus {
    Draft,
    Processed,
    Sent,
}

impl RepairStatus {
    /// The wire value the backend stores
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStatus::Draft => "Taslak",
            RepairStatus::Processed => "İşlendi",
            RepairStatus::Sent => "Gönderildi",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Taslak" => Some(RepairStatus::Draft),
            "İşlendi" => Some(RepairStatus::Processed),
            "Gönderildi" => Some(RepairStatus::Sent),
            _ => None,
        }
    }
}

impl std::fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repair {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "repairDate", default)]
    pub repair_date: String,
    #[serde(rename = "issueDescription", default)]
    pub issue_description: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "priceOffer", default)]
    pub price_offer: f64,
    #[serde(rename = "machineId", default)]
    pub machine_id: Option<i64>,
    #[serde(rename = "qrCode", default)]
    pub qr_code: Option<String>,
    /// Present when the backend expands the machine (and its customer)
    #[serde(default)]
    pub machine: Option<Machine>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(rename = "spareParts", default)]
    pub spare_parts: Vec<SparePart>,
}

impl Repair {
    /// Interpret the stored status string
    pub fn status(&self) -> Option<RepairStatus> {
        RepairStatus::parse(&self.status)
    }

    /// Sum of attached operations and spare parts - the amount the quote
    /// panel offers to save as `priceOffer`. Currencies are not reconciled.
    pub fn quote_total(&self) -> f64 {
        let operations: f64 = self.operations.iter().map(|op| op.price).sum();
        let parts: f64 = self.spare_parts.iter().map(|part| part.price).sum();
        operations + parts
    }

    pub fn formatted_date(&self) -> String {
        // Try to parse and format the date nicely
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.repair_date) {
            dt.format("%b %d, %Y").to_string()
        } else {
            // Fall back to the raw date string, truncated to the day
            self.repair_date.chars().take(10).collect()
        }
    }
}

/// Body for `POST /api/Repairs`
#[derive(Debug, Clone, Serialize)]
pub struct NewRepair {
    #[serde(rename = "repairDate")]
    pub repair_date: String,
    #[serde(rename = "issueDescription")]
    pub issue_description: String,
    pub status: String,
    #[serde(rename = "priceOffer")]
    pub price_offer: f64,
    #[serde(rename = "machineId")]
    pub machine_id: i64,
}

impl NewRepair {
    /// A fresh draft ticket for a machine, with a zero offer - the shape the
    /// intake flow submits before operations and parts are attached.
    pub fn draft(
        repair_date: impl Into<String>,
        issue_description: impl Into<String>,
        machine_id: i64,
    ) -> Self {
        Self {
            repair_date: repair_date.into(),
            issue_description: issue_description.into(),
            status: RepairStatus::Draft.as_str().to_string(),
            price_offer: 0.0,
            machine_id,
        }
    }
}

/// Partial body for `PUT /api/Repairs/{id}`; unset fields are omitted from
/// the JSON so the backend leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "issueDescription", skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
    #[serde(rename = "priceOffer", skip_serializing_if = "Option::is_none")]
    pub price_offer: Option<f64>,
    #[serde(rename = "qrCode", skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

impl RepairUpdate {
    /// Move a ticket to a new lifecycle state
    pub fn status(status: RepairStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
            ..Default::default()
        }
    }

    /// Record the quoted total on the ticket
    pub fn price_offer(amount: f64) -> Self {
        Self {
            price_offer: Some(amount),
            ..Default::default()
        }
    }
}

/// One entry in a repair's change history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairLog {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "oldDescription", default)]
    pub old_description: Option<String>,
    #[serde(rename = "newDescription", default)]
    pub new_description: Option<String>,
    #[serde(rename = "changedAt", default)]
    pub changed_at: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl RepairLog {
    pub fn formatted_changed_at(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.changed_at) {
            dt.format("%b %d, %Y %H:%M").to_string()
        } else {
            self.changed_at.chars().take(16).collect()
        }
    }
}

/// Body for `POST /api/Repairs/{id}/logs`
#[derive(Debug, Clone, Serialize)]
pub struct NewRepairLog {
    #[serde(rename = "oldDescription")]
    pub old_description: Option<String>,
    #[serde(rename = "newDescription")]
    pub new_description: Option<String>,
    pub note: Option<String>,
}
