use serde::{Deserialize, Serialize};

/// A labor item: either a global catalog entry or one attached to a repair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
}

impl Operation {
    /// Reuse a catalog entry as a line item on a repair
    pub fn to_new(&self) -> NewOperation {
        NewOperation {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            currency: self.currency.clone(),
        }
    }
}

/// Body item for `POST /api/operations` and `POST /api/Repairs/{id}/operations`
#[derive(Debug, Clone, Serialize)]
pub struct NewOperation {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparePart {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "partName")]
    pub part_name: String,
    pub price: f64,
    pub currency: String,
}

impl SparePart {
    /// Reuse a catalog entry as a line item on a repair
    pub fn to_new(&self) -> NewSparePart {
        NewSparePart {
            part_name: self.part_name.clone(),
            price: self.price,
            currency: self.currency.clone(),
        }
    }
}

/// Body item for `POST /api/spareParts` and `POST /api/Repairs/{id}/spareParts`
#[derive(Debug, Clone, Serialize)]
pub struct NewSparePart {
    #[serde(rename = "partName")]
    pub part_name: String,
    pub price: f64,
    pub currency: String,
}
