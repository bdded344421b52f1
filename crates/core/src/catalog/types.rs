use serde::{Deserialize, Serialize};

/// A bookable service offered by a professional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Price in minor currency units.
    pub price_cents: u32,
    pub duration_minutes: u32,
}

/// A beauty or wellness professional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    /// Average review score, 0.0 to 5.0.
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Services offered by the given provider, in catalog order.
pub fn services_by_provider<'a>(services: &'a [Service], provider_id: &str) -> Vec<&'a Service> {
    services
        .iter()
        .filter(|s| s.provider_id == provider_id)
        .collect()
}
