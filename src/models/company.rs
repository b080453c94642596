use serde::{Deserialize, Serialize};

/// Static descriptive fields for a listed company. Providers omit some of
/// these for funds and indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub sector: Option<String>,
    pub summary: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub employees: Option<u64>,
}
