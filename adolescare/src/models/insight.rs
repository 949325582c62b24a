use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub insights: String,
    pub symptoms: Vec<String>,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct InsightResult {
    pub symptoms: Vec<String>,
    pub activities: Vec<String>,
    pub insights: String,
    /// True when served from the insight cache without a model call.
    pub cached: bool,
}

impl InsightResult {
    pub fn from_record(record: InsightRecord, cached: bool) -> Self {
        Self {
            symptoms: record.symptoms,
            activities: record.activities,
            insights: record.insights,
            cached,
        }
    }
}
