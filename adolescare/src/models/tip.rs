use serde::{Deserialize, Serialize};

/// Cached tip of the day, keyed by ISO date in the tip cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipRecord {
    pub title: String,
    pub tip: String,
}

/// A tip together with the date it was generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DailyTip {
    /// `YYYY-MM-DD`
    pub date: String,
    pub title: String,
    pub tip: String,
}

impl DailyTip {
    pub fn from_record(date: impl Into<String>, record: TipRecord) -> Self {
        Self {
            date: date.into(),
            title: record.title,
            tip: record.tip,
        }
    }
}
