mod insights;
mod tips;

pub use insights::{insight_key, InsightService};
pub use tips::TipService;
