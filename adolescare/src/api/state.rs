use std::sync::Arc;

use crate::cache::JsonFileCache;
use crate::config::Config;
use crate::index::VectorIndex;
use crate::llm::LlmProvider;
use crate::models::{InsightRecord, TipRecord};
use crate::rag::{Answerer, TitleGenerator};
use crate::services::{InsightService, TipService};

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<VectorIndex>,
    pub llm: LlmProvider,
    /// Retrieval chain shared by chat, tips and insights.
    pub qa: Arc<dyn Answerer>,
    pub tips: TipService,
    pub insights: InsightService,
}

impl AppState {
    pub fn new(
        config: &Config,
        index: Arc<VectorIndex>,
        llm: LlmProvider,
        qa: Arc<dyn Answerer>,
        tip_cache: JsonFileCache<TipRecord>,
        insight_cache: JsonFileCache<InsightRecord>,
    ) -> Self {
        let titles = TitleGenerator::new(llm.clone(), config.llm.title_temperature);
        let tips = TipService::new(Arc::new(tip_cache), qa.clone(), titles);
        let insights = InsightService::new(Arc::new(insight_cache), qa.clone());

        Self {
            index,
            llm,
            qa,
            tips,
            insights,
        }
    }
}
