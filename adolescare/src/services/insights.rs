use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::cache::JsonFileCache;
use crate::error::Result;
use crate::llm::prompts;
use crate::models::{InsightRecord, InsightResult};
use crate::rag::Answerer;

const ITEM_SEPARATOR: &str = "\u{1f}";
const LIST_SEPARATOR: &str = "\u{1e}";

/// Cache key for a symptom and activity log.
///
/// Order-sensitive: the same items in a different order hash differently.
pub fn insight_key(symptoms: &[String], activities: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(symptoms.join(ITEM_SEPARATOR).as_bytes());
    hasher.update(LIST_SEPARATOR.as_bytes());
    hasher.update(activities.join(ITEM_SEPARATOR).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct InsightService {
    cache: Arc<JsonFileCache<InsightRecord>>,
    answerer: Arc<dyn Answerer>,
}

impl InsightService {
    pub fn new(cache: Arc<JsonFileCache<InsightRecord>>, answerer: Arc<dyn Answerer>) -> Self {
        Self { cache, answerer }
    }

    pub async fn stored_count(&self) -> usize {
        self.cache.len().await
    }

    pub async fn insights(
        &self,
        symptoms: Vec<String>,
        activities: Vec<String>,
    ) -> Result<InsightResult> {
        let key = insight_key(&symptoms, &activities);

        let (record, cached) = self
            .cache
            .get_or_try_insert_with(&key, || async {
                let prompt = prompts::insights_prompt(&symptoms, &activities);
                let answer = self.answerer.answer(&prompt).await?;

                Ok(InsightRecord {
                    insights: answer.answer,
                    symptoms: symptoms.clone(),
                    activities: activities.clone(),
                })
            })
            .await?;

        tracing::debug!(key = %key, cached, "Resolved insights");

        Ok(InsightResult::from_record(record, cached))
    }
}
