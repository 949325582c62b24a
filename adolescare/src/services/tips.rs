use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::cache::JsonFileCache;
use crate::error::{AppError, Result};
use crate::llm::prompts::DAILY_TIP_QUERY;
use crate::models::{DailyTip, TipRecord};
use crate::rag::{Answerer, TitleGenerator};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One generated tip per calendar day, cached under its ISO date.
#[derive(Clone)]
pub struct TipService {
    cache: Arc<JsonFileCache<TipRecord>>,
    answerer: Arc<dyn Answerer>,
    titles: TitleGenerator,
}

impl TipService {
    pub fn new(
        cache: Arc<JsonFileCache<TipRecord>>,
        answerer: Arc<dyn Answerer>,
        titles: TitleGenerator,
    ) -> Self {
        Self {
            cache,
            answerer,
            titles,
        }
    }

    /// Tip for the local calendar date.
    pub async fn todays_tip(&self) -> Result<DailyTip> {
        let today = Local::now().format(DATE_FORMAT).to_string();
        self.tip_for_date(&today).await
    }

    /// Cached tip for `date`, generating and storing one on first request.
    pub async fn tip_for_date(&self, date: &str) -> Result<DailyTip> {
        let (record, cached) = self
            .cache
            .get_or_try_insert_with(date, || self.generate(date))
            .await?;

        if !cached {
            tracing::info!(date, title = %record.title, "Generated daily tip");
        }

        Ok(DailyTip::from_record(date, record))
    }

    /// Previously generated tip, without generating one.
    pub async fn cached_tip(&self, date: &str) -> Result<Option<DailyTip>> {
        validate_date(date)?;
        Ok(self
            .cache
            .get(date)
            .await
            .map(|record| DailyTip::from_record(date, record)))
    }

    /// Number of dates with a stored tip.
    pub async fn stored_count(&self) -> usize {
        self.cache.len().await
    }

    async fn generate(&self, date: &str) -> Result<TipRecord> {
        tracing::debug!(date, "No cached tip, asking the model");

        let answer = self.answerer.answer(DAILY_TIP_QUERY).await?;
        let tip = answer.answer;
        let title = self.titles.generate(&tip).await;

        Ok(TipRecord { title, tip })
    }
}

fn validate_date(date: &str) -> Result<()> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("Invalid date '{date}', expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use crate::rag::DEFAULT_TITLE;
    use crate::services::test_support::CountingAnswerer;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::TempDir;

    fn service(dir: &TempDir, answerer: Arc<CountingAnswerer>) -> TipService {
        TipService::new(
            Arc::new(JsonFileCache::new(dir.path().join("tips.json"))),
            answerer,
            TitleGenerator::new(LlmProvider::unavailable("no key"), 0.2),
        )
    }

    #[tokio::test]
    async fn test_same_date_is_generated_once() {
        let dir = TempDir::new().unwrap();
        let answerer = Arc::new(CountingAnswerer::default());
        let tips = service(&dir, answerer.clone());

        let first = tips.tip_for_date("2024-05-01").await.unwrap();
        let second = tips.tip_for_date("2024-05-01").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.tip, "answer #1");
        assert_eq!(first.title, DEFAULT_TITLE);
        assert_eq!(answerer.calls(), 1);
        assert_eq!(
            answerer.last_query.lock().unwrap().as_deref(),
            Some(DAILY_TIP_QUERY)
        );
    }

    #[tokio::test]
    async fn test_new_date_generates_new_tip() {
        let dir = TempDir::new().unwrap();
        let answerer = Arc::new(CountingAnswerer::default());
        let tips = service(&dir, answerer.clone());

        tips.tip_for_date("2024-05-01").await.unwrap();
        let next = tips.tip_for_date("2024-05-02").await.unwrap();

        assert_eq!(next.date, "2024-05-02");
        assert_eq!(next.tip, "answer #2");
    }

    #[tokio::test]
    async fn test_tips_survive_reload() {
        let dir = TempDir::new().unwrap();
        let answerer = Arc::new(CountingAnswerer::default());
        service(&dir, answerer.clone())
            .tip_for_date("2024-05-01")
            .await
            .unwrap();

        let cache = JsonFileCache::load(dir.path().join("tips.json"))
            .await
            .unwrap();
        let reloaded = TipService::new(
            Arc::new(cache),
            answerer.clone(),
            TitleGenerator::new(LlmProvider::unavailable("no key"), 0.2),
        );

        let tip = reloaded.tip_for_date("2024-05-01").await.unwrap();
        assert_eq!(tip.tip, "answer #1");
        assert_eq!(answerer.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_generation() {
        let dir = TempDir::new().unwrap();
        let answerer = Arc::new(CountingAnswerer {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let tips = service(&dir, answerer.clone());

        let (a, b, c) = tokio::join!(
            tips.tip_for_date("2024-05-01"),
            tips.tip_for_date("2024-05-01"),
            tips.tip_for_date("2024-05-01"),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(c.unwrap().tip, "answer #1");
        assert_eq!(answerer.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_generation_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let answerer = Arc::new(CountingAnswerer {
            fail: true,
            ..Default::default()
        });
        let tips = service(&dir, answerer.clone());

        assert!(tips.tip_for_date("2024-05-01").await.is_err());
        assert!(tips.cached_tip("2024-05-01").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cached_tip_lookup() {
        let dir = TempDir::new().unwrap();
        let tips = service(&dir, Arc::new(CountingAnswerer::default()));

        assert!(tips.cached_tip("2024-05-01").await.unwrap().is_none());
        tips.tip_for_date("2024-05-01").await.unwrap();
        assert_eq!(
            tips.cached_tip("2024-05-01").await.unwrap().unwrap().tip,
            "answer #1"
        );
        assert!(matches!(
            tips.cached_tip("yesterday").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_todays_tip_uses_local_date() {
        let dir = TempDir::new().unwrap();
        let tips = service(&dir, Arc::new(CountingAnswerer::default()));

        let tip = tips.todays_tip().await.unwrap();
        assert!(NaiveDate::parse_from_str(&tip.date, DATE_FORMAT).is_ok());
    }
}
