//! REST store backed by the hosted data service.
//!
//! The service exposes PostgREST-style collections: `attempts` for persisted
//! attempt records and `answer_keys` for per-test keys. Authentication is an
//! API key sent both as `apikey` and as a bearer token.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use bandmark_core::error::StoreError;
use bandmark_core::model::{AnswerKey, AttemptRecord};
use bandmark_core::traits::AttemptStore;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the hosted attempts store.
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", &self.api_key)
            .header("authorization", format!("Bearer {}", self.api_key))
    }

    fn map_send_error(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(DEFAULT_TIMEOUT_SECS)
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(StoreError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::AuthenticationFailed(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(StoreError::ApiError { status, message });
        }
        Ok(response)
    }
}

#[derive(Deserialize)]
struct ServiceError {
    message: String,
}

/// Row shape of the `answer_keys` collection.
#[derive(Deserialize)]
struct AnswerKeyRow {
    test_id: String,
    answers: BTreeMap<String, String>,
}

#[async_trait]
impl AttemptStore for RestStore {
    fn name(&self) -> &str {
        "rest"
    }

    #[instrument(skip(self, record), fields(test = %record.test_id))]
    async fn insert_attempt(&self, record: &AttemptRecord) -> anyhow::Result<()> {
        let response = self
            .request(reqwest::Method::POST, "/rest/v1/attempts")
            .header("prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_answer_key(&self, test_id: &str) -> anyhow::Result<AnswerKey> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/rest/v1/answer_keys?test_id=eq.{test_id}&select=test_id,answers"),
            )
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let response = Self::check_status(response).await?;
        let rows: Vec<AnswerKeyRow> = response.json().await.map_err(|e| StoreError::ApiError {
            status: 0,
            message: format!("failed to parse answer key response: {e}"),
        })?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::TestNotFound(test_id.to_string()))?;

        Ok(AnswerKey {
            test_id: row.test_id,
            answers: row.answers,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_attempts(
        &self,
        learner_id: Option<&str>,
    ) -> anyhow::Result<Vec<AttemptRecord>> {
        let mut path = "/rest/v1/attempts?select=*&order=submitted_at.asc".to_string();
        if let Some(learner) = learner_id {
            path.push_str(&format!("&learner_id=eq.{learner}"));
        }

        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let response = Self::check_status(response).await?;
        let attempts: Vec<AttemptRecord> =
            response.json().await.map_err(|e| StoreError::ApiError {
                status: 0,
                message: format!("failed to parse attempts response: {e}"),
            })?;

        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandmark_core::band::band_for_raw;
    use chrono::Utc;
    use uuid::Uuid;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_record() -> AttemptRecord {
        AttemptRecord {
            id: Uuid::new_v4(),
            learner_id: "learner-1".into(),
            test_id: "academic-reading-1".into(),
            raw_score: 30,
            band: band_for_raw(30),
            answers: BTreeMap::from([("q1".to_string(), "true".to_string())]),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/attempts"))
            .and(header("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "test-key");
        store.insert_attempt(&make_record()).await.unwrap();
    }

    #[tokio::test]
    async fn insert_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/attempts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "bad-key");
        let err = store.insert_attempt(&make_record()).await.unwrap_err();
        assert!(err.to_string().contains("authentication"));
    }

    #[tokio::test]
    async fn insert_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/attempts"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "test-key");
        let err = store.insert_attempt(&make_record()).await.unwrap_err();
        let store_err = err.downcast_ref::<StoreError>().unwrap();
        assert_eq!(store_err.retry_after_ms(), Some(5000));
    }

    #[tokio::test]
    async fn fetch_answer_key_success() {
        let server = MockServer::start().await;

        let body = serde_json::json!([{
            "test_id": "academic-reading-1",
            "answers": {"q1": "true", "q2": "not given"}
        }]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/answer_keys"))
            .and(query_param("test_id", "eq.academic-reading-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "test-key");
        let key = store.fetch_answer_key("academic-reading-1").await.unwrap();
        assert_eq!(key.answers.len(), 2);
        assert_eq!(key.answers["q2"], "not given");
    }

    #[tokio::test]
    async fn fetch_answer_key_missing_test() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/answer_keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "test-key");
        let err = store.fetch_answer_key("nope").await.unwrap_err();
        let store_err = err.downcast_ref::<StoreError>().unwrap();
        assert!(store_err.is_permanent());
        assert!(err.to_string().contains("test not found"));
    }

    #[tokio::test]
    async fn fetch_attempts_filters_by_learner() {
        let server = MockServer::start().await;

        let record = make_record();
        let body = serde_json::json!([record]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/attempts"))
            .and(query_param("learner_id", "eq.learner-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "test-key");
        let attempts = store.fetch_attempts(Some("learner-1")).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].raw_score, 30);
    }
}
