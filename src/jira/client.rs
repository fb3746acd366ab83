use chrono::{DateTime, Utc};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::jira::config::{JiraConfig, MAX_WORKLOGS_PER_ISSUE};
use crate::jira::error::{JiraError, Result};
use crate::jira::models::{IssueRef, SearchPage, WorklogPage};
use crate::jira::rate_limiter::RateLimiter;

/// Rate-limited Jira REST client. Clones share the HTTP pool and the limiter.
#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    limiter: RateLimiter,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        Self::new_with_limiter(config, RateLimiter::default())
    }

    pub fn new_with_limiter(config: JiraConfig, limiter: RateLimiter) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run a JQL search and collect the id and key of every matching issue,
    /// following `startAt` pagination until `total` is reached.
    pub async fn search_issue_refs(&self, jql: &str) -> Result<Vec<IssueRef>> {
        let mut issues = Vec::new();
        let page_size = self.config.page_size.to_string();

        loop {
            let start_at = issues.len().to_string();
            let query = [
                ("jql", jql),
                ("fields", "key"),
                ("startAt", start_at.as_str()),
                ("maxResults", page_size.as_str()),
            ];
            let page: SearchPage = self.get_with_query("search", &query).await?;
            let received = page.issues.len();
            debug!(
                "Search page at {} returned {} of {} issues",
                page.start_at, received, page.total
            );
            issues.extend(page.issues);

            if received == 0 || issues.len() as u64 >= page.total {
                break;
            }
        }

        Ok(issues)
    }

    /// Fetch every worklog of one issue started inside `[since, until)`,
    /// following `startAt` pagination until `total` is reached.
    pub async fn get_worklogs(
        &self,
        issue_key: &str,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<WorklogPage> {
        let path = format!("issue/{}/worklog", issue_key);
        let started_after = since.timestamp_millis().to_string();
        let started_before = until.map(|u| u.timestamp_millis().to_string());
        let max_results = MAX_WORKLOGS_PER_ISSUE.to_string();
        let mut collected = WorklogPage::default();

        loop {
            let start_at = collected.worklogs.len().to_string();
            let mut query = vec![
                ("startedAfter", started_after.as_str()),
                ("startAt", start_at.as_str()),
                ("maxResults", max_results.as_str()),
            ];
            if let Some(ref before) = started_before {
                query.push(("startedBefore", before.as_str()));
            }

            let page: WorklogPage = self.get_with_query(&path, &query).await?;
            let received = page.worklogs.len();
            debug!(
                "Worklog page of {} at {} returned {} of {}",
                issue_key, start_at, received, page.total
            );
            collected.total = page.total;
            collected.worklogs.extend(page.worklogs);

            if received == 0 || collected.worklogs.len() as u64 >= page.total {
                break;
            }
        }

        Ok(collected)
    }

    async fn get_with_query<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        let response = self
            .http
            .get(self.url_for(path))
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .query(query)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(JiraError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::http(status, extract_error_message(&body)))
        }
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|err| JiraError::Other(err.to_string()))?,
    );

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

/// Jira reports failures as `{"errorMessages": [...], "errors": {...}}`.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let messages: Vec<String> = value
                .get("errorMessages")?
                .as_array()?
                .iter()
                .filter_map(|m| m.as_str().map(str::to_string))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        })
        .unwrap_or_else(|| body.to_string())
}
