use std::time::Duration;

pub const API_PATH: &str = "rest/api/3";
pub const DEFAULT_USER_AGENT: &str = "jira-worklog-report";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_WORKLOGS_PER_ISSUE: u32 = 5000;

/// Connection settings for a Jira Cloud site
#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub host: String,
    pub email: String,
    pub api_token: String,
    pub user_agent: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl JiraConfig {
    pub fn new(
        host: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            email: email.into(),
            api_token: api_token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 100);
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Base URL of the REST API; a bare host name is assumed to be https.
    pub fn api_root(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}/{}/", host, API_PATH)
        } else {
            format!("https://{}/{}/", host, API_PATH)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_root_from_bare_host() {
        let config = JiraConfig::new("acme.atlassian.net", "me@acme.test", "t");
        assert_eq!(config.api_root(), "https://acme.atlassian.net/rest/api/3/");
    }

    #[test]
    fn test_api_root_keeps_scheme() {
        let config = JiraConfig::new("http://127.0.0.1:1234/", "me@acme.test", "t");
        assert_eq!(config.api_root(), "http://127.0.0.1:1234/rest/api/3/");
    }

    #[test]
    fn test_page_size_is_clamped() {
        let config = JiraConfig::new("h", "e", "t").with_page_size(1000);
        assert_eq!(config.page_size, 100);
        let config = JiraConfig::new("h", "e", "t").with_page_size(0);
        assert_eq!(config.page_size, 1);
    }
}
