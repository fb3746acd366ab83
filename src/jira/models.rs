//! Response payloads of the Jira issue search and worklog endpoints.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

use crate::adf::Node;

/// One page of `GET /rest/api/3/search`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<IssueRef>,
}

/// Issue summary as returned by search: stable numeric id plus key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueRef {
    pub id: String,
    pub key: String,
}

/// Response of `GET /rest/api/3/issue/{key}/worklog`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

/// A single worklog record as received from the tracker
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    #[serde(default)]
    pub id: String,
    pub issue_id: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub started: DateTime<FixedOffset>,
    #[serde(default)]
    pub time_spent_seconds: Option<u64>,
    #[serde(default)]
    pub comment: Option<Node>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub email_address: Option<String>,
}

/// Parse the tracker's timestamp format (`2024-01-02T09:00:00.000+0100`),
/// falling back to RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid worklog timestamp: {}", raw)))
}
