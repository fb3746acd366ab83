use thiserror::Error;

use crate::jira::JiraError;

pub type Result<T> = std::result::Result<T, ReportError>;

/// Failures that abort report generation
#[derive(Debug, Error)]
pub enum ReportError {
    /// Host, identity or credentials are missing; raised before any request.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A worklog refers to an issue id the search never returned. The search
    /// and the worklog fetch disagree, so nothing sensible can be reported.
    #[error("worklog {worklog_id} references issue id {issue_id} missing from the search result")]
    UnresolvedIssue { worklog_id: String, issue_id: String },

    #[error("remote operation failed: {0}")]
    Remote(#[from] JiraError),

    #[error("rendering failed: {0}")]
    Rendering(String),
}
