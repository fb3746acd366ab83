use chrono::{Local, TimeZone};
use futures::future::try_join_all;
use log::{debug, info};
use std::collections::HashMap;
use std::future::Future;

use crate::adf;
use crate::error::{ReportError, Result};
use crate::jira::{IssueRef, JiraClient, Worklog, WorklogPage};
use crate::models::NormalizedEntry;
use crate::period::ReportPeriod;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// JQL selecting every issue the current user logged work on during `period`
pub fn worklog_jql(period: &ReportPeriod) -> String {
    format!(
        "worklogAuthor = currentUser() AND worklogDate >= \"{}\" AND worklogDate <= \"{}\"",
        period.start.format("%Y-%m-%d"),
        period.end.format("%Y-%m-%d")
    )
}

/// Index search results by issue id so worklogs can be mapped back to keys
pub fn index_issues(issues: Vec<IssueRef>) -> HashMap<String, IssueRef> {
    issues
        .into_iter()
        .map(|issue| (issue.id.clone(), issue))
        .collect()
}

/// Run `fetch` once per key, all concurrently, and collect the payloads by key.
///
/// Completes once every fetch has resolved. The first failure fails the whole
/// batch; there are no partial results.
pub async fn fetch_all<T, E, F, Fut>(keys: &[String], fetch: F) -> std::result::Result<HashMap<String, T>, E>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let tasks = keys.iter().map(|key| {
        let request = fetch(key.clone());
        async move { request.await.map(|payload| (key.clone(), payload)) }
    });

    Ok(try_join_all(tasks).await?.into_iter().collect())
}

/// Fetch the worklogs of every issue inside the report window.
///
/// Each request passes through the client's limiter, which caps how many
/// fetches start per second without limiting how many are in flight.
pub async fn fetch_worklogs(
    client: &JiraClient,
    issue_keys: &[String],
    period: &ReportPeriod,
) -> Result<HashMap<String, WorklogPage>> {
    let since = period.start_utc();
    let until = period.end_exclusive_utc();

    debug!(
        "Fetching worklogs of {} issues, one request every {:?}",
        issue_keys.len(),
        client.rate_limiter().interval()
    );

    let pages = fetch_all(issue_keys, |key| async move {
        let page = client.get_worklogs(&key, since, Some(until)).await?;
        debug!("Fetched {} worklogs for {}", page.worklogs.len(), key);
        Ok::<_, ReportError>(page)
    })
    .await?;

    Ok(pages)
}

/// Reduce raw worklogs to the requesting user's entries.
///
/// Start times are shifted into `tz`, so every entry's day is a calendar day
/// of the reporting timezone; entries are sorted by that day, then by start.
/// Records by other authors are skipped. Every retained record's issue id
/// must be present in `issues`; a missing id aborts with
/// [`ReportError::UnresolvedIssue`].
pub fn normalize<'a, I, Tz>(
    pages: I,
    issues: &HashMap<String, IssueRef>,
    user_email: &str,
    tz: &Tz,
) -> Result<Vec<NormalizedEntry>>
where
    I: IntoIterator<Item = &'a WorklogPage>,
    Tz: TimeZone,
{
    let mut entries = Vec::new();

    for worklog in pages.into_iter().flat_map(|page| page.worklogs.iter()) {
        if !is_authored_by(worklog, user_email) {
            continue;
        }

        let issue = issues
            .get(&worklog.issue_id)
            .ok_or_else(|| ReportError::UnresolvedIssue {
                worklog_id: worklog.id.clone(),
                issue_id: worklog.issue_id.clone(),
            })?;

        entries.push(NormalizedEntry {
            started: worklog.started.with_timezone(tz).fixed_offset(),
            issue_key: issue.key.clone(),
            hours_spent: worklog.time_spent_seconds.unwrap_or(0) as f64 / SECONDS_PER_HOUR,
            comment: adf::flatten(worklog.comment.as_ref()),
        });
    }

    entries.sort_by(|a, b| {
        a.day()
            .cmp(&b.day())
            .then_with(|| a.started.cmp(&b.started))
            .then_with(|| a.issue_key.cmp(&b.issue_key))
    });

    Ok(entries)
}

fn is_authored_by(worklog: &Worklog, user_email: &str) -> bool {
    worklog
        .author
        .as_ref()
        .and_then(|author| author.email_address.as_deref())
        .map_or(false, |email| email.eq_ignore_ascii_case(user_email))
}

/// Search, fetch and normalize everything the report needs for `period`
pub async fn collect_entries(
    client: &JiraClient,
    period: &ReportPeriod,
    user_email: &str,
) -> Result<Vec<NormalizedEntry>> {
    let jql = worklog_jql(period);
    debug!("Searching issues: {}", jql);

    let issues = index_issues(client.search_issue_refs(&jql).await?);
    info!("Found {} issues with worklogs in {}", issues.len(), period);

    let mut keys: Vec<String> = issues.values().map(|issue| issue.key.clone()).collect();
    keys.sort();

    let pages = fetch_worklogs(client, &keys, period).await?;
    let entries = normalize(pages.values(), &issues, user_email, &Local)?;
    info!("Collected {} worklog entries", entries.len());

    Ok(entries)
}
