use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use triago_core::{Developer, Feature, Issue, Project, Result, TriagoError};

use crate::filter::{IssueFilter, IssueOrder};
use crate::store::HistoryStore;

/// A complete point-in-time export of the tracking database.
///
/// This is the document the surrounding application hands to the engine in
/// place of a live relational store: every entity collection, already joined
/// down to plain records.
///
/// # Examples
///
/// ```
/// use triago_store::Snapshot;
///
/// let snapshot: Snapshot = serde_json::from_str(r#"{
///     "projects": [{"id": 1, "name": "storefront"}],
///     "features": [],
///     "developers": [],
///     "issues": []
/// }"#).unwrap();
/// assert_eq!(snapshot.projects.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// All projects.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// All features.
    #[serde(default)]
    pub features: Vec<Feature>,
    /// All developers with memberships.
    #[serde(default)]
    pub developers: Vec<Developer>,
    /// All issues, historical and live.
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// In-memory [`HistoryStore`] over a loaded [`Snapshot`].
///
/// Used by the CLI (file-backed) and by tests (literal snapshots). Queries
/// are linear scans; snapshots in this system are small enough that nothing
/// smarter is warranted.
///
/// # Examples
///
/// ```
/// use triago_store::{MemoryStore, Snapshot};
///
/// let store = MemoryStore::new(Snapshot::default());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    /// Wrap an already-loaded snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a snapshot from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`TriagoError::Serialization`] if the JSON is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use triago_store::MemoryStore;
    ///
    /// let store = MemoryStore::from_json("{}").unwrap();
    /// ```
    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot from a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TriagoError::SnapshotNotFound`] if the file does not exist,
    /// [`TriagoError::Io`] on read failure, or
    /// [`TriagoError::Serialization`] on malformed JSON.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use triago_store::MemoryStore;
    ///
    /// let store = MemoryStore::from_file(Path::new("snapshot.json")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TriagoError::SnapshotNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Access the underlying snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn find_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .snapshot
            .issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect();

        match filter.order {
            Some(IssueOrder::ResolvedAtDesc) => {
                // Option<DateTime> ordering puts None first ascending, so a
                // reversed compare sorts unresolved issues last.
                issues.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
            }
            Some(IssueOrder::CreatedAtDesc) => {
                issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            None => {}
        }

        if let Some(limit) = filter.limit {
            issues.truncate(limit);
        }

        Ok(issues)
    }

    async fn count_issues(&self, filter: &IssueFilter) -> Result<usize> {
        Ok(self
            .snapshot
            .issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .count())
    }

    async fn find_developers(&self) -> Result<Vec<Developer>> {
        Ok(self.snapshot.developers.clone())
    }

    async fn find_features(&self) -> Result<Vec<Feature>> {
        Ok(self.snapshot.features.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triago_core::{IssueStatus, Severity};

    fn snapshot_json() -> &'static str {
        r#"{
            "projects": [{"id": 1, "name": "storefront"}],
            "features": [
                {"id": 10, "name": "checkout", "projectId": 1,
                 "createdAt": "2026-01-01T00:00:00Z"}
            ],
            "developers": [
                {"id": 100, "name": "Priya N.", "projectIds": [1]}
            ],
            "issues": [
                {"id": 1, "title": "a", "severity": "high", "status": "resolved",
                 "resolutionTime": 10.0, "fixQuality": 4,
                 "createdAt": "2026-03-01T00:00:00Z",
                 "resolvedAt": "2026-03-02T00:00:00Z",
                 "projectId": 1, "featureId": 10, "assignedTo": 100},
                {"id": 2, "title": "b", "severity": "low", "status": "resolved",
                 "resolutionTime": 30.0,
                 "createdAt": "2026-03-05T00:00:00Z",
                 "resolvedAt": "2026-03-08T00:00:00Z",
                 "projectId": 1, "featureId": 10, "assignedTo": 100},
                {"id": 3, "title": "c", "severity": "critical", "status": "open",
                 "createdAt": "2026-03-09T00:00:00Z",
                 "projectId": 1, "assignedTo": 100}
            ]
        }"#
    }

    #[tokio::test]
    async fn find_issues_applies_filter() {
        let store = MemoryStore::from_json(snapshot_json()).unwrap();
        let filter = IssueFilter {
            statuses: Some(vec![IssueStatus::Resolved, IssueStatus::Closed]),
            has_resolution_time: true,
            ..IssueFilter::default()
        };
        let issues = store.find_issues(&filter).await.unwrap();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.resolution_time.is_some()));
    }

    #[tokio::test]
    async fn resolved_at_desc_orders_newest_first() {
        let store = MemoryStore::from_json(snapshot_json()).unwrap();
        let filter = IssueFilter {
            order: Some(IssueOrder::ResolvedAtDesc),
            ..IssueFilter::default()
        };
        let issues = store.find_issues(&filter).await.unwrap();
        assert_eq!(issues[0].id, 2);
        assert_eq!(issues[1].id, 1);
        // unresolved issue sorts last
        assert_eq!(issues[2].id, 3);
    }

    #[tokio::test]
    async fn limit_truncates_after_ordering() {
        let store = MemoryStore::from_json(snapshot_json()).unwrap();
        let filter = IssueFilter {
            order: Some(IssueOrder::CreatedAtDesc),
            limit: Some(1),
            ..IssueFilter::default()
        };
        let issues = store.find_issues(&filter).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, 3);
    }

    #[tokio::test]
    async fn count_ignores_limit() {
        let store = MemoryStore::from_json(snapshot_json()).unwrap();
        let filter = IssueFilter {
            severity: Some(Severity::High),
            limit: Some(0),
            ..IssueFilter::default()
        };
        assert_eq!(store.count_issues(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn entity_collections_round_trip() {
        let store = MemoryStore::from_json(snapshot_json()).unwrap();
        let developers = store.find_developers().await.unwrap();
        assert_eq!(developers.len(), 1);
        assert_eq!(developers[0].project_ids, vec![1]);

        let features = store.find_features().await.unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "checkout");
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let err = MemoryStore::from_file(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, TriagoError::SnapshotNotFound(_)));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = MemoryStore::from_json("{not json").unwrap_err();
        assert!(matches!(err, TriagoError::Serialization(_)));
    }

    #[test]
    fn empty_document_yields_empty_snapshot() {
        let store = MemoryStore::from_json("{}").unwrap();
        assert!(store.snapshot().issues.is_empty());
        assert!(store.snapshot().developers.is_empty());
    }
}
