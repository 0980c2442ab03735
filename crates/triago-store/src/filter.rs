use chrono::{DateTime, Utc};
use triago_core::{DeveloperId, FeatureId, Issue, IssueStatus, ProjectId, Severity};

/// Predicate set for issue queries.
///
/// Fields left at their defaults do not constrain the result. Construct with
/// struct-update syntax:
///
/// # Examples
///
/// ```
/// use triago_store::{IssueFilter, IssueOrder};
/// use triago_core::IssueStatus;
///
/// let filter = IssueFilter {
///     statuses: Some(vec![IssueStatus::Resolved, IssueStatus::Closed]),
///     has_resolution_time: true,
///     order: Some(IssueOrder::ResolvedAtDesc),
///     limit: Some(20),
///     ..IssueFilter::default()
/// };
/// assert!(filter.severity.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// Restrict to any of these statuses.
    pub statuses: Option<Vec<IssueStatus>>,
    /// Restrict to this severity.
    pub severity: Option<Severity>,
    /// Restrict to this project.
    pub project_id: Option<ProjectId>,
    /// Restrict to issues assigned to this developer.
    pub assigned_to: Option<DeveloperId>,
    /// Restrict to issues filed against this feature.
    pub feature_id: Option<FeatureId>,
    /// Only issues resolved at or after this instant.
    pub resolved_after: Option<DateTime<Utc>>,
    /// Only issues resolved strictly before this instant.
    pub resolved_before: Option<DateTime<Utc>>,
    /// Only issues created at or after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Only issues created strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Only issues with a recorded resolution time.
    pub has_resolution_time: bool,
    /// Only issues with a recorded fix quality.
    pub has_fix_quality: bool,
    /// Result ordering; snapshot order when `None`.
    pub order: Option<IssueOrder>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl IssueFilter {
    /// Whether `issue` satisfies every constraint in this filter.
    ///
    /// Ordering and limiting are applied by the store, not here.
    ///
    /// # Examples
    ///
    /// ```
    /// use triago_store::IssueFilter;
    /// use triago_core::{Issue, IssueStatus, Severity};
    ///
    /// let issue: Issue = serde_json::from_str(r#"{
    ///     "id": 1, "title": "t", "severity": "high", "status": "open",
    ///     "createdAt": "2026-02-01T00:00:00Z", "projectId": 4
    /// }"#).unwrap();
    ///
    /// let filter = IssueFilter { project_id: Some(4), ..IssueFilter::default() };
    /// assert!(filter.matches(&issue));
    ///
    /// let filter = IssueFilter { severity: Some(Severity::Low), ..IssueFilter::default() };
    /// assert!(!filter.matches(&issue));
    /// ```
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&issue.status) {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if issue.severity != severity {
                return false;
            }
        }
        if let Some(project_id) = self.project_id {
            if issue.project_id != project_id {
                return false;
            }
        }
        if let Some(assigned_to) = self.assigned_to {
            if issue.assigned_to != Some(assigned_to) {
                return false;
            }
        }
        if let Some(feature_id) = self.feature_id {
            if issue.feature_id != Some(feature_id) {
                return false;
            }
        }
        if let Some(cutoff) = self.resolved_after {
            match issue.resolved_at {
                Some(resolved_at) if resolved_at >= cutoff => {}
                _ => return false,
            }
        }
        if let Some(cutoff) = self.resolved_before {
            match issue.resolved_at {
                Some(resolved_at) if resolved_at < cutoff => {}
                _ => return false,
            }
        }
        if let Some(cutoff) = self.created_after {
            if issue.created_at < cutoff {
                return false;
            }
        }
        if let Some(cutoff) = self.created_before {
            if issue.created_at >= cutoff {
                return false;
            }
        }
        if self.has_resolution_time && issue.resolution_time.is_none() {
            return false;
        }
        if self.has_fix_quality && issue.fix_quality.is_none() {
            return false;
        }
        true
    }
}

/// Result ordering for issue queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOrder {
    /// Most recently resolved first; unresolved issues sort last.
    ResolvedAtDesc,
    /// Most recently created first.
    CreatedAtDesc,
}
