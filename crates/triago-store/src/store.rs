use async_trait::async_trait;
use triago_core::{Developer, Feature, Issue, Result};

use crate::filter::IssueFilter;

/// Read-only query interface over historical issue records.
///
/// This is the single collaborator the analytics engine depends on. The
/// engine takes it as an explicit `&dyn HistoryStore` parameter so tests can
/// substitute a fake; no component ever writes through it. Implementations
/// must be safe to query concurrently.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch issues matching `filter`, ordered and limited per the filter.
    async fn find_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Count issues matching `filter`, ignoring its order and limit.
    async fn count_issues(&self, filter: &IssueFilter) -> Result<usize>;

    /// Fetch all developers with their project memberships.
    async fn find_developers(&self) -> Result<Vec<Developer>>;

    /// Fetch all features.
    async fn find_features(&self) -> Result<Vec<Feature>>;
}
