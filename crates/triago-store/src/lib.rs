//! Read-only access to historical issue records.
//!
//! Defines [`HistoryStore`], the single collaborator the analytics engine
//! queries, plus the [`IssueFilter`] predicate language and [`MemoryStore`],
//! an in-memory implementation over a JSON [`Snapshot`]. The engine never
//! writes: callers that persist derived state (e.g. marking an issue
//! recurring) do so outside this interface.

mod filter;
mod memory;
mod store;

pub use filter::{IssueFilter, IssueOrder};
pub use memory::{MemoryStore, Snapshot};
pub use store::HistoryStore;
