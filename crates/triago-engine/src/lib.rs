//! Heuristic analytics over historical issue records.
//!
//! Three peer estimators, each an independent stateless entry point taking
//! the read-only [`HistoryStore`](triago_store::HistoryStore) collaborator
//! explicitly:
//!
//! - [`predictor`] — similarity-weighted resolution-time estimates
//! - [`hotspots`] — feature defect-risk ranking with trend classification
//! - [`matcher`] — five-factor developer assignment ranking
//!
//! Every entry point recomputes from the snapshot it reads and always
//! returns a structurally valid result: collaborator failures are logged
//! and converted to documented fallbacks, never propagated. These are
//! advisory analytics — a broken estimate must never block issue creation
//! or assignment.

pub mod hotspots;
pub mod matcher;
pub mod predictor;
