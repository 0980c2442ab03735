use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for an issue record.
pub type IssueId = i64;
/// Identifier for a developer record.
pub type DeveloperId = i64;
/// Identifier for a feature record.
pub type FeatureId = i64;
/// Identifier for a project record.
pub type ProjectId = i64;

/// Severity of an issue.
///
/// # Examples
///
/// ```
/// use triago_core::Severity;
///
/// let s: Severity = serde_json::from_str("\"critical\"").unwrap();
/// assert_eq!(s, Severity::Critical);
/// assert_eq!(s.rank(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or minor defect.
    Low,
    /// Defect with a workaround.
    Medium,
    /// Defect impairing a main flow.
    High,
    /// Defect blocking users or risking data.
    Critical,
}

impl Severity {
    /// Numeric rank used by the similarity encoding: low=1 … critical=4.
    ///
    /// # Examples
    ///
    /// ```
    /// use triago_core::Severity;
    ///
    /// assert_eq!(Severity::Low.rank(), 1);
    /// assert_eq!(Severity::Critical.rank(), 4);
    /// ```
    pub fn rank(self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Lifecycle state of an issue.
///
/// # Examples
///
/// ```
/// use triago_core::IssueStatus;
///
/// let s: IssueStatus = serde_json::from_str("\"in_progress\"").unwrap();
/// assert_eq!(s, IssueStatus::InProgress);
/// assert!(s.is_active());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Reported, not yet picked up.
    Open,
    /// Assigned and being worked.
    InProgress,
    /// Fix delivered.
    Resolved,
    /// Verified and archived.
    Closed,
}

impl IssueStatus {
    /// Returns `true` for issues that still occupy a developer (open or
    /// in-progress).
    ///
    /// # Examples
    ///
    /// ```
    /// use triago_core::IssueStatus;
    ///
    /// assert!(IssueStatus::Open.is_active());
    /// assert!(IssueStatus::InProgress.is_active());
    /// assert!(!IssueStatus::Resolved.is_active());
    /// ```
    pub fn is_active(self) -> bool {
        matches!(self, IssueStatus::Open | IssueStatus::InProgress)
    }

    /// Returns `true` for issues that reached a terminal state (resolved or
    /// closed). Only these may carry a resolution time or fix quality.
    ///
    /// # Examples
    ///
    /// ```
    /// use triago_core::IssueStatus;
    ///
    /// assert!(IssueStatus::Resolved.is_settled());
    /// assert!(IssueStatus::Closed.is_settled());
    /// assert!(!IssueStatus::Open.is_settled());
    /// ```
    pub fn is_settled(self) -> bool {
        matches!(self, IssueStatus::Resolved | IssueStatus::Closed)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStatus::Open => write!(f, "open"),
            IssueStatus::InProgress => write!(f, "in_progress"),
            IssueStatus::Resolved => write!(f, "resolved"),
            IssueStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IssueStatus::Open),
            "in_progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            "closed" => Ok(IssueStatus::Closed),
            other => Err(format!("unknown issue status: {other}")),
        }
    }
}

/// A historical issue record as read from the snapshot.
///
/// `resolution_time` and `fix_quality` are present only for settled issues;
/// absent values are "no signal" for every average computed downstream,
/// never zero.
///
/// # Examples
///
/// ```
/// use triago_core::{Issue, IssueStatus, Severity};
///
/// let issue: Issue = serde_json::from_str(r#"{
///     "id": 1,
///     "title": "login fails on expired token",
///     "severity": "high",
///     "status": "resolved",
///     "isRecurring": false,
///     "resolutionTime": 18.5,
///     "fixQuality": 4,
///     "createdAt": "2026-01-02T09:00:00Z",
///     "resolvedAt": "2026-01-03T03:30:00Z",
///     "projectId": 1,
///     "featureId": 7,
///     "assignedTo": 3
/// }"#).unwrap();
/// assert_eq!(issue.severity, Severity::High);
/// assert!(issue.status.is_settled());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Unique issue id.
    pub id: IssueId,
    /// Short human-readable summary.
    pub title: String,
    /// Reported severity.
    pub severity: Severity,
    /// Current lifecycle state.
    pub status: IssueStatus,
    /// Whether this defect has reappeared after a previous fix.
    #[serde(default)]
    pub is_recurring: bool,
    /// Hours from creation to resolution; `None` until settled.
    #[serde(default)]
    pub resolution_time: Option<f64>,
    /// Reviewer-assigned fix quality, 1–5; `None` until settled and rated.
    #[serde(default)]
    pub fix_quality: Option<u8>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Resolution timestamp; `None` until settled.
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Owning project.
    pub project_id: ProjectId,
    /// Feature the defect was filed against, if any.
    #[serde(default)]
    pub feature_id: Option<FeatureId>,
    /// Developer currently or last assigned, if any.
    #[serde(default)]
    pub assigned_to: Option<DeveloperId>,
}

/// A developer with project memberships.
///
/// # Examples
///
/// ```
/// use triago_core::Developer;
///
/// let dev = Developer {
///     id: 3,
///     name: "Priya N.".into(),
///     project_ids: vec![1, 2],
/// };
/// assert!(dev.project_ids.contains(&1));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    /// Unique developer id.
    pub id: DeveloperId,
    /// Display name.
    pub name: String,
    /// Projects this developer is a member of.
    #[serde(default)]
    pub project_ids: Vec<ProjectId>,
}

/// A product feature issues are filed against.
///
/// # Examples
///
/// ```
/// use triago_core::Feature;
///
/// let json = r#"{"id": 7, "name": "checkout", "projectId": 1,
///                "createdAt": "2025-11-01T00:00:00Z"}"#;
/// let feature: Feature = serde_json::from_str(json).unwrap();
/// assert_eq!(feature.name, "checkout");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Unique feature id.
    pub id: FeatureId,
    /// Display name.
    pub name: String,
    /// Owning project.
    pub project_id: ProjectId,
    /// When the feature shipped; anchors the bug-density age window.
    pub created_at: DateTime<Utc>,
}

/// A project grouping features, issues, and developer memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project id.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument
/// parsing.
///
/// # Examples
///
/// ```
/// use triago_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
