//! Developer assignment ranking.
//!
//! Scores every developer for a new issue as the sum of five independently
//! capped factors: project membership, relevant experience, inverse current
//! workload, fix quality, and resolution speed. Factors are bounded rather
//! than normalized, so the composite is a comparable score, not a
//! probability. Factors with no supporting history contribute nothing —
//! absent data is no signal, never a penalty.

use serde::{Deserialize, Serialize};
use triago_core::{Developer, DeveloperId, FeatureId, IssueStatus, ProjectId, Severity};
use triago_store::{HistoryStore, IssueFilter, IssueOrder};

/// Points for membership in the target project.
const PROJECT_MEMBER_POINTS: f64 = 30.0;
/// Points per resolved same-severity same-project issue, and the factor cap.
const EXPERIENCE_POINTS_PER_ISSUE: f64 = 5.0;
const EXPERIENCE_CAP: f64 = 25.0;
/// Workload factor: base points minus a penalty per active issue.
const WORKLOAD_BASE_POINTS: f64 = 20.0;
const WORKLOAD_PENALTY_PER_ISSUE: f64 = 4.0;
/// Availability tiers on the active-issue count.
const LOW_AVAILABILITY_ABOVE: usize = 5;
const MEDIUM_AVAILABILITY_ABOVE: usize = 2;
/// Fix-quality factor: 1–5 average scaled by this multiplier (cap 15).
const QUALITY_POINT_MULTIPLIER: f64 = 3.0;
/// Average quality worth calling out in the reasons.
const QUALITY_PRAISE_THRESHOLD: f64 = 4.0;
/// Recent settled issues sampled for quality and speed.
const RECENT_SAMPLE_LIMIT: usize = 20;
/// Resolution-speed tiers, in average hours, and their points.
const FAST_RESOLUTION_HOURS: f64 = 24.0;
const FAST_RESOLUTION_POINTS: f64 = 10.0;
const MODERATE_RESOLUTION_HOURS: f64 = 48.0;
const MODERATE_RESOLUTION_POINTS: f64 = 5.0;

/// The issue an assignee is being sought for.
///
/// # Examples
///
/// ```
/// use triago_engine::matcher::AssignmentRequest;
/// use triago_core::Severity;
///
/// let request = AssignmentRequest {
///     severity: Severity::High,
///     project_id: 1,
///     feature_id: None,
/// };
/// assert_eq!(request.project_id, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    /// Severity of the issue to assign.
    pub severity: Severity,
    /// Project the issue belongs to.
    pub project_id: ProjectId,
    /// Feature the issue is filed against, if any.
    #[serde(default)]
    pub feature_id: Option<FeatureId>,
}

/// How free a developer currently is, derived from their active-issue count.
///
/// # Examples
///
/// ```
/// use triago_engine::matcher::Availability;
///
/// let a: Availability = serde_json::from_str("\"high\"").unwrap();
/// assert_eq!(a, Availability::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// More than 5 active issues.
    Low,
    /// 3 to 5 active issues.
    Medium,
    /// At most 2 active issues.
    High,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Low => write!(f, "low"),
            Availability::Medium => write!(f, "medium"),
            Availability::High => write!(f, "high"),
        }
    }
}

/// A developer's suitability for the requested assignment.
///
/// # Examples
///
/// ```
/// use triago_engine::matcher::{Availability, DeveloperMatch};
///
/// let m = DeveloperMatch {
///     developer_id: 3,
///     developer_name: "Priya N.".into(),
///     score: 89,
///     reasons: vec!["Member of the target project".into()],
///     current_workload: 0,
///     availability: Availability::High,
///     estimated_time: Some(20.0),
/// };
/// assert_eq!(m.score, 89);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperMatch {
    /// Developer id.
    pub developer_id: DeveloperId,
    /// Developer display name.
    pub developer_name: String,
    /// Rounded sum of all factor points (nominally 0–100).
    pub score: u32,
    /// Human-readable notes for each contributing factor.
    pub reasons: Vec<String>,
    /// Active (open or in-progress) issues currently assigned.
    pub current_workload: usize,
    /// Availability tier derived from the workload.
    pub availability: Availability,
    /// Average recent resolution hours in this project, when history exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<f64>,
}

/// Rank all developers for the requested assignment, best first.
///
/// Always returns a structurally valid list: no developers yields an empty
/// list, and any store failure is logged and yields an empty list.
///
/// # Examples
///
/// ```no_run
/// use triago_core::Severity;
/// use triago_engine::matcher::{match_developers, AssignmentRequest};
/// use triago_store::{MemoryStore, Snapshot};
///
/// # async fn example() {
/// let store = MemoryStore::new(Snapshot::default());
/// let request = AssignmentRequest {
///     severity: Severity::High,
///     project_id: 1,
///     feature_id: None,
/// };
/// let ranked = match_developers(&store, &request).await;
/// assert!(ranked.is_empty());
/// # }
/// ```
pub async fn match_developers(
    store: &dyn HistoryStore,
    request: &AssignmentRequest,
) -> Vec<DeveloperMatch> {
    match rank_developers(store, request).await {
        Ok(matches) => matches,
        Err(err) => {
            tracing::warn!(error = %err, "developer query failed; returning no candidates");
            Vec::new()
        }
    }
}

async fn rank_developers(
    store: &dyn HistoryStore,
    request: &AssignmentRequest,
) -> triago_core::Result<Vec<DeveloperMatch>> {
    let developers = store.find_developers().await?;
    let mut matches = Vec::with_capacity(developers.len());

    for developer in &developers {
        matches.push(score_developer(store, request, developer).await?);
    }

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(matches)
}

async fn score_developer(
    store: &dyn HistoryStore,
    request: &AssignmentRequest,
    developer: &Developer,
) -> triago_core::Result<DeveloperMatch> {
    let mut score = 0.0;
    let mut reasons = Vec::new();
    let settled = vec![IssueStatus::Resolved, IssueStatus::Closed];

    // Factor 1: project membership
    if developer.project_ids.contains(&request.project_id) {
        score += PROJECT_MEMBER_POINTS;
        reasons.push("Member of the target project".into());
    }

    // Factor 2: resolved issues of the same severity in the same project
    let experience_filter = IssueFilter {
        assigned_to: Some(developer.id),
        severity: Some(request.severity),
        project_id: Some(request.project_id),
        statuses: Some(settled.clone()),
        ..IssueFilter::default()
    };
    let experience = store.count_issues(&experience_filter).await?;
    if experience > 0 {
        score += (experience as f64 * EXPERIENCE_POINTS_PER_ISSUE).min(EXPERIENCE_CAP);
        reasons.push(format!(
            "Resolved {experience} {} issues in this project",
            request.severity
        ));
    }

    // Factor 3: inverse current workload, plus the availability tier
    let workload_filter = IssueFilter {
        assigned_to: Some(developer.id),
        statuses: Some(vec![IssueStatus::Open, IssueStatus::InProgress]),
        ..IssueFilter::default()
    };
    let workload = store.count_issues(&workload_filter).await?;
    score +=
        (WORKLOAD_BASE_POINTS - workload as f64 * WORKLOAD_PENALTY_PER_ISSUE).max(0.0);
    let availability = availability_for(workload);
    reasons.push(availability_reason(availability, workload));

    // Factor 4: average fix quality over the most recent rated issues
    let quality_filter = IssueFilter {
        assigned_to: Some(developer.id),
        statuses: Some(settled.clone()),
        has_fix_quality: true,
        order: Some(IssueOrder::ResolvedAtDesc),
        limit: Some(RECENT_SAMPLE_LIMIT),
        ..IssueFilter::default()
    };
    let rated = store.find_issues(&quality_filter).await?;
    let qualities: Vec<f64> = rated
        .iter()
        .filter_map(|i| i.fix_quality.map(f64::from))
        .collect();
    if !qualities.is_empty() {
        let average = qualities.iter().sum::<f64>() / qualities.len() as f64;
        score += average * QUALITY_POINT_MULTIPLIER;
        if average >= QUALITY_PRAISE_THRESHOLD {
            reasons.push(format!("Strong fix quality (avg {average:.1}/5)"));
        }
    }

    // Factor 5: average resolution speed on recent issues in this project
    let speed_filter = IssueFilter {
        assigned_to: Some(developer.id),
        project_id: Some(request.project_id),
        statuses: Some(settled),
        has_resolution_time: true,
        order: Some(IssueOrder::ResolvedAtDesc),
        limit: Some(RECENT_SAMPLE_LIMIT),
        ..IssueFilter::default()
    };
    let timed = store.find_issues(&speed_filter).await?;
    let hours: Vec<f64> = timed.iter().filter_map(|i| i.resolution_time).collect();
    let estimated_time = if hours.is_empty() {
        None
    } else {
        let average = hours.iter().sum::<f64>() / hours.len() as f64;
        if average < FAST_RESOLUTION_HOURS {
            score += FAST_RESOLUTION_POINTS;
            reasons.push(format!("Fast resolver (avg {average:.0}h)"));
        } else if average < MODERATE_RESOLUTION_HOURS {
            score += MODERATE_RESOLUTION_POINTS;
            reasons.push(format!("Reasonable turnaround (avg {average:.0}h)"));
        }
        Some(average)
    };

    Ok(DeveloperMatch {
        developer_id: developer.id,
        developer_name: developer.name.clone(),
        score: score.round() as u32,
        reasons,
        current_workload: workload,
        availability,
        estimated_time,
    })
}

fn availability_for(workload: usize) -> Availability {
    if workload > LOW_AVAILABILITY_ABOVE {
        Availability::Low
    } else if workload > MEDIUM_AVAILABILITY_ABOVE {
        Availability::Medium
    } else {
        Availability::High
    }
}

fn availability_reason(availability: Availability, workload: usize) -> String {
    match availability {
        Availability::Low => format!("Heavy current workload ({workload} active issues)"),
        Availability::Medium => format!("Moderate current workload ({workload} active issues)"),
        Availability::High => format!("Available now ({workload} active issues)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_tier_boundaries() {
        assert_eq!(availability_for(0), Availability::High);
        assert_eq!(availability_for(2), Availability::High);
        assert_eq!(availability_for(3), Availability::Medium);
        assert_eq!(availability_for(5), Availability::Medium);
        assert_eq!(availability_for(6), Availability::Low);
        assert_eq!(availability_for(12), Availability::Low);
    }

    #[test]
    fn availability_reasons_carry_the_count() {
        assert!(availability_reason(Availability::Low, 7).contains("7 active issues"));
        assert!(availability_reason(Availability::Medium, 4).contains("4 active issues"));
        assert!(availability_reason(Availability::High, 0).contains("0 active issues"));
    }

    #[test]
    fn availability_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Availability::Medium).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn match_serializes_camel_case_and_skips_missing_estimate() {
        let m = DeveloperMatch {
            developer_id: 3,
            developer_name: "Priya N.".into(),
            score: 50,
            reasons: vec![],
            current_workload: 1,
            availability: Availability::High,
            estimated_time: None,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("developerId").is_some());
        assert!(json.get("currentWorkload").is_some());
        assert!(json.get("estimatedTime").is_none());
    }
}
