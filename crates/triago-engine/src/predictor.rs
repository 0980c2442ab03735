//! Similarity-weighted resolution-time prediction.
//!
//! Estimates hours-to-resolve for a new issue by encoding recent resolved
//! history and the query into small feature vectors, ranking history by
//! cosine similarity, and averaging neighbor resolution times weighted by
//! similarity. Sparse or unreachable history falls back to a per-severity
//! baseline rather than failing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use triago_core::{DeveloperId, FeatureId, Issue, IssueStatus, ProjectId, Severity};
use triago_store::{HistoryStore, IssueFilter};

/// Days of resolved history considered.
const HISTORY_WINDOW_DAYS: i64 = 180;
/// Minimum resolved sample before similarity search applies.
const MIN_HISTORY: usize = 10;
/// Neighbors kept for the weighted average.
const NEIGHBOR_LIMIT: usize = 10;
/// Confidence reported with the baseline on sparse or unreachable history.
const SPARSE_CONFIDENCE: f64 = 0.3;
/// Confidence reported when no selected neighbor has positive similarity.
const NO_MATCH_CONFIDENCE: f64 = 0.4;
/// Bounds on dispersion-derived confidence.
const CONFIDENCE_FLOOR: f64 = 0.4;
const CONFIDENCE_CEILING: f64 = 0.95;
/// Confidence tiers for factor notes.
const HIGH_CONFIDENCE: f64 = 0.8;
const MODERATE_CONFIDENCE: f64 = 0.6;
/// Duration tiers for factor notes, in hours.
const QUICK_FIX_HOURS: i64 = 24;
const COMPLEX_FIX_HOURS: i64 = 72;

/// The issue being estimated.
///
/// # Examples
///
/// ```
/// use triago_engine::predictor::PredictionRequest;
/// use triago_core::Severity;
///
/// let request = PredictionRequest {
///     severity: Severity::High,
///     project_id: 1,
///     assigned_to: None,
///     feature_id: Some(7),
/// };
/// assert!(request.assigned_to.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    /// Reported severity of the new issue.
    pub severity: Severity,
    /// Project the issue belongs to.
    pub project_id: ProjectId,
    /// Intended assignee, if already known.
    #[serde(default)]
    pub assigned_to: Option<DeveloperId>,
    /// Feature the issue is filed against, if any.
    #[serde(default)]
    pub feature_id: Option<FeatureId>,
}

/// A resolution-time estimate with its confidence and explanation.
///
/// # Examples
///
/// ```
/// use triago_engine::predictor::Prediction;
///
/// let p = Prediction {
///     value: 24,
///     confidence: 0.7,
///     factors: vec!["Based on 10 similar resolved issues".into()],
/// };
/// assert!(p.confidence >= 0.3 && p.confidence <= 0.95);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Estimated hours to resolve, rounded to the nearest hour.
    pub value: i64,
    /// Estimate confidence in `[0.3, 0.95]`.
    pub confidence: f64,
    /// Human-readable notes explaining the estimate.
    pub factors: Vec<String>,
}

impl Prediction {
    fn baseline(severity: Severity, confidence: f64, factor: &str) -> Self {
        Self {
            value: severity_baseline(severity),
            confidence,
            factors: vec![factor.into()],
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Predicted resolution: {}h (confidence {:.0}%)",
            self.value,
            self.confidence * 100.0
        )?;
        for factor in &self.factors {
            writeln!(f, "  - {factor}")?;
        }
        Ok(())
    }
}

/// Baseline hours used when history cannot support a similarity estimate.
fn severity_baseline(severity: Severity) -> i64 {
    match severity {
        Severity::Critical => 12,
        Severity::High => 24,
        Severity::Medium => 48,
        Severity::Low => 72,
    }
}

/// Estimate hours-to-resolve for the issue described by `request`.
///
/// Always returns a structurally valid [`Prediction`]: a failed history
/// query is logged and converted into the severity baseline with low
/// confidence. `now` anchors the 6-month history window and is supplied by
/// the caller so repeated calls over the same snapshot are reproducible.
///
/// # Examples
///
/// ```no_run
/// use chrono::Utc;
/// use triago_core::Severity;
/// use triago_engine::predictor::{predict_resolution_time, PredictionRequest};
/// use triago_store::{MemoryStore, Snapshot};
///
/// # async fn example() {
/// let store = MemoryStore::new(Snapshot::default());
/// let request = PredictionRequest {
///     severity: Severity::Critical,
///     project_id: 1,
///     assigned_to: None,
///     feature_id: None,
/// };
/// let prediction = predict_resolution_time(&store, &request, Utc::now()).await;
/// assert_eq!(prediction.value, 12);
/// # }
/// ```
pub async fn predict_resolution_time(
    store: &dyn HistoryStore,
    request: &PredictionRequest,
    now: DateTime<Utc>,
) -> Prediction {
    let filter = IssueFilter {
        statuses: Some(vec![IssueStatus::Resolved, IssueStatus::Closed]),
        has_resolution_time: true,
        resolved_after: Some(now - Duration::days(HISTORY_WINDOW_DAYS)),
        ..IssueFilter::default()
    };

    match store.find_issues(&filter).await {
        Ok(history) => predict_from_history(request, &history),
        Err(err) => {
            tracing::warn!(error = %err, "history query failed; using severity baseline");
            Prediction::baseline(
                request.severity,
                SPARSE_CONFIDENCE,
                "Historical data unavailable; using severity baseline",
            )
        }
    }
}

/// Pure scoring over an already-fetched history slice.
fn predict_from_history(request: &PredictionRequest, history: &[Issue]) -> Prediction {
    let query = encode_query(request);

    // (similarity, resolution hours) per usable historical issue
    let mut neighbors: Vec<(f64, f64)> = history
        .iter()
        .filter_map(|issue| {
            let hours = issue.resolution_time?;
            Some((cosine_similarity(&query, &encode_issue(request, issue)), hours))
        })
        .collect();

    if neighbors.len() < MIN_HISTORY {
        return Prediction::baseline(
            request.severity,
            SPARSE_CONFIDENCE,
            "Insufficient resolved history; using severity baseline",
        );
    }

    neighbors.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    neighbors.truncate(NEIGHBOR_LIMIT);

    let total_weight: f64 = neighbors.iter().map(|(sim, _)| sim).sum();
    if total_weight <= 0.0 {
        return Prediction::baseline(
            request.severity,
            NO_MATCH_CONFIDENCE,
            "No similar issues found in recent history; using severity baseline",
        );
    }

    let weighted: f64 = neighbors.iter().map(|(sim, hours)| sim * hours).sum();
    let value = (weighted / total_weight).round() as i64;

    let times: Vec<f64> = neighbors.iter().map(|(_, hours)| *hours).collect();
    let confidence = dispersion_confidence(&times);

    Prediction {
        value,
        confidence,
        factors: build_factors(request.severity, neighbors.len(), confidence, value),
    }
}

/// Encode the query issue: `sameProject` is 1 by construction, the optional
/// components are 1 only when the corresponding field is supplied.
fn encode_query(request: &PredictionRequest) -> [f64; 4] {
    [
        f64::from(request.severity.rank()),
        1.0,
        if request.assigned_to.is_some() { 1.0 } else { 0.0 },
        if request.feature_id.is_some() { 1.0 } else { 0.0 },
    ]
}

/// Encode a historical issue relative to the query.
fn encode_issue(request: &PredictionRequest, issue: &Issue) -> [f64; 4] {
    let same = |a: Option<i64>, b: Option<i64>| match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    };
    [
        f64::from(issue.severity.rank()),
        if issue.project_id == request.project_id {
            1.0
        } else {
            0.0
        },
        same(request.assigned_to, issue.assigned_to),
        same(request.feature_id, issue.feature_id),
    ]
}

/// Cosine similarity between two 4-component feature vectors.
///
/// Defined as 0 when either vector has zero magnitude. With the
/// non-negative encoding used here the result is always in `[0, 1]`, and a
/// vector is similarity 1 with itself.
///
/// # Examples
///
/// ```
/// use triago_engine::predictor::cosine_similarity;
///
/// let v = [3.0, 1.0, 0.0, 1.0];
/// assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
/// assert_eq!(cosine_similarity(&v, &[0.0; 4]), 0.0);
/// ```
pub fn cosine_similarity(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Confidence from neighbor dispersion: low coefficient of variation means
/// the neighbors agree, so the estimate earns more trust.
fn dispersion_confidence(times: &[f64]) -> f64 {
    let mean = times.iter().sum::<f64>() / times.len().max(1) as f64;
    let cv = if mean > 0.0 {
        let variance =
            times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / times.len().max(1) as f64;
        variance.sqrt() / mean
    } else {
        0.0
    };
    (1.0 - cv / 2.0).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

fn build_factors(severity: Severity, neighbors: usize, confidence: f64, value: i64) -> Vec<String> {
    let mut factors = Vec::new();

    match severity {
        Severity::Critical => {
            factors.push("Critical severity issues are typically fast-tracked".into());
        }
        Severity::High => {
            factors.push("High severity issues receive prioritized attention".into());
        }
        _ => {}
    }

    factors.push(format!("Based on {neighbors} similar resolved issues"));

    if confidence > HIGH_CONFIDENCE {
        factors.push("Similar issues resolved in consistent timeframes".into());
    } else if confidence > MODERATE_CONFIDENCE {
        factors.push("Moderate variance among similar issues".into());
    } else {
        factors.push("Wide variance among similar issues; treat as a rough estimate".into());
    }

    if value < QUICK_FIX_HOURS {
        factors.push("Expected to be a quick fix".into());
    } else if value > COMPLEX_FIX_HOURS {
        factors.push("Likely a complex fix requiring sustained work".into());
    }

    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(severity: Severity) -> PredictionRequest {
        PredictionRequest {
            severity,
            project_id: 1,
            assigned_to: Some(100),
            feature_id: Some(10),
        }
    }

    fn resolved(
        id: i64,
        severity: Severity,
        project_id: i64,
        assigned_to: Option<i64>,
        feature_id: Option<i64>,
        hours: f64,
    ) -> Issue {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        Issue {
            id,
            title: format!("issue {id}"),
            severity,
            status: IssueStatus::Resolved,
            is_recurring: false,
            resolution_time: Some(hours),
            fix_quality: Some(4),
            created_at: created,
            resolved_at: Some(created + Duration::hours(hours as i64)),
            project_id,
            feature_id,
            assigned_to,
        }
    }

    #[test]
    fn sparse_history_returns_severity_baseline() {
        let history: Vec<Issue> = (0..9)
            .map(|i| resolved(i, Severity::High, 1, Some(100), Some(10), 24.0))
            .collect();
        let p = predict_from_history(&request(Severity::Critical), &history);
        assert_eq!(p.value, 12);
        assert_eq!(p.confidence, 0.3);
        assert_eq!(p.factors.len(), 1);
    }

    #[test]
    fn baseline_hours_per_severity() {
        assert_eq!(severity_baseline(Severity::Critical), 12);
        assert_eq!(severity_baseline(Severity::High), 24);
        assert_eq!(severity_baseline(Severity::Medium), 48);
        assert_eq!(severity_baseline(Severity::Low), 72);
    }

    #[test]
    fn uniform_history_predicts_the_common_time() {
        let history: Vec<Issue> = (0..12)
            .map(|i| resolved(i, Severity::High, 1, Some(100), Some(10), 20.0))
            .collect();
        let p = predict_from_history(&request(Severity::High), &history);
        assert_eq!(p.value, 20);
        // identical neighbor times give zero dispersion, so the ceiling
        assert_eq!(p.confidence, 0.95);
    }

    #[test]
    fn closer_matches_dominate_the_average() {
        // ten perfect matches at 10h, ten weak matches at 100h
        let mut history: Vec<Issue> = (0..10)
            .map(|i| resolved(i, Severity::High, 1, Some(100), Some(10), 10.0))
            .collect();
        history.extend((10..20).map(|i| resolved(i, Severity::Low, 2, None, None, 100.0)));

        let p = predict_from_history(&request(Severity::High), &history);
        // the neighbor set is exactly the ten perfect matches
        assert_eq!(p.value, 10);
    }

    #[test]
    fn dispersed_neighbors_lower_confidence() {
        let history: Vec<Issue> = (0..10)
            .map(|i| {
                let hours = if i == 0 { 500.0 } else { 1.0 };
                resolved(i, Severity::High, 1, Some(100), Some(10), hours)
            })
            .collect();
        let p = predict_from_history(&request(Severity::High), &history);
        // one extreme outlier pushes cv well past 1.2, bottoming out at the floor
        assert_eq!(p.confidence, 0.4);
    }

    #[test]
    fn factors_mention_neighbor_count_and_severity() {
        let history: Vec<Issue> = (0..15)
            .map(|i| resolved(i, Severity::Critical, 1, Some(100), Some(10), 10.0))
            .collect();
        let p = predict_from_history(&request(Severity::Critical), &history);
        assert!(p
            .factors
            .iter()
            .any(|f| f.contains("10 similar resolved issues")));
        assert!(p.factors.iter().any(|f| f.contains("Critical")));
        assert!(p.factors.iter().any(|f| f.contains("quick fix")));
    }

    #[test]
    fn long_estimates_are_flagged_complex() {
        let history: Vec<Issue> = (0..10)
            .map(|i| resolved(i, Severity::Low, 1, Some(100), Some(10), 90.0))
            .collect();
        let p = predict_from_history(&request(Severity::Low), &history);
        assert!(p.value > COMPLEX_FIX_HOURS);
        assert!(p.factors.iter().any(|f| f.contains("complex")));
    }

    #[test]
    fn cosine_is_zero_for_zero_magnitude() {
        assert_eq!(cosine_similarity(&[0.0; 4], &[1.0, 1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0, 0.0], &[0.0; 4]), 0.0);
    }

    #[test]
    fn cosine_self_similarity_is_one() {
        let v = [4.0, 1.0, 1.0, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn confidence_clamps_to_documented_bounds() {
        assert_eq!(dispersion_confidence(&[10.0, 10.0, 10.0]), 0.95);
        // wildly dispersed: cv well over 1.2
        assert_eq!(dispersion_confidence(&[1.0, 1.0, 500.0]), 0.4);
    }

    proptest::proptest! {
        #[test]
        fn cosine_stays_in_unit_interval(
            a in proptest::collection::vec(0.0f64..10.0, 4),
            b in proptest::collection::vec(0.0f64..10.0, 4),
        ) {
            let a: [f64; 4] = a.try_into().unwrap();
            let b: [f64; 4] = b.try_into().unwrap();
            let sim = cosine_similarity(&a, &b);
            proptest::prop_assert!((0.0..=1.0 + 1e-12).contains(&sim));
        }

        #[test]
        fn confidence_stays_in_documented_bounds(
            times in proptest::collection::vec(0.1f64..1000.0, 1..40),
        ) {
            let c = dispersion_confidence(&times);
            proptest::prop_assert!((0.4..=0.95).contains(&c));
        }
    }
}
