//! Feature defect-risk scoring and trend classification.
//!
//! Scores every feature with at least one filed issue on a weighted blend
//! of bug density, recurrence, severity mix, and open backlog, classifies
//! its 30-day issue-volume trend, and attaches a recommendation from a
//! fixed priority ladder. Recurrence and critical severity dominate raw
//! frequency in the weighting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use triago_core::{Feature, FeatureId, Issue, IssueStatus, Severity};
use triago_store::{HistoryStore, IssueFilter};

/// Risk weight per bug-per-day of feature age.
const DENSITY_WEIGHT: f64 = 10.0;
/// Risk weight for the recurring share of bugs.
const RECURRING_WEIGHT: f64 = 30.0;
/// Risk weight per critical bug.
const CRITICAL_WEIGHT: f64 = 15.0;
/// Risk weight per high-severity bug.
const HIGH_WEIGHT: f64 = 8.0;
/// Risk weight for the open share of bugs.
const OPEN_RATIO_WEIGHT: f64 = 20.0;
/// Features below this rounded score are noise unless they have critical bugs.
const NOISE_SCORE_FLOOR: u32 = 15;
/// Length of each trend comparison window.
const TREND_WINDOW_DAYS: i64 = 30;
/// Recent volume must exceed previous by this ratio to count as rising.
const TREND_RISING_RATIO: f64 = 1.2;
/// Recent volume must fall below previous by this ratio to count as falling.
const TREND_FALLING_RATIO: f64 = 0.8;
/// Recommendation ladder thresholds.
const URGENT_CRITICAL_COUNT: usize = 3;
const REFACTOR_RISK: u32 = 70;
const REVIEW_RISK: u32 = 60;
const ROOT_CAUSE_RECURRING_RATE: f64 = 0.4;
const MONITOR_RISK: u32 = 40;

/// Direction of a feature's issue volume over the last two 30-day windows.
///
/// # Examples
///
/// ```
/// use triago_engine::hotspots::Trend;
///
/// let t: Trend = serde_json::from_str("\"increasing\"").unwrap();
/// assert_eq!(t, Trend::Increasing);
/// assert_eq!(t.to_string(), "increasing");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Issue volume rising beyond the 1.2× threshold.
    Increasing,
    /// Issue volume within the stable band.
    Stable,
    /// Issue volume falling below the 0.8× threshold.
    Decreasing,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Stable => write!(f, "stable"),
            Trend::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// Kind of entity a hotspot record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    /// A product feature.
    Feature,
}

/// A feature flagged as a defect hotspot.
///
/// # Examples
///
/// ```
/// use triago_engine::hotspots::{FeatureHotspot, HotspotKind, Trend};
///
/// let h = FeatureHotspot {
///     id: 7,
///     name: "checkout".into(),
///     kind: HotspotKind::Feature,
///     bug_count: 5,
///     bug_density: 0.5,
///     recurring_rate: 0.4,
///     critical_count: 1,
///     risk_score: 44,
///     trend: Trend::Stable,
///     recommendation: "High priority: critical bugs need attention".into(),
/// };
/// assert!(h.risk_score <= 100);
///
/// let json = serde_json::to_value(&h).unwrap();
/// assert_eq!(json["type"], "feature");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureHotspot {
    /// Feature id.
    pub id: FeatureId,
    /// Feature display name.
    pub name: String,
    /// Entity kind, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: HotspotKind,
    /// Total issues filed against the feature, any status.
    pub bug_count: usize,
    /// Bugs per day of feature age.
    pub bug_density: f64,
    /// Share of bugs marked recurring.
    pub recurring_rate: f64,
    /// Critical-severity bugs, any status.
    pub critical_count: usize,
    /// Weighted risk in `[0, 100]`, rounded.
    pub risk_score: u32,
    /// 30-day issue-volume trend.
    pub trend: Trend,
    /// Action suggested by the priority ladder.
    pub recommendation: String,
}

/// Score every feature and return hotspots sorted by risk, highest first.
///
/// Only features whose rounded risk exceeds the noise floor, or which have
/// at least one critical bug, are returned. Always returns a structurally
/// valid list: a failed feature or issue query is logged and yields an
/// empty result; a failed trend query degrades that feature to
/// [`Trend::Stable`].
///
/// # Examples
///
/// ```no_run
/// use chrono::Utc;
/// use triago_engine::hotspots::detect_hotspots;
/// use triago_store::{MemoryStore, Snapshot};
///
/// # async fn example() {
/// let store = MemoryStore::new(Snapshot::default());
/// let hotspots = detect_hotspots(&store, Utc::now()).await;
/// for h in &hotspots {
///     println!("{}: risk={} trend={}", h.name, h.risk_score, h.trend);
/// }
/// # }
/// ```
pub async fn detect_hotspots(store: &dyn HistoryStore, now: DateTime<Utc>) -> Vec<FeatureHotspot> {
    match detect_inner(store, now).await {
        Ok(hotspots) => hotspots,
        Err(err) => {
            tracing::warn!(error = %err, "hotspot query failed; returning no hotspots");
            Vec::new()
        }
    }
}

async fn detect_inner(
    store: &dyn HistoryStore,
    now: DateTime<Utc>,
) -> triago_core::Result<Vec<FeatureHotspot>> {
    let features = store.find_features().await?;
    let mut hotspots = Vec::new();

    for feature in &features {
        let issues = store
            .find_issues(&IssueFilter {
                feature_id: Some(feature.id),
                ..IssueFilter::default()
            })
            .await?;

        let Some(scored) = score_feature(feature, &issues, now) else {
            continue;
        };

        let trend = classify_trend(store, feature.id, now).await;
        hotspots.push(FeatureHotspot {
            id: feature.id,
            name: feature.name.clone(),
            kind: HotspotKind::Feature,
            bug_count: scored.bug_count,
            bug_density: scored.bug_density,
            recurring_rate: scored.recurring_rate,
            critical_count: scored.critical_count,
            risk_score: scored.risk_score,
            recommendation: recommend(&scored, trend),
            trend,
        });
    }

    hotspots.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    Ok(hotspots)
}

/// Per-feature counters and the derived risk score.
struct ScoredFeature {
    bug_count: usize,
    bug_density: f64,
    recurring_rate: f64,
    critical_count: usize,
    risk_score: u32,
}

/// Compute risk components for one feature. Returns `None` for features with
/// no issues or below the noise gate.
fn score_feature(feature: &Feature, issues: &[Issue], now: DateTime<Utc>) -> Option<ScoredFeature> {
    if issues.is_empty() {
        return None;
    }

    let bug_count = issues.len();
    let recurring_count = issues.iter().filter(|i| i.is_recurring).count();
    let critical_count = issues
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .count();
    let high_count = issues
        .iter()
        .filter(|i| i.severity == Severity::High)
        .count();
    let open_count = issues
        .iter()
        .filter(|i| i.status == IssueStatus::Open)
        .count();

    let age_days = (now - feature.created_at).num_days().max(1) as f64;
    let bug_density = bug_count as f64 / age_days;
    let recurring_rate = recurring_count as f64 / bug_count as f64;
    let open_ratio = open_count as f64 / bug_count as f64;

    let raw = bug_density * DENSITY_WEIGHT
        + recurring_rate * RECURRING_WEIGHT
        + critical_count as f64 * CRITICAL_WEIGHT
        + high_count as f64 * HIGH_WEIGHT
        + open_ratio * OPEN_RATIO_WEIGHT;
    let risk_score = raw.clamp(0.0, 100.0).round() as u32;

    if risk_score <= NOISE_SCORE_FLOOR && critical_count == 0 {
        return None;
    }

    Some(ScoredFeature {
        bug_count,
        bug_density,
        recurring_rate,
        critical_count,
        risk_score,
    })
}

/// Compare issue volume across the two most recent 30-day windows. A query
/// failure degrades to [`Trend::Stable`] rather than dropping the feature.
async fn classify_trend(store: &dyn HistoryStore, feature_id: FeatureId, now: DateTime<Utc>) -> Trend {
    let window = Duration::days(TREND_WINDOW_DAYS);

    let recent_filter = IssueFilter {
        feature_id: Some(feature_id),
        created_after: Some(now - window),
        ..IssueFilter::default()
    };
    let previous_filter = IssueFilter {
        feature_id: Some(feature_id),
        created_after: Some(now - window - window),
        created_before: Some(now - window),
        ..IssueFilter::default()
    };

    let recent = store.count_issues(&recent_filter).await;
    let previous = store.count_issues(&previous_filter).await;

    match (recent, previous) {
        (Ok(recent), Ok(previous)) => trend_from_counts(recent, previous),
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(error = %err, feature_id, "trend query failed; assuming stable");
            Trend::Stable
        }
    }
}

/// Strict-inequality thresholds: exactly 1.2× or 0.8× is stable.
fn trend_from_counts(recent: usize, previous: usize) -> Trend {
    let recent = recent as f64;
    let previous = previous as f64;
    if recent > previous * TREND_RISING_RATIO {
        Trend::Increasing
    } else if recent < previous * TREND_FALLING_RATIO {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Fixed priority ladder; the first matching rung wins.
fn recommend(scored: &ScoredFeature, trend: Trend) -> String {
    if scored.critical_count >= URGENT_CRITICAL_COUNT {
        "Urgent: multiple critical bugs, needs immediate review and stabilization".into()
    } else if scored.critical_count > 0 {
        "High priority: critical bugs need attention".into()
    } else if scored.risk_score > REFACTOR_RISK && trend == Trend::Increasing {
        "Refactor candidate: rising defect rate, add regression tests".into()
    } else if scored.risk_score > REVIEW_RISK {
        "Schedule a code review for this feature".into()
    } else if scored.recurring_rate > ROOT_CAUSE_RECURRING_RATE {
        "Recurring bugs suggest a root-cause analysis".into()
    } else if scored.risk_score > MONITOR_RISK {
        "Monitor this feature closely".into()
    } else if trend == Trend::Increasing {
        "Review recent changes; issue volume is rising".into()
    } else {
        "Acceptable risk level, continue monitoring".into()
    }
}
