use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chart palette used for experience-level slices, in rank order.
///
/// Color assignment is positional: slot `i` always gets `LEVEL_PALETTE[i % 6]`
/// regardless of the level's name, so colors stay stable across refreshes and
/// cycle for long lists.
pub const LEVEL_PALETTE: [&str; 6] = [
    "#7C3AED", // violet
    "#2563EB", // blue
    "#16A34A", // green
    "#F59E0B", // amber
    "#F97316", // orange
    "#EF4444", // red
];

/// Palette color for a positional index (wraps around).
#[inline]
pub fn palette_color(idx: usize) -> &'static str {
    LEVEL_PALETTE[idx % LEVEL_PALETTE.len()]
}

/// Placeholder used whenever a category name is absent or unusable.
pub const NAME_PLACEHOLDER: &str = "-";

/// Raw payload returned by `GET /api/market-trends`, kept as loose JSON.
///
/// The service gives no shape guarantees: `skills` is nominally a list of
/// `[name, count, percent]` tuples and `levels` a list of objects with
/// `name`/`level_name` and `count`, but any field may be missing, null, or of
/// the wrong type. Fields are only tightened by [`normalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMarketPayload {
    #[serde(default)]
    pub skills: Value,
    #[serde(default)]
    pub levels: Value,
    #[serde(default)]
    pub total_jobs: Value,
}

/// One skill with its job count and share of all jobs, ready for charting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillStat {
    pub name: String,
    pub count: u64,
    /// Share of jobs in percent. Nominally in `[0, 100]`; out-of-range values
    /// pass through untouched and are clipped by the chart's fixed domain.
    pub percent: f64,
}

/// One experience level with its job count and palette-assigned color.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelStat {
    pub name: String,
    pub count: u64,
    /// Hex color token like `#2563EB`, assigned by position.
    pub color: String,
}

/// Strict, chart-ready market model. `skills` and `levels` keep the payload's
/// rank order; nothing is re-sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketChartModel {
    pub skills: Vec<SkillStat>,
    pub levels: Vec<LevelStat>,
    pub total_jobs: u64,
}

/// Coercion law: JSON value to `f64`, defaulting to 0.
///
/// Numbers pass through, numeric strings parse, booleans map to 0/1,
/// everything else (null, arrays, objects, junk strings) becomes 0.0.
pub fn num_or_zero(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

/// Coercion law: JSON value to a non-negative integer count, defaulting to 0.
/// Fractions truncate; negative and non-finite values floor at 0.
pub fn count_or_zero(v: &Value) -> u64 {
    let n = num_or_zero(v);
    if n.is_finite() && n > 0.0 { n as u64 } else { 0 }
}

/// Coercion law: JSON value to a display name, defaulting to [`NAME_PLACEHOLDER`].
/// Non-empty strings pass through; numbers render as decimal text (the service
/// occasionally emits numeric labels); everything else becomes `"-"`.
pub fn name_or_placeholder(v: &Value) -> String {
    match v {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => NAME_PLACEHOLDER.to_string(),
    }
}

fn skill_from_raw(item: &Value) -> SkillStat {
    // A well-formed item is a [name, count, percent] tuple; anything else
    // degrades field by field.
    let tuple = item.as_array().map(Vec::as_slice).unwrap_or(&[]);
    let field = |i: usize| tuple.get(i).unwrap_or(&Value::Null);
    SkillStat {
        name: name_or_placeholder(field(0)),
        count: count_or_zero(field(1)),
        percent: num_or_zero(field(2)),
    }
}

fn level_from_raw(item: &Value, idx: usize) -> LevelStat {
    // `name` wins, `level_name` is the service's legacy spelling.
    let name_field = match item.get("name") {
        Some(v @ Value::String(s)) if !s.trim().is_empty() => v,
        _ => item.get("level_name").unwrap_or(&Value::Null),
    };
    LevelStat {
        name: name_or_placeholder(name_field),
        count: count_or_zero(item.get("count").unwrap_or(&Value::Null)),
        color: palette_color(idx).to_string(),
    }
}

/// Normalize a raw trends payload into a strict [`MarketChartModel`].
///
/// Total and pure: never fails, has no side effects, and the same input
/// always produces the same model. Missing or malformed fields degrade to
/// safe defaults (absent lists become empty, non-numeric counts become 0,
/// absent names become `"-"`); input order is preserved.
pub fn normalize(raw: &RawMarketPayload) -> MarketChartModel {
    let skills = raw
        .skills
        .as_array()
        .map(|items| items.iter().map(skill_from_raw).collect())
        .unwrap_or_default();

    let levels = raw
        .levels
        .as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| level_from_raw(item, idx))
                .collect()
        })
        .unwrap_or_default();

    MarketChartModel {
        skills,
        levels,
        total_jobs: count_or_zero(&raw.total_jobs),
    }
}

impl From<RawMarketPayload> for MarketChartModel {
    fn from(raw: RawMarketPayload) -> Self {
        normalize(&raw)
    }
}

/// Recommendation text blocks produced by the analysis endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(default)]
    pub opening: String,
    #[serde(default)]
    pub cv_review_title: String,
    #[serde(default)]
    pub cv_review_points: Vec<String>,
    #[serde(default)]
    pub gap_analysis_intro: String,
    #[serde(default)]
    pub closing: String,
}

/// Skill breakdown attached to an analysis result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisDetails {
    #[serde(default)]
    pub cv_skills: Vec<String>,
    #[serde(default)]
    pub market_gaps: Vec<String>,
}

/// One job posting matched against the CV.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobMatch {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub match_percentage: Option<f64>,
}

/// Full response of `POST /api/analyze-cv`. The upstream service is opaque,
/// so every field is defaulted rather than required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    #[serde(default)]
    pub recommendation: Recommendation,
    #[serde(default)]
    pub analysis_details: AnalysisDetails,
    #[serde(default)]
    pub top_jobs: Vec<JobMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn num_or_zero_covers_all_value_kinds() {
        assert_eq!(num_or_zero(&json!(58)), 58.0);
        assert_eq!(num_or_zero(&json!(-5)), -5.0);
        assert_eq!(num_or_zero(&json!("42.5")), 42.5);
        assert_eq!(num_or_zero(&json!("x")), 0.0);
        assert_eq!(num_or_zero(&json!(true)), 1.0);
        assert_eq!(num_or_zero(&Value::Null), 0.0);
        assert_eq!(num_or_zero(&json!([1, 2])), 0.0);
        assert_eq!(num_or_zero(&json!({"a": 1})), 0.0);
    }

    #[test]
    fn count_or_zero_floors_and_truncates() {
        assert_eq!(count_or_zero(&json!(10)), 10);
        assert_eq!(count_or_zero(&json!(3.9)), 3);
        assert_eq!(count_or_zero(&json!(-4)), 0);
        assert_eq!(count_or_zero(&json!("7")), 7);
        assert_eq!(count_or_zero(&Value::Null), 0);
    }

    #[test]
    fn name_or_placeholder_keeps_text_and_numbers() {
        assert_eq!(name_or_placeholder(&json!("Python")), "Python");
        assert_eq!(name_or_placeholder(&json!(7)), "7");
        assert_eq!(name_or_placeholder(&json!("")), "-");
        assert_eq!(name_or_placeholder(&json!("   ")), "-");
        assert_eq!(name_or_placeholder(&Value::Null), "-");
    }
}
