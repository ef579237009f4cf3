pub mod client;
pub mod wire;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Domain types shared by the fetcher and the renderer
// ---------------------------------------------------------------------------

/// One player's (or one season's) stat object, keyed by raw stat name.
/// Values stay as loose JSON because the backend mixes ints, floats and strings.
pub type StatLine = Map<String, Value>;

/// Aggregation granularity understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Career,
    Combined,
    Live,
    Season,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Career => "career",
            Mode::Combined => "combined",
            Mode::Live => "live",
            Mode::Season => "season",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "career" => Some(Mode::Career),
            "combined" => Some(Mode::Combined),
            "live" => Some(Mode::Live),
            "season" => Some(Mode::Season),
            _ => None,
        }
    }

    /// Career, combined and live payloads carry a single aggregate object.
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, Mode::Season)
    }
}

/// What the user picks in the view selector. `Newest`/`Oldest` are season
/// views that only differ in how the year rows are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Career,
    #[default]
    Combined,
    Live,
    Season,
    Newest,
    Oldest,
}

impl ViewMode {
    pub const ALL: [ViewMode; 6] = [
        ViewMode::Career,
        ViewMode::Combined,
        ViewMode::Live,
        ViewMode::Season,
        ViewMode::Newest,
        ViewMode::Oldest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Career => "career",
            ViewMode::Combined => "combined",
            ViewMode::Live => "live",
            ViewMode::Season => "season",
            ViewMode::Newest => "newest",
            ViewMode::Oldest => "oldest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Career => "Career",
            ViewMode::Combined => "Career + Current",
            ViewMode::Live => "Current Season",
            ViewMode::Season => "By Season",
            ViewMode::Newest => "Seasons (Newest)",
            ViewMode::Oldest => "Seasons (Oldest)",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Mode sent to the backend; sort order is applied client-side.
    pub fn backend_mode(self) -> Mode {
        match self {
            ViewMode::Career => Mode::Career,
            ViewMode::Combined => Mode::Combined,
            ViewMode::Live => Mode::Live,
            ViewMode::Season | ViewMode::Newest | ViewMode::Oldest => Mode::Season,
        }
    }

    pub fn sort_ascending(self) -> bool {
        self == ViewMode::Oldest
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    Hitter,
    Pitcher,
}

impl PlayerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerType::Hitter => "hitter",
            PlayerType::Pitcher => "pitcher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hitter" => Some(PlayerType::Hitter),
            "pitcher" => Some(PlayerType::Pitcher),
            _ => None,
        }
    }
}

/// Body of every player endpoint, success or failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
    /// A malformed awards object is dropped on its own; the stats still load.
    #[serde(default, deserialize_with = "lenient_awards", skip_serializing_if = "Option::is_none")]
    pub awards: Option<AwardsData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Name the user picked in a selection dialog, shown instead of what was typed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_name: Option<String>,
}

/// The stat payload of a response, shaped by its mode.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsPayload<'a> {
    Aggregate(&'a StatLine),
    Seasons(Vec<&'a StatLine>),
}

impl StatsResponse {
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// The upstream error, if any. An empty string does not count.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode.as_deref().and_then(Mode::parse)
    }

    pub fn player_type(&self) -> Option<PlayerType> {
        self.player_type.as_deref().and_then(PlayerType::parse)
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo_url.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Pull the stat payload out of the response. Aggregate modes prefer
    /// `totals` and fall back to `stats` (live mode only sends the latter).
    pub fn extract_stats(&self) -> Option<StatsPayload<'_>> {
        if self.error_message().is_some() {
            return None;
        }
        match self.mode()? {
            mode if mode.is_aggregate() => self
                .totals
                .as_ref()
                .and_then(Value::as_object)
                .or_else(|| self.stats.as_ref().and_then(Value::as_object))
                .map(StatsPayload::Aggregate),
            _ => self.stats.as_ref().and_then(Value::as_array).map(|rows| {
                StatsPayload::Seasons(rows.iter().filter_map(Value::as_object).collect())
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Awards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<BTreeMap<String, AwardSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<Vec<AwardRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardSummary {
    #[serde(default, deserialize_with = "loose_count")]
    pub count: u32,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, deserialize_with = "loose_years")]
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    #[serde(default, alias = "awardID", alias = "award")]
    pub award_id: String,
    #[serde(default, alias = "name", alias = "award_name")]
    pub display_name: Option<String>,
    #[serde(default, alias = "yearID", deserialize_with = "loose_year")]
    pub year: Option<i32>,
}

impl AwardsData {
    /// The per-award summary, derived from the raw award list when the
    /// backend did not send one.
    pub fn summary(&self) -> BTreeMap<String, AwardSummary> {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }

        let mut derived: BTreeMap<String, AwardSummary> = BTreeMap::new();
        for record in self.awards.iter().flatten().filter(|r| !r.award_id.is_empty()) {
            let entry = derived
                .entry(record.award_id.clone())
                .or_insert_with(|| AwardSummary {
                    count: 0,
                    display_name: record
                        .display_name
                        .clone()
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| record.award_id.clone()),
                    years: Vec::new(),
                });
            entry.count += 1;
            if let Some(year) = record.year {
                entry.years.push(year);
            }
        }
        for entry in derived.values_mut() {
            entry.years.sort_unstable();
        }
        derived
    }

    pub fn is_empty(&self) -> bool {
        self.summary.as_ref().is_none_or(BTreeMap::is_empty)
            && self.awards.as_ref().is_none_or(Vec::is_empty)
    }
}

// ---------------------------------------------------------------------------
// Disambiguation
// ---------------------------------------------------------------------------

/// One of several players sharing the requested name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationCandidate {
    pub name: String,
    #[serde(default)]
    pub playerid: Option<String>,
    #[serde(default, deserialize_with = "year_label")]
    pub debut_year: Option<String>,
    #[serde(default, deserialize_with = "year_label")]
    pub birth_year: Option<String>,
}

impl DisambiguationCandidate {
    /// "Will Smith (debut 2019, born 1995)"
    pub fn describe(&self) -> String {
        let mut details = Vec::new();
        if let Some(debut) = &self.debut_year {
            details.push(format!("debut {debut}"));
        }
        if let Some(born) = &self.birth_year {
            details.push(format!("born {born}"));
        }
        if details.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, details.join(", "))
        }
    }
}

/// Role choice offered for players with a real career on both sides of the ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoWayOption {
    #[serde(rename = "type")]
    pub player_type: PlayerType,
    #[serde(default)]
    pub label: String,
}

impl TwoWayOption {
    pub fn describe(&self) -> &str {
        if self.label.is_empty() {
            match self.player_type {
                PlayerType::Hitter => "Hitting stats",
                PlayerType::Pitcher => "Pitching stats",
            }
        } else {
            &self.label
        }
    }
}

/// Entry in the popular-players list or a search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(default)]
    pub display: Option<String>,
}

impl Suggestion {
    pub fn shown(&self) -> &str {
        self.display
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatType {
    #[default]
    Batting,
    Pitching,
}

impl TeamStatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatType::Batting => "batting",
            TeamStatType::Pitching => "pitching",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            TeamStatType::Batting => TeamStatType::Pitching,
            TeamStatType::Pitching => TeamStatType::Batting,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStatsResponse {
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub stats: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TeamStatsResponse {
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    pub fn stat_line(&self) -> Option<&StatLine> {
        self.stats.as_ref().and_then(Value::as_object)
    }
}

/// Years arrive as numbers, numeric strings, or "Unknown".
fn year_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Integers arrive as numbers or numeric strings depending on the source table.
fn loose_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loose_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(loose_int)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default())
}

fn loose_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(loose_int).and_then(|n| i32::try_from(n).ok()))
}

fn loose_years<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(loose_int)
        .filter_map(|n| i32::try_from(n).ok())
        .collect())
}

fn lenient_awards<'de, D>(deserializer: D) -> Result<Option<AwardsData>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(awards) => Ok(Some(awards)),
        Err(e) => {
            warn!("ignoring malformed awards: {e}");
            Ok(None)
        }
    }
}
