use crate::compare::awards::award_rows;
use crate::compare::format::format_value;
use crate::compare::registry::{Granularity, StatDef, player_stats, team_stats};
use dugout_api::{
    PlayerType, StatLine, StatsPayload, StatsResponse, TeamStatType, TeamStatsResponse,
    ViewMode,
};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

pub const PLAYER_LOAD_ERROR: &str = "Error loading player data.";
pub const TEAM_LOAD_ERROR: &str = "Error loading team data.";
pub const MIXED_ROLES: &str = "Cannot compare pitcher and hitter statistics.";
pub const UNSUPPORTED_MODE: &str = "Unsupported mode for comparison";
pub const AWARDS_SECTION: &str = "Awards & Honors";

/// Which side of the game the numbers describe. Drives stat polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatContext {
    #[default]
    Hitting,
    Pitching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Better,
    Tied,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mark: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    /// Whole-table message, e.g. an upstream error.
    Message { text: String },
    /// Year divider or section title.
    Section { title: String },
    /// Player A value, stat label, player B value.
    Stat { left: Cell, label: String, right: Cell },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub headers: [Header; 2],
    pub context: StatContext,
    pub rows: Vec<Row>,
}

impl Comparison {
    fn message(headers: [Header; 2], text: impl Into<String>) -> Self {
        Self {
            headers,
            context: StatContext::default(),
            rows: vec![Row::Message { text: text.into() }],
        }
    }

    /// The message if the table is a single message row.
    pub fn message_text(&self) -> Option<&str> {
        match self.rows.as_slice() {
            [Row::Message { text }] => Some(text),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn stat_rows(&self) -> impl Iterator<Item = (&Cell, &str, &Cell)> {
        self.rows.iter().filter_map(|row| match row {
            Row::Stat { left, label, right } => Some((left, label.as_str(), right)),
            _ => None,
        })
    }
}

/// Build the player comparison table.
///
/// Either response may be missing (the fetch never produced one). The first
/// failing guard turns the whole table into one message row.
pub fn build_player_comparison(
    a: Option<&StatsResponse>,
    b: Option<&StatsResponse>,
    typed: [&str; 2],
    view: ViewMode,
) -> Comparison {
    let headers = [player_header(a, typed[0], "Player A"), player_header(b, typed[1], "Player B")];

    let (Some(a), Some(b)) = (a, b) else {
        return Comparison::message(headers, PLAYER_LOAD_ERROR);
    };
    if let Some(error) = a.error_message().or(b.error_message()) {
        return Comparison::message(headers, error);
    }
    if a.player_type() != b.player_type() {
        return Comparison::message(headers, MIXED_ROLES);
    }

    let player_type = a.player_type().unwrap_or(PlayerType::Hitter);
    let context = match player_type {
        PlayerType::Hitter => StatContext::Hitting,
        PlayerType::Pitcher => StatContext::Pitching,
    };

    let rows = match a.mode() {
        Some(mode) if mode.is_aggregate() => aggregate_rows(a, b, player_type),
        Some(_) => season_rows(a, b, player_type, view.sort_ascending()),
        None => {
            debug!("unsupported comparison mode {:?}", a.mode);
            return Comparison::message(headers, UNSUPPORTED_MODE);
        }
    };

    Comparison {
        headers,
        context,
        rows,
    }
}

/// Build the team comparison table.
pub fn build_team_comparison(
    a: Option<&TeamStatsResponse>,
    b: Option<&TeamStatsResponse>,
    typed: [&str; 2],
    stat_type: TeamStatType,
) -> Comparison {
    let headers = [team_header(a, typed[0], "Team A"), team_header(b, typed[1], "Team B")];

    let (Some(a), Some(b)) = (a, b) else {
        return Comparison::message(headers, TEAM_LOAD_ERROR);
    };
    if let Some(error) = a.error_message().or(b.error_message()) {
        return Comparison::message(headers, error);
    }

    let empty = StatLine::new();
    let rows = stat_rows(
        team_stats(stat_type),
        a.stat_line().unwrap_or(&empty),
        b.stat_line().unwrap_or(&empty),
    );
    let context = match stat_type {
        TeamStatType::Batting => StatContext::Hitting,
        TeamStatType::Pitching => StatContext::Pitching,
    };

    Comparison {
        headers,
        context,
        rows,
    }
}

fn player_header(res: Option<&StatsResponse>, typed: &str, fallback: &str) -> Header {
    let name = res
        .and_then(|r| r.selected_name.as_deref())
        .filter(|n| !n.trim().is_empty())
        .or(Some(typed.trim()).filter(|t| !t.is_empty()))
        .unwrap_or(fallback)
        .to_string();
    Header {
        name,
        photo_url: res.and_then(StatsResponse::photo).map(str::to_string),
    }
}

fn team_header(res: Option<&TeamStatsResponse>, typed: &str, fallback: &str) -> Header {
    let name = res
        .and_then(|r| r.team_name.as_deref())
        .filter(|n| !n.trim().is_empty())
        .or(Some(typed.trim()).filter(|t| !t.is_empty()))
        .unwrap_or(fallback)
        .to_string();
    Header {
        name,
        photo_url: None,
    }
}

fn aggregate_rows(a: &StatsResponse, b: &StatsResponse, player_type: PlayerType) -> Vec<Row> {
    let empty = StatLine::new();
    let line_a = aggregate(a).unwrap_or(&empty);
    let line_b = aggregate(b).unwrap_or(&empty);

    let mut rows = stat_rows(player_stats(player_type, Granularity::Aggregate), line_a, line_b);

    let awards = award_rows(a.awards.as_ref(), b.awards.as_ref());
    if !awards.is_empty() {
        rows.push(Row::Section {
            title: AWARDS_SECTION.to_string(),
        });
        rows.extend(awards);
    }
    rows
}

fn aggregate(res: &StatsResponse) -> Option<&StatLine> {
    match res.extract_stats()? {
        StatsPayload::Aggregate(line) => Some(line),
        StatsPayload::Seasons(_) => None,
    }
}

fn seasons(res: &StatsResponse) -> Vec<&StatLine> {
    match res.extract_stats() {
        Some(StatsPayload::Seasons(lines)) => lines,
        _ => Vec::new(),
    }
}

fn season_rows(
    a: &StatsResponse,
    b: &StatsResponse,
    player_type: PlayerType,
    ascending: bool,
) -> Vec<Row> {
    let seasons_a = seasons(a);
    let seasons_b = seasons(b);

    let years: BTreeSet<i64> = seasons_a
        .iter()
        .chain(seasons_b.iter())
        .filter_map(|line| year_of(line))
        .collect();
    let ordered: Vec<i64> = if ascending {
        years.into_iter().collect()
    } else {
        years.into_iter().rev().collect()
    };

    let defs = player_stats(player_type, Granularity::Season);
    let empty = StatLine::new();
    let mut rows = Vec::new();
    for year in ordered {
        rows.push(Row::Section {
            title: year.to_string(),
        });
        rows.extend(stat_rows(
            defs,
            season_for(&seasons_a, year).unwrap_or(&empty),
            season_for(&seasons_b, year).unwrap_or(&empty),
        ));
    }
    rows
}

fn season_for<'a>(lines: &[&'a StatLine], year: i64) -> Option<&'a StatLine> {
    lines.iter().copied().find(|line| year_of(line) == Some(year))
}

fn year_of(line: &StatLine) -> Option<i64> {
    match line.get("year")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn stat_rows(defs: &[StatDef], a: &StatLine, b: &StatLine) -> Vec<Row> {
    defs.iter()
        .map(|def| Row::Stat {
            left: Cell::plain(format_value(def.rule, a.get(def.key))),
            label: def.label.to_string(),
            right: Cell::plain(format_value(def.rule, b.get(def.key))),
        })
        .collect()
}
