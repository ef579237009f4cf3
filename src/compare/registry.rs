use dugout_api::{PlayerType, TeamStatType};

/// How a raw stat value is turned into table text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRule {
    /// One decimal place, `0.0` when empty (WAR, innings).
    Tenths,
    /// Two decimal places, `0.00` when empty (ERA, WHIP, K/9).
    Hundredths,
    /// Three decimals with the leading zero dropped, `.000` when empty.
    Rate,
    /// Three decimals, leading zero kept (team OPS).
    Thousandths,
    /// Rounded to the nearest integer (OPS+).
    WholeNumber,
    /// Shown as sent, `0` when absent.
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatDef {
    pub key: &'static str,
    pub label: &'static str,
    pub rule: FormatRule,
}

const fn stat(key: &'static str, label: &'static str, rule: FormatRule) -> StatDef {
    StatDef { key, label, rule }
}

/// Career-aggregate or season-by-season table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Aggregate,
    Season,
}

use FormatRule::{Hundredths, Rate, Raw, Tenths, Thousandths, WholeNumber};

pub const HITTER_AGGREGATE: &[StatDef] = &[
    stat("war", "WAR", Tenths),
    stat("games", "G", Raw),
    stat("plate_appearances", "PA", Raw),
    stat("hits", "H", Raw),
    stat("home_runs", "HR", Raw),
    stat("rbi", "RBI", Raw),
    stat("stolen_bases", "SB", Raw),
    stat("batting_average", "BA", Rate),
    stat("on_base_percentage", "OBP", Rate),
    stat("slugging_percentage", "SLG", Rate),
    stat("ops", "OPS", Rate),
    stat("ops_plus", "OPS+", WholeNumber),
];

pub const PITCHER_AGGREGATE: &[StatDef] = &[
    stat("war", "WAR", Tenths),
    stat("wins", "W", Raw),
    stat("losses", "L", Raw),
    stat("games", "G", Raw),
    stat("games_started", "GS", Raw),
    stat("complete_games", "CG", Raw),
    stat("shutouts", "SHO", Raw),
    stat("saves", "SV", Raw),
    stat("innings_pitched", "IP", Tenths),
    stat("hits_allowed", "H", Raw),
    stat("earned_runs", "ER", Raw),
    stat("home_runs_allowed", "HR", Raw),
    stat("walks", "BB", Raw),
    stat("strikeouts", "SO", Raw),
    stat("era", "ERA", Hundredths),
    stat("whip", "WHIP", Hundredths),
];

/// Season rows use the short rate keys and have no OPS+.
pub const HITTER_SEASON: &[StatDef] = &[
    stat("war", "WAR", Tenths),
    stat("games", "G", Raw),
    stat("pa", "PA", Raw),
    stat("hits", "H", Raw),
    stat("home_runs", "HR", Raw),
    stat("rbi", "RBI", Raw),
    stat("stolen_bases", "SB", Raw),
    stat("ba", "BA", Rate),
    stat("obp", "OBP", Rate),
    stat("slg", "SLG", Rate),
    stat("ops", "OPS", Rate),
];

pub const PITCHER_SEASON: &[StatDef] = PITCHER_AGGREGATE;

pub const TEAM_BATTING: &[StatDef] = &[
    stat("games", "G", Raw),
    stat("runs", "R", Raw),
    stat("hits", "H", Raw),
    stat("home_runs", "HR", Raw),
    stat("rbi", "RBI", Raw),
    stat("stolen_bases", "SB", Raw),
    stat("walks", "BB", Raw),
    stat("strikeouts", "SO", Raw),
    stat("batting_average", "BA", Rate),
    stat("on_base_percentage", "OBP", Rate),
    stat("slugging_percentage", "SLG", Rate),
    stat("ops", "OPS", Thousandths),
];

pub const TEAM_PITCHING: &[StatDef] = &[
    stat("wins", "W", Raw),
    stat("losses", "L", Raw),
    stat("era", "ERA", Hundredths),
    stat("whip", "WHIP", Hundredths),
    stat("innings_pitched", "IP", Tenths),
    stat("strikeouts", "SO", Raw),
    stat("walks", "BB", Raw),
    stat("saves", "SV", Raw),
    stat("shutouts", "SHO", Raw),
    stat("runs_allowed", "RA", Raw),
    stat("k9", "K/9", Hundredths),
    stat("bb9", "BB/9", Hundredths),
];

pub fn player_stats(player_type: PlayerType, granularity: Granularity) -> &'static [StatDef] {
    match (player_type, granularity) {
        (PlayerType::Hitter, Granularity::Aggregate) => HITTER_AGGREGATE,
        (PlayerType::Hitter, Granularity::Season) => HITTER_SEASON,
        (PlayerType::Pitcher, Granularity::Aggregate) => PITCHER_AGGREGATE,
        (PlayerType::Pitcher, Granularity::Season) => PITCHER_SEASON,
    }
}

pub fn team_stats(stat_type: TeamStatType) -> &'static [StatDef] {
    match stat_type {
        TeamStatType::Batting => TEAM_BATTING,
        TeamStatType::Pitching => TEAM_PITCHING,
    }
}
