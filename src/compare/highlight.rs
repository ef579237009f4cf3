use crate::compare::table::{Comparison, Mark, Row, StatContext};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

use Polarity::{HigherIsBetter as Higher, LowerIsBetter as Lower};

/// Labels whose meaning flips for pitchers (hits, walks and homers allowed).
const PITCHING: &[(&str, Polarity)] = &[
    ("W", Higher),
    ("L", Lower),
    ("GS", Higher),
    ("CG", Higher),
    ("SHO", Higher),
    ("SV", Higher),
    ("IP", Higher),
    ("H", Lower),
    ("ER", Lower),
    ("HR", Lower),
    ("BB", Lower),
    ("SO", Higher),
    ("ERA", Lower),
    ("WHIP", Lower),
    ("RA", Lower),
    ("K/9", Higher),
    ("BB/9", Lower),
];

const SHARED: &[(&str, Polarity)] = &[
    ("WAR", Higher),
    ("G", Higher),
    ("PA", Higher),
    ("H", Higher),
    ("R", Higher),
    ("HR", Higher),
    ("RBI", Higher),
    ("SB", Higher),
    ("BB", Higher),
    ("SO", Lower),
    ("BA", Higher),
    ("OBP", Higher),
    ("SLG", Higher),
    ("OPS", Higher),
    ("OPS+", Higher),
    ("World Series Titles", Higher),
    ("MVP", Higher),
    ("Cy Young", Higher),
    ("Rookie of the Year", Higher),
    ("World Series MVP", Higher),
    ("All-Star", Higher),
    ("Gold Glove", Higher),
    ("Silver Slugger", Higher),
    ("Reliever of the Year", Higher),
    ("Award", Higher),
    ("Trophy", Higher),
];

const PITCHER_LOOKUP: &[&[(&str, Polarity)]] = &[PITCHING, SHARED];
const HITTER_LOOKUP: &[&[(&str, Polarity)]] = &[SHARED];

/// Mark the better value of every stat row, or both values when tied.
///
/// Rows whose label has no known polarity, or whose values do not parse as
/// numbers, are left unmarked. Running it twice gives the same result.
pub fn highlight(comparison: &mut Comparison) {
    let context = comparison.context;
    for row in &mut comparison.rows {
        let Row::Stat { left, label, right } = row else {
            continue;
        };
        left.mark = None;
        right.mark = None;

        let Some(polarity) = polarity_for(label, context) else {
            debug!("no polarity for stat label {label:?}");
            continue;
        };
        let (Some(a), Some(b)) = (parse_display(&left.text), parse_display(&right.text)) else {
            continue;
        };

        if a == b {
            left.mark = Some(Mark::Tied);
            right.mark = Some(Mark::Tied);
        } else {
            let left_wins = match polarity {
                Polarity::HigherIsBetter => a > b,
                Polarity::LowerIsBetter => a < b,
            };
            if left_wins {
                left.mark = Some(Mark::Better);
            } else {
                right.mark = Some(Mark::Better);
            }
        }
    }
}

/// Exact lookup first (pitching table before the shared one when comparing
/// pitchers), then the longest key found as a whole word in the label.
pub fn polarity_for(label: &str, context: StatContext) -> Option<Polarity> {
    let label = strip_markup(label);
    let tables = match context {
        StatContext::Pitching => PITCHER_LOOKUP,
        StatContext::Hitting => HITTER_LOOKUP,
    };

    for table in tables {
        if let Some((_, p)) = table.iter().find(|(key, _)| *key == label) {
            return Some(*p);
        }
    }

    // Single letters would match almost any label.
    tables
        .iter()
        .flat_map(|t| t.iter())
        .filter(|(key, _)| key.len() > 1)
        .filter(|(key, _)| contains_word(&label, key) || contains_word(key, &label))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, p)| *p)
}

fn strip_markup(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_tag = false;
    for c in label.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            '*' => {}
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Case-insensitive substring match that must start and end on a word edge.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();
    let is_word = |c: Option<char>| c.is_some_and(char::is_alphanumeric);

    haystack.match_indices(&needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !is_word(before) && !is_word(after)
    })
}

/// Cell text as a number: thousands separators dropped, `.287` accepted.
pub fn parse_display(text: &str) -> Option<f64> {
    text.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
