use crate::compare::table::{Cell, Row};
use dugout_api::{AwardSummary, AwardsData};
use std::collections::BTreeMap;

/// A fixed award row and the award ids that count toward it.
#[derive(Debug, Clone, Copy)]
pub struct AwardCategory {
    pub label: &'static str,
    codes: &'static [&'static str],
}

pub const AWARD_CATEGORIES: &[AwardCategory] = &[
    AwardCategory {
        label: "World Series Titles",
        codes: &["WS", "WSC", "WS_CHAMPION", "CHAMPIONSHIPS", "World Series Champion"],
    },
    AwardCategory {
        label: "MVP",
        codes: &["MVP", "Most Valuable Player"],
    },
    AwardCategory {
        label: "Cy Young",
        codes: &["CYA", "CY_YOUNG", "Cy Young Award"],
    },
    AwardCategory {
        label: "Rookie of the Year",
        codes: &["ROY", "Rookie of the Year"],
    },
    AwardCategory {
        label: "World Series MVP",
        codes: &["WSMVP", "WS_MVP", "World Series MVP"],
    },
    AwardCategory {
        label: "All-Star",
        codes: &["AS", "ALLSTAR", "ALL_STAR", "All-Star"],
    },
    AwardCategory {
        label: "Gold Glove",
        codes: &["GG", "GOLD_GLOVE", "Gold Glove"],
    },
    AwardCategory {
        label: "Silver Slugger",
        codes: &["SS", "SILVER_SLUGGER", "Silver Slugger"],
    },
    AwardCategory {
        label: "Reliever of the Year",
        codes: &[
            "RELIEVER",
            "RRA",
            "MRA",
            "TSN Reliever of the Year Award",
            "Rolaids Relief Man Award",
            "Reliever of the Year Award",
        ],
    },
];

impl AwardCategory {
    fn matches(&self, award_id: &str) -> bool {
        let award_id = award_id.trim();
        self.codes.iter().any(|code| code.eq_ignore_ascii_case(award_id))
    }

    fn count(&self, summary: &BTreeMap<String, AwardSummary>) -> u32 {
        summary
            .iter()
            .filter(|(id, _)| self.matches(id))
            .map(|(_, s)| s.count)
            .sum()
    }
}

fn categorised(award_id: &str) -> bool {
    AWARD_CATEGORIES.iter().any(|c| c.matches(award_id))
}

/// Award rows for two players: the fixed categories first, then any other
/// award either player holds, sorted by name. Rows where both counts are
/// zero are left out.
pub fn award_rows(a: Option<&AwardsData>, b: Option<&AwardsData>) -> Vec<Row> {
    if a.is_none_or(AwardsData::is_empty) && b.is_none_or(AwardsData::is_empty) {
        return Vec::new();
    }
    let summary_a = a.map(AwardsData::summary).unwrap_or_default();
    let summary_b = b.map(AwardsData::summary).unwrap_or_default();

    let mut rows = Vec::new();
    for category in AWARD_CATEGORIES {
        let (left, right) = (category.count(&summary_a), category.count(&summary_b));
        if left > 0 || right > 0 {
            rows.push(count_row(category.label, left, right));
        }
    }

    // Other major awards, keyed by display name so both sides line up.
    let mut others: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for (side, summary) in [(0, &summary_a), (1, &summary_b)] {
        for (award_id, entry) in summary.iter().filter(|(id, _)| !categorised(id)) {
            let name = if entry.display_name.trim().is_empty() {
                award_id.clone()
            } else {
                entry.display_name.clone()
            };
            let counts = others.entry(name).or_default();
            if side == 0 {
                counts.0 += entry.count;
            } else {
                counts.1 += entry.count;
            }
        }
    }
    for (name, (left, right)) in others {
        if left > 0 || right > 0 {
            rows.push(count_row(&name, left, right));
        }
    }
    rows
}

fn count_row(label: &str, left: u32, right: u32) -> Row {
    Row::Stat {
        left: Cell::plain(left.to_string()),
        label: label.to_string(),
        right: Cell::plain(right.to_string()),
    }
}
