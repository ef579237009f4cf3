//! Wire shapes for the special-status bodies and suggestion lists.
//! Stats bodies deserialize straight into `StatsResponse`.

use crate::{DisambiguationCandidate, Suggestion, TwoWayOption};
use serde::Deserialize;

/// 422 body: several players share the requested name.
#[derive(Deserialize, Default, Debug)]
pub struct SuggestionsBody {
    #[serde(default)]
    pub suggestions: Vec<DisambiguationCandidate>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 423 body: the player has a significant career as both hitter and pitcher.
#[derive(Deserialize, Default, Debug)]
pub struct OptionsBody {
    #[serde(default)]
    pub options: Vec<TwoWayOption>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Popular-player and search endpoints send either bare names or objects.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum SuggestionEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        display: Option<String>,
    },
}

impl From<SuggestionEntry> for Suggestion {
    fn from(entry: SuggestionEntry) -> Self {
        match entry {
            SuggestionEntry::Name(name) => Suggestion { name, display: None },
            SuggestionEntry::Detailed { name, display } => Suggestion { name, display },
        }
    }
}
