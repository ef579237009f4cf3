use crate::state::debounce::Debouncer;
use crate::state::messages::Side;
use dugout_api::Suggestion;
use log::debug;

/// Queries shorter than this show the popular list instead of searching.
pub const MIN_SEARCH_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownSource {
    Popular,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dropdown {
    pub side: Side,
    pub source: DropdownSource,
    pub items: Vec<Suggestion>,
    pub selected: usize,
}

/// What the key handler should do after an input changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutofillAction {
    Nothing,
    LoadPopular,
    Search {
        side: Side,
        query: String,
        generation: u64,
    },
}

/// Suggestion dropdown for the two player inputs. Holds the popular-player
/// cache, the one open dropdown, and the pending debounced search.
#[derive(Debug, Default)]
pub struct AutofillController {
    popular: Option<Vec<Suggestion>>,
    popular_requested: bool,
    dropdown: Option<Dropdown>,
    generation: u64,
    pub debounce: Debouncer,
}

impl AutofillController {
    /// React to an edit (or focus) of one input.
    pub fn on_input(&mut self, side: Side, text: &str) -> AutofillAction {
        // Any edit makes in-flight results for older text stale.
        self.generation += 1;
        self.debounce.cancel();

        let query = text.trim();
        if query.chars().count() >= MIN_SEARCH_CHARS {
            return AutofillAction::Search {
                side,
                query: query.to_string(),
                generation: self.generation,
            };
        }

        if let Some(popular) = &self.popular {
            let items = popular.clone();
            self.show(side, DropdownSource::Popular, items);
            return AutofillAction::Nothing;
        }

        self.dropdown = Some(Dropdown {
            side,
            source: DropdownSource::Popular,
            items: Vec::new(),
            selected: 0,
        });
        if self.popular_requested {
            AutofillAction::Nothing
        } else {
            self.popular_requested = true;
            AutofillAction::LoadPopular
        }
    }

    pub fn on_popular_loaded(&mut self, players: Vec<Suggestion>) {
        debug!("cached {} popular players", players.len());
        if players.is_empty() {
            // Allow a retry on the next focus.
            self.popular_requested = false;
        } else {
            self.popular = Some(players.clone());
        }
        if let Some(d) = &self.dropdown
            && d.source == DropdownSource::Popular
        {
            let side = d.side;
            self.show(side, DropdownSource::Popular, players);
        }
    }

    /// The popular list could not be fetched; the next short input asks again.
    pub fn on_popular_failed(&mut self) {
        self.popular_requested = false;
    }

    /// Apply search results. Returns false when they belong to an older query.
    pub fn on_search_results(&mut self, side: Side, generation: u64, results: Vec<Suggestion>) -> bool {
        if generation != self.generation {
            debug!("dropping stale suggestions (generation {generation}, current {})", self.generation);
            return false;
        }
        self.show(side, DropdownSource::Search, results);
        true
    }

    pub fn dropdown(&self) -> Option<&Dropdown> {
        self.dropdown.as_ref().filter(|d| !d.items.is_empty())
    }

    pub fn is_open_for(&self, side: Side) -> bool {
        self.dropdown().is_some_and(|d| d.side == side)
    }

    pub fn select_next(&mut self) {
        if let Some(d) = self.dropdown.as_mut().filter(|d| !d.items.is_empty()) {
            d.selected = (d.selected + 1) % d.items.len();
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(d) = self.dropdown.as_mut().filter(|d| !d.items.is_empty()) {
            d.selected = (d.selected + d.items.len() - 1) % d.items.len();
        }
    }

    /// Take the highlighted suggestion and close the dropdown.
    pub fn accept(&mut self) -> Option<(Side, Suggestion)> {
        let d = self.dropdown.take()?;
        self.close();
        let side = d.side;
        d.items.into_iter().nth(d.selected).map(|s| (side, s))
    }

    /// Close the dropdown and forget any pending search.
    pub fn close(&mut self) {
        self.dropdown = None;
        self.generation += 1;
        self.debounce.cancel();
    }

    fn show(&mut self, side: Side, source: DropdownSource, items: Vec<Suggestion>) {
        self.dropdown = Some(Dropdown {
            side,
            source,
            items,
            selected: 0,
        });
    }
}
