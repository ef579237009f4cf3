use crate::app::MenuItem;
use crate::compare::Comparison;
use crate::state::autofill::AutofillController;
use crate::state::messages::Side;
use crate::state::modal::ModalState;
use dugout_api::{TeamStatType, ViewMode};

// ---------------------------------------------------------------------------
// Player comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerFocus {
    Input(Side),
    View,
}

impl Default for PlayerFocus {
    fn default() -> Self {
        PlayerFocus::Input(Side::A)
    }
}

impl PlayerFocus {
    pub fn next(self) -> Self {
        match self {
            PlayerFocus::Input(Side::A) => PlayerFocus::Input(Side::B),
            PlayerFocus::Input(Side::B) => PlayerFocus::View,
            PlayerFocus::View => PlayerFocus::Input(Side::A),
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PlayerFocus::Input(Side::A) => PlayerFocus::View,
            PlayerFocus::Input(Side::B) => PlayerFocus::Input(Side::A),
            PlayerFocus::View => PlayerFocus::Input(Side::B),
        }
    }
}

/// Generation counter for request/response pairing. Only the newest
/// request's answer is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generation(u64);

impl Generation {
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

#[derive(Debug, Default)]
pub struct PlayerCompareState {
    pub inputs: [String; 2],
    pub view: ViewMode,
    pub focus: PlayerFocus,
    pub generation: Generation,
    pub comparison: Option<Comparison>,
    /// Local time of the last applied comparison, e.g. "14:03:27".
    pub compared_at: Option<String>,
    pub scroll_offset: u16,
}

impl PlayerCompareState {
    pub fn input(&self, side: Side) -> &str {
        &self.inputs[side.index()]
    }

    pub fn input_mut(&mut self, side: Side) -> &mut String {
        &mut self.inputs[side.index()]
    }

    pub fn focused_side(&self) -> Option<Side> {
        match self.focus {
            PlayerFocus::Input(side) => Some(side),
            PlayerFocus::View => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Team comparison
// ---------------------------------------------------------------------------

/// Team stats only come as aggregates.
pub const TEAM_VIEWS: [ViewMode; 3] = [ViewMode::Career, ViewMode::Combined, ViewMode::Live];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TeamFocus {
    #[default]
    InputA,
    InputB,
    View,
    StatType,
}

impl TeamFocus {
    pub fn next(self) -> Self {
        match self {
            TeamFocus::InputA => TeamFocus::InputB,
            TeamFocus::InputB => TeamFocus::View,
            TeamFocus::View => TeamFocus::StatType,
            TeamFocus::StatType => TeamFocus::InputA,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            TeamFocus::InputA => TeamFocus::StatType,
            TeamFocus::InputB => TeamFocus::InputA,
            TeamFocus::View => TeamFocus::InputB,
            TeamFocus::StatType => TeamFocus::View,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            TeamFocus::InputA => Some(Side::A),
            TeamFocus::InputB => Some(Side::B),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct TeamCompareState {
    pub inputs: [String; 2],
    pub view: ViewMode,
    pub stat_type: TeamStatType,
    pub focus: TeamFocus,
    pub generation: Generation,
    pub comparison: Option<Comparison>,
    pub compared_at: Option<String>,
    pub scroll_offset: u16,
}

impl Default for TeamCompareState {
    fn default() -> Self {
        Self {
            inputs: Default::default(),
            view: ViewMode::Career,
            stat_type: TeamStatType::default(),
            focus: TeamFocus::default(),
            generation: Generation::default(),
            comparison: None,
            compared_at: None,
            scroll_offset: 0,
        }
    }
}

impl TeamCompareState {
    pub fn cycle_view(&mut self, forward: bool) {
        let idx = TEAM_VIEWS.iter().position(|v| *v == self.view).unwrap_or(0);
        let len = TEAM_VIEWS.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        self.view = TEAM_VIEWS[next];
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub players: PlayerCompareState,
    pub teams: TeamCompareState,
    pub autofill: AutofillController,
    pub modals: ModalState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_focus_cycles_both_ways() {
        let mut focus = PlayerFocus::default();
        for _ in 0..3 {
            focus = focus.next();
        }
        assert_eq!(focus, PlayerFocus::Input(Side::A));
        assert_eq!(focus.prev(), PlayerFocus::View);
    }

    #[test]
    fn generation_only_matches_latest() {
        let mut generation = Generation::default();
        let first = generation.bump();
        let second = generation.bump();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn team_view_stays_on_aggregates() {
        let mut teams = TeamCompareState::default();
        teams.cycle_view(false);
        assert_eq!(teams.view, ViewMode::Live);
        teams.cycle_view(true);
        teams.cycle_view(true);
        assert_eq!(teams.view, ViewMode::Combined);
    }
}
