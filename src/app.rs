use crate::compare::{self, Comparison};
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, PlayerFocus, TeamFocus};
use crate::state::autofill::AutofillAction;
use crate::state::messages::{NetworkRequest, RequestKind, Side};
use crate::state::modal::{PromptOrigin, SelectionPrompt};
use chrono::Local;
use dugout_api::{StatsResponse, Suggestion, TeamStatType, TeamStatsResponse, ViewMode};
use log::{debug, info, warn};

pub const MISSING_PLAYERS: &str = "Please enter both player names (first and last).";
pub const MISSING_TEAMS: &str = "Please enter both team names.";

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Players,
    Teams,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();

        if let Some(level) = settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        Self::with_settings(settings)
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let mut state = AppState::new();
        state.players.inputs = settings.initial_players.clone();
        state.players.view = settings.initial_view;
        Self { settings, state }
    }

    // -----------------------------------------------------------------------
    // Starting comparisons
    // -----------------------------------------------------------------------

    /// Validate the inputs and issue a new player comparison. Any result from
    /// an earlier comparison still in flight will be ignored.
    pub fn begin_player_comparison(&mut self) -> Option<NetworkRequest> {
        let players = &mut self.state.players;
        let names = [players.inputs[0].trim().to_string(), players.inputs[1].trim().to_string()];
        if names.iter().any(String::is_empty) {
            self.state.last_error = Some(MISSING_PLAYERS.to_string());
            return None;
        }
        self.state.last_error = None;
        self.state.autofill.close();
        let generation = players.generation.bump();
        info!("comparing {} and {}", names[0], names[1]);
        Some(NetworkRequest::ComparePlayers {
            generation,
            names,
            view: players.view,
        })
    }

    pub fn begin_team_comparison(&mut self) -> Option<NetworkRequest> {
        let teams = &mut self.state.teams;
        let names = [teams.inputs[0].trim().to_string(), teams.inputs[1].trim().to_string()];
        if names.iter().any(String::is_empty) {
            self.state.last_error = Some(MISSING_TEAMS.to_string());
            return None;
        }
        self.state.last_error = None;
        let generation = teams.generation.bump();
        Some(NetworkRequest::CompareTeams {
            generation,
            names,
            view: teams.view,
            stat_type: teams.stat_type,
        })
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_players_compared(
        &mut self,
        generation: u64,
        names: [String; 2],
        view: ViewMode,
        results: [StatsResponse; 2],
    ) {
        let players = &mut self.state.players;
        if !players.generation.is_current(generation) {
            debug!("dropping stale comparison (generation {generation})");
            return;
        }
        let [a, b] = &results;
        let mut comparison =
            compare::build_player_comparison(Some(a), Some(b), [&names[0], &names[1]], view);
        compare::highlight(&mut comparison);
        players.comparison = Some(comparison);
        players.compared_at = Some(Local::now().format("%H:%M:%S").to_string());
        players.scroll_offset = 0;
    }

    pub fn on_teams_compared(
        &mut self,
        generation: u64,
        names: [String; 2],
        stat_type: TeamStatType,
        results: [TeamStatsResponse; 2],
    ) {
        let teams = &mut self.state.teams;
        if !teams.generation.is_current(generation) {
            debug!("dropping stale team comparison (generation {generation})");
            return;
        }
        let [a, b] = &results;
        let mut comparison =
            compare::build_team_comparison(Some(a), Some(b), [&names[0], &names[1]], stat_type);
        compare::highlight(&mut comparison);
        teams.comparison = Some(comparison);
        teams.compared_at = Some(Local::now().format("%H:%M:%S").to_string());
        teams.scroll_offset = 0;
    }

    pub fn on_popular_loaded(&mut self, players: Vec<Suggestion>) {
        self.state.autofill.on_popular_loaded(players);
    }

    pub fn on_search_completed(&mut self, generation: u64, side: Side, results: Vec<Suggestion>) {
        // Results only matter while their input still has focus.
        if self.state.players.focused_side() != Some(side) {
            return;
        }
        self.state.autofill.on_search_results(side, generation, results);
    }

    pub fn on_selection_requested(&mut self, origin: PromptOrigin, prompt: SelectionPrompt) {
        if !self.state.players.generation.is_current(origin.generation) {
            // Dropping the prompt answers it with a cancel.
            debug!("dropping prompt from stale comparison (generation {})", origin.generation);
            return;
        }
        self.state.autofill.close();
        self.state.modals.open(origin, prompt);
    }

    pub fn on_error(&mut self, request: RequestKind, message: String) {
        match request {
            RequestKind::LoadPopular => {
                warn!("popular players unavailable: {message}");
                self.state.autofill.on_popular_failed();
            }
            _ => self.state.last_error = Some(message),
        }
    }

    // -----------------------------------------------------------------------
    // Player tab editing
    // -----------------------------------------------------------------------

    pub fn player_type_char(&mut self, c: char) -> AutofillAction {
        let Some(side) = self.state.players.focused_side() else {
            return AutofillAction::Nothing;
        };
        self.state.players.input_mut(side).push(c);
        self.refresh_suggestions(side)
    }

    pub fn player_backspace(&mut self) -> AutofillAction {
        let Some(side) = self.state.players.focused_side() else {
            return AutofillAction::Nothing;
        };
        self.state.players.input_mut(side).pop();
        self.refresh_suggestions(side)
    }

    pub fn player_clear_input(&mut self) -> AutofillAction {
        let Some(side) = self.state.players.focused_side() else {
            return AutofillAction::Nothing;
        };
        self.state.players.input_mut(side).clear();
        self.refresh_suggestions(side)
    }

    /// Move focus. Leaving an input closes its list; entering one opens it.
    pub fn player_focus(&mut self, forward: bool) -> AutofillAction {
        self.state.autofill.close();
        let players = &mut self.state.players;
        players.focus = if forward { players.focus.next() } else { players.focus.prev() };
        match players.focused_side() {
            Some(side) => self.refresh_suggestions(side),
            None => AutofillAction::Nothing,
        }
    }

    fn refresh_suggestions(&mut self, side: Side) -> AutofillAction {
        let text = self.state.players.input(side).to_string();
        self.state.autofill.on_input(side, &text)
    }

    /// Fill the input from the highlighted suggestion. Returns a comparison
    /// request when the other input already has a name.
    pub fn accept_suggestion(&mut self) -> Option<Option<NetworkRequest>> {
        let (side, suggestion) = self.state.autofill.accept()?;
        *self.state.players.input_mut(side) = suggestion.name;
        if self.state.players.input(side.other()).trim().is_empty() {
            Some(None)
        } else {
            Some(self.begin_player_comparison())
        }
    }

    /// Change the view and recompare when both names are present.
    pub fn player_cycle_view(&mut self, forward: bool) -> Option<NetworkRequest> {
        let players = &mut self.state.players;
        players.view = if forward { players.view.next() } else { players.view.prev() };
        if players.inputs.iter().any(|i| i.trim().is_empty()) {
            return None;
        }
        self.begin_player_comparison()
    }

    // -----------------------------------------------------------------------
    // Team tab editing
    // -----------------------------------------------------------------------

    pub fn team_type_char(&mut self, c: char) {
        if let Some(side) = self.state.teams.focus.side() {
            self.state.teams.inputs[side.index()].push(c);
        }
    }

    pub fn team_backspace(&mut self) {
        if let Some(side) = self.state.teams.focus.side() {
            self.state.teams.inputs[side.index()].pop();
        }
    }

    pub fn team_focus(&mut self, forward: bool) {
        let teams = &mut self.state.teams;
        teams.focus = if forward { teams.focus.next() } else { teams.focus.prev() };
    }

    /// Left/Right on the view or stat type selector, followed by a recompare.
    pub fn team_cycle_option(&mut self, forward: bool) -> Option<NetworkRequest> {
        let teams = &mut self.state.teams;
        match teams.focus {
            TeamFocus::View => teams.cycle_view(forward),
            TeamFocus::StatType => teams.stat_type = teams.stat_type.toggle(),
            TeamFocus::InputA | TeamFocus::InputB => return None,
        }
        if teams.inputs.iter().any(|i| i.trim().is_empty()) {
            return None;
        }
        self.begin_team_comparison()
    }

    // -----------------------------------------------------------------------
    // Tab management and scrolling
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        // Leaving the surface cancels open dialogs and suggestion lists.
        self.state.modals.cancel_all();
        self.state.autofill.close();
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    /// Whether keystrokes should go into a text input.
    pub fn is_typing(&self) -> bool {
        match self.state.active_tab {
            MenuItem::Players => matches!(self.state.players.focus, PlayerFocus::Input(_)),
            MenuItem::Teams => self.state.teams.focus.side().is_some(),
            MenuItem::Help => false,
        }
    }

    pub fn active_comparison(&self) -> Option<&Comparison> {
        match self.state.active_tab {
            MenuItem::Players => self.state.players.comparison.as_ref(),
            MenuItem::Teams => self.state.teams.comparison.as_ref(),
            MenuItem::Help => None,
        }
    }

    pub fn scroll_down(&mut self) {
        let max = self
            .active_comparison()
            .map_or(0, |c| c.rows.len().saturating_sub(1)) as u16;
        if let Some(offset) = self.scroll_offset_mut() {
            *offset = offset.saturating_add(1).min(max);
        }
    }

    pub fn scroll_up(&mut self) {
        if let Some(offset) = self.scroll_offset_mut() {
            *offset = offset.saturating_sub(1);
        }
    }

    fn scroll_offset_mut(&mut self) -> Option<&mut u16> {
        match self.state.active_tab {
            MenuItem::Players => Some(&mut self.state.players.scroll_offset),
            MenuItem::Teams => Some(&mut self.state.teams.scroll_offset),
            MenuItem::Help => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Mark;
    use serde_json::json;

    fn app() -> App {
        App::with_settings(AppSettings::default())
    }

    fn hitter(war: f64) -> StatsResponse {
        serde_json::from_value(json!({
            "mode": "career",
            "player_type": "hitter",
            "totals": {"war": war}
        }))
        .unwrap()
    }

    #[test]
    fn starts_with_configured_players() {
        let mut app = app();
        let Some(NetworkRequest::ComparePlayers { names, view, generation }) = app.begin_player_comparison()
        else {
            panic!("expected a comparison request");
        };
        assert_eq!(names, ["Mike Trout", "Kyle Tucker"]);
        assert_eq!(view, ViewMode::Combined);
        assert_eq!(generation, 1);
    }

    #[test]
    fn missing_name_blocks_comparison() {
        let mut app = app();
        app.state.players.inputs[1] = "  ".into();
        assert!(app.begin_player_comparison().is_none());
        assert_eq!(app.state.last_error.as_deref(), Some(MISSING_PLAYERS));
    }

    #[test]
    fn stale_comparison_is_dropped() {
        let mut app = app();
        let Some(NetworkRequest::ComparePlayers { generation: old, .. }) = app.begin_player_comparison() else {
            panic!("expected request");
        };
        let Some(NetworkRequest::ComparePlayers { generation: new, names, view }) = app.begin_player_comparison()
        else {
            panic!("expected request");
        };

        app.on_players_compared(old, names.clone(), view, [hitter(1.0), hitter(2.0)]);
        assert!(app.state.players.comparison.is_none());

        app.on_players_compared(new, names, view, [hitter(3.2), hitter(5.1)]);
        let comparison = app.state.players.comparison.as_ref().unwrap();
        let (left, label, right) = comparison.stat_rows().next().unwrap();
        assert_eq!(label, "WAR");
        assert_eq!((left.mark, right.mark), (None, Some(Mark::Better)));
        assert!(app.state.players.compared_at.is_some());
    }

    #[test]
    fn accepting_a_suggestion_fills_input_and_compares() {
        let mut app = app();
        app.state.players.inputs[0].clear();
        let action = app.player_type_char('t');
        assert_eq!(action, AutofillAction::LoadPopular);
        app.on_popular_loaded(vec![Suggestion {
            name: "Mike Trout".into(),
            display: Some("Mike Trout (2011-2025)".into()),
        }]);

        let request = app.accept_suggestion().expect("a suggestion was open");
        assert_eq!(app.state.players.inputs[0], "Mike Trout");
        assert!(matches!(request, Some(NetworkRequest::ComparePlayers { .. })));
    }

    #[test]
    fn popular_list_is_requested_again_after_a_failure() {
        let mut app = app();
        app.state.players.inputs[0].clear();
        assert_eq!(app.player_type_char('t'), AutofillAction::LoadPopular);
        app.on_error(RequestKind::LoadPopular, "connection refused".into());

        assert_eq!(app.state.last_error, None);
        assert_eq!(app.player_backspace(), AutofillAction::LoadPopular);
    }

    #[test]
    fn failed_comparison_surfaces_its_error() {
        let mut app = app();
        app.on_error(RequestKind::CompareTeams, "timed out".into());
        assert_eq!(app.state.last_error.as_deref(), Some("timed out"));
    }

    #[test]
    fn prompts_from_a_stale_comparison_are_cancelled() {
        let mut app = app();
        app.begin_player_comparison();
        let (reply, mut answer) = tokio::sync::oneshot::channel();
        let prompt = SelectionPrompt::Player { requested: "Will Smith".into(), candidates: Vec::new(), reply };
        app.on_selection_requested(PromptOrigin { generation: 0, side: Side::A }, prompt);

        assert!(app.state.modals.active().is_none());
        assert!(matches!(answer.try_recv(), Err(tokio::sync::oneshot::error::TryRecvError::Closed)));
    }

    #[test]
    fn search_results_for_unfocused_input_are_ignored() {
        let mut app = app();
        app.state.players.inputs[0] = "Tro".into();
        let AutofillAction::Search { generation, .. } = app.player_type_char('u') else {
            panic!("expected search");
        };
        app.player_focus(true);
        app.on_search_completed(generation, Side::A, vec![Suggestion::default()]);
        assert!(!app.state.autofill.is_open_for(Side::A));
    }

    #[test]
    fn changing_view_recompares() {
        let mut app = app();
        app.state.players.focus = PlayerFocus::View;
        let Some(NetworkRequest::ComparePlayers { view, .. }) = app.player_cycle_view(true) else {
            panic!("expected request");
        };
        assert_eq!(view, ViewMode::Live);
    }

    #[test]
    fn team_stat_type_toggle_recompares() {
        let mut app = app();
        app.state.teams.inputs = ["NYY".into(), "BOS".into()];
        app.state.teams.focus = TeamFocus::StatType;
        let Some(NetworkRequest::CompareTeams { stat_type, .. }) = app.team_cycle_option(true) else {
            panic!("expected request");
        };
        assert_eq!(stat_type, TeamStatType::Pitching);
    }
}
