use crate::app::{App, MenuItem};
use crate::state::app_state::{PlayerFocus, TeamFocus};
use crate::state::autofill::AutofillAction;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    if key_event.kind == KeyEventKind::Release {
        return;
    }

    let mut guard = app.lock().await;
    let mut outgoing: Option<NetworkRequest> = None;

    // Global chords work everywhere, dialogs included.
    match (key_event.code, key_event.modifiers) {
        (Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        (Char('l'), KeyModifiers::CONTROL) => return guard.toggle_show_logs(),
        (Char('f'), KeyModifiers::CONTROL) => return guard.toggle_full_screen(),
        (KeyCode::F(1), _) => return guard.update_tab(MenuItem::Help),
        (KeyCode::F(2), _) => return guard.update_tab(MenuItem::Players),
        (KeyCode::F(3), _) => return guard.update_tab(MenuItem::Teams),
        _ => {}
    }

    if guard.state.modals.is_open() {
        handle_modal_keys(key_event, &mut guard);
        return;
    }

    // Plain-letter shortcuts only apply when nothing is being typed.
    if !guard.is_typing() {
        match key_event.code {
            Char('q') => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            Char('1') => return guard.update_tab(MenuItem::Players),
            Char('2') => return guard.update_tab(MenuItem::Teams),
            Char('?') => return guard.update_tab(MenuItem::Help),
            Char('"') => return guard.toggle_show_logs(),
            Char('f') => return guard.toggle_full_screen(),
            _ => {}
        }
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Table scrolling
        (MenuItem::Players | MenuItem::Teams, KeyCode::PageDown, _) => guard.scroll_down(),
        (MenuItem::Players | MenuItem::Teams, KeyCode::PageUp, _) => guard.scroll_up(),

        (MenuItem::Players, _, _) => {
            outgoing = handle_player_keys(key_event, &mut guard, network_requests);
        }
        (MenuItem::Teams, _, _) => outgoing = handle_team_keys(key_event, &mut guard),

        _ => {}
    }

    drop(guard);
    if let Some(request) = outgoing {
        let _ = network_requests.send(request).await;
    }
}

fn handle_modal_keys(key_event: KeyEvent, guard: &mut MutexGuard<'_, App>) {
    let modals = &mut guard.state.modals;
    match key_event.code {
        Char('j') | KeyCode::Down => modals.select_next(),
        Char('k') | KeyCode::Up => modals.select_prev(),
        Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            modals.select_index(index);
        }
        KeyCode::Enter => modals.confirm(),
        // Esc, or moving focus off the dialog, cancels it.
        KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => modals.cancel(),
        _ => {}
    }
}

fn handle_player_keys(
    key_event: KeyEvent,
    guard: &mut MutexGuard<'_, App>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> Option<NetworkRequest> {
    let focus = guard.state.players.focus;
    let mut autofill = AutofillAction::Nothing;
    let mut request = None;

    match (focus, key_event.code, key_event.modifiers) {
        (_, KeyCode::Tab, _) => autofill = guard.player_focus(true),
        (_, KeyCode::BackTab, _) => autofill = guard.player_focus(false),

        // Text inputs
        (PlayerFocus::Input(_), KeyCode::Enter, _) => {
            request = match guard.accept_suggestion() {
                Some(request) => request,
                None => guard.begin_player_comparison(),
            };
        }
        (PlayerFocus::Input(_), KeyCode::Esc, _) => guard.state.autofill.close(),
        (PlayerFocus::Input(_), KeyCode::Down, _) => guard.state.autofill.select_next(),
        (PlayerFocus::Input(_), KeyCode::Up, _) => guard.state.autofill.select_prev(),
        (PlayerFocus::Input(_), KeyCode::Backspace, _) => autofill = guard.player_backspace(),
        (PlayerFocus::Input(_), Char('u'), KeyModifiers::CONTROL) => {
            autofill = guard.player_clear_input();
        }
        (PlayerFocus::Input(_), Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
            autofill = guard.player_type_char(c);
        }

        // View selector
        (PlayerFocus::View, Char('l') | KeyCode::Right, _) => request = guard.player_cycle_view(true),
        (PlayerFocus::View, Char('h') | KeyCode::Left, _) => request = guard.player_cycle_view(false),
        (PlayerFocus::View, Char('j') | KeyCode::Down, _) => guard.scroll_down(),
        (PlayerFocus::View, Char('k') | KeyCode::Up, _) => guard.scroll_up(),
        (PlayerFocus::View, KeyCode::Enter, _) => request = guard.begin_player_comparison(),

        _ => {}
    }

    match autofill {
        AutofillAction::Nothing => {}
        AutofillAction::LoadPopular => request = request.or(Some(NetworkRequest::LoadPopular)),
        AutofillAction::Search { side, query, generation } => {
            schedule_search(guard, network_requests, NetworkRequest::Search { generation, side, query });
        }
    }
    request
}

/// Debounce a search: only the last keystroke inside the window hits the backend.
fn schedule_search(
    guard: &mut MutexGuard<'_, App>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    request: NetworkRequest,
) {
    let network_requests = network_requests.clone();
    let delay = guard.settings.debounce;
    guard.state.autofill.debounce.schedule(delay, async move {
        let _ = network_requests.send(request).await;
    });
}

fn handle_team_keys(key_event: KeyEvent, guard: &mut MutexGuard<'_, App>) -> Option<NetworkRequest> {
    let focus = guard.state.teams.focus;
    match (focus, key_event.code, key_event.modifiers) {
        (_, KeyCode::Tab, _) => guard.team_focus(true),
        (_, KeyCode::BackTab, _) => guard.team_focus(false),
        (_, KeyCode::Enter, _) => return guard.begin_team_comparison(),

        (TeamFocus::InputA | TeamFocus::InputB, KeyCode::Backspace, _) => guard.team_backspace(),
        (TeamFocus::InputA | TeamFocus::InputB, Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
            guard.team_type_char(c);
        }

        (TeamFocus::View | TeamFocus::StatType, Char('l') | KeyCode::Right, _) => {
            return guard.team_cycle_option(true);
        }
        (TeamFocus::View | TeamFocus::StatType, Char('h') | KeyCode::Left, _) => {
            return guard.team_cycle_option(false);
        }
        (TeamFocus::StatType, Char(' '), _) => return guard.team_cycle_option(true),
        (TeamFocus::View | TeamFocus::StatType, Char('j') | KeyCode::Down, _) => guard.scroll_down(),
        (TeamFocus::View | TeamFocus::StatType, Char('k') | KeyCode::Up, _) => guard.scroll_up(),

        _ => {}
    }
    None
}
