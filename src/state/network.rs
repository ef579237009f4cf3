use crate::state::messages::{NetworkRequest, NetworkResponse, Side};
use crate::state::modal::{PromptOrigin, SelectionPrompt};
use dugout_api::client::{ApiError, Chooser, StatsApi};
use dugout_api::{DisambiguationCandidate, TeamStatType, TwoWayOption, ViewMode};
use log::{debug, error, warn};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Answers selection prompts by asking the UI loop and waiting for its reply.
/// One chooser per side, so the UI can tell the two fetches apart.
#[derive(Debug, Clone)]
pub struct ModalChooser {
    responses: mpsc::Sender<NetworkResponse>,
    origin: PromptOrigin,
}

impl ModalChooser {
    pub fn new(responses: mpsc::Sender<NetworkResponse>, origin: PromptOrigin) -> Self {
        Self { responses, origin }
    }

    async fn ask<T>(&self, prompt: SelectionPrompt, answer: oneshot::Receiver<Option<T>>) -> Option<T> {
        if self
            .responses
            .send(NetworkResponse::SelectionRequested { origin: self.origin, prompt })
            .await
            .is_err()
        {
            warn!("ui loop gone, treating selection as cancelled");
            return None;
        }
        // A dropped sender means the dialog was closed or replaced.
        answer.await.ok().flatten()
    }
}

impl Chooser for ModalChooser {
    fn choose_player(
        &self,
        requested: &str,
        candidates: Vec<DisambiguationCandidate>,
    ) -> impl Future<Output = Option<DisambiguationCandidate>> + Send {
        let requested = requested.to_string();
        async move {
            let (reply, answer) = oneshot::channel();
            let prompt = SelectionPrompt::Player { requested, candidates, reply };
            self.ask(prompt, answer).await
        }
    }

    fn choose_player_type(
        &self,
        requested: &str,
        options: Vec<TwoWayOption>,
    ) -> impl Future<Output = Option<TwoWayOption>> + Send {
        let requested = requested.to_string();
        async move {
            let (reply, answer) = oneshot::channel();
            let prompt = SelectionPrompt::PlayerType { requested, options, reply };
            self.ask(prompt, answer).await
        }
    }
}

pub struct NetworkWorker {
    client: StatsApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

impl NetworkWorker {
    pub fn new(
        client: StatsApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Each request runs in its own task: a comparison can sit waiting on a
    /// selection dialog while searches keep flowing.
    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let client = self.client.clone();
            let responses = self.responses.clone();
            let in_flight = self.in_flight.clone();

            tokio::spawn(async move {
                let kind = request.kind();
                let result = handle_request(&client, &responses, request).await;
                debug!("network request complete");
                stop_loading_animation(&responses, &in_flight, result.is_ok()).await;

                let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                    request: kind,
                    message: err.to_string(),
                });
                if let Err(e) = responses.send(response).await {
                    error!("Failed to send network response: {e}");
                }
            });
        }
    }

    async fn start_loading_animation(&self) {
        // Only the first concurrent request starts a spinner task.
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            return;
        }

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }
}

async fn stop_loading_animation(
    responses: &mpsc::Sender<NetworkResponse>,
    in_flight: &AtomicUsize,
    is_ok: bool,
) {
    if in_flight.fetch_sub(1, Ordering::SeqCst) > 1 {
        return;
    }
    tokio::time::sleep(Duration::from_millis(15)).await;

    let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged {
            loading_state: LoadingState { is_loading: false, spinner_char },
        })
        .await;
}

async fn handle_request(
    client: &StatsApi,
    responses: &mpsc::Sender<NetworkResponse>,
    request: NetworkRequest,
) -> Result<NetworkResponse, ApiError> {
    match request {
        NetworkRequest::ComparePlayers { generation, names, view } => {
            let choosers = [Side::A, Side::B]
                .map(|side| ModalChooser::new(responses.clone(), PromptOrigin { generation, side }));
            Ok(handle_compare_players(client, &choosers, generation, names, view).await)
        }
        NetworkRequest::CompareTeams { generation, names, view, stat_type } => {
            Ok(handle_compare_teams(client, generation, names, view, stat_type).await)
        }
        NetworkRequest::LoadPopular => handle_load_popular(client).await,
        NetworkRequest::Search { generation, side, query } => {
            Ok(handle_search(client, generation, side, query).await)
        }
    }
}

/// Fetch both players concurrently. Each side prompts through its own chooser.
pub async fn handle_compare_players<C>(
    client: &StatsApi,
    choosers: &[C; 2],
    generation: u64,
    names: [String; 2],
    view: ViewMode,
) -> NetworkResponse
where
    C: Chooser + Sync,
{
    debug!("comparing {} vs {} ({})", names[0], names[1], view.as_str());
    let (a, b) = tokio::join!(
        client.fetch_stats(&names[0], view, &choosers[0]),
        client.fetch_stats(&names[1], view, &choosers[1]),
    );
    NetworkResponse::PlayersCompared {
        generation,
        names,
        view,
        results: Box::new([a, b]),
    }
}

async fn handle_compare_teams(
    client: &StatsApi,
    generation: u64,
    names: [String; 2],
    view: ViewMode,
    stat_type: TeamStatType,
) -> NetworkResponse {
    debug!("comparing teams {} vs {} ({})", names[0], names[1], stat_type.as_str());
    let (a, b) = tokio::join!(
        client.fetch_team(&names[0], view, stat_type),
        client.fetch_team(&names[1], view, stat_type),
    );
    NetworkResponse::TeamsCompared {
        generation,
        names,
        stat_type,
        results: Box::new([a, b]),
    }
}

async fn handle_load_popular(client: &StatsApi) -> Result<NetworkResponse, ApiError> {
    debug!("loading popular players");
    let players = client.popular_players().await?;
    Ok(NetworkResponse::PopularLoaded { players })
}

/// Search failures only cost the dropdown, so they are logged, not surfaced.
async fn handle_search(client: &StatsApi, generation: u64, side: Side, query: String) -> NetworkResponse {
    let results = match client.search_players(&query).await {
        Ok(results) => results,
        Err(e) => {
            warn!("player search for {query:?} failed: {e}");
            Vec::new()
        }
    };
    NetworkResponse::SearchCompleted { generation, side, results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::modal::ModalState;
    use mockito::{Matcher, Server};

    fn origin(side: Side) -> PromptOrigin {
        PromptOrigin { generation: 1, side }
    }

    fn choosers(tx: &mpsc::Sender<NetworkResponse>) -> [ModalChooser; 2] {
        [Side::A, Side::B].map(|side| ModalChooser::new(tx.clone(), origin(side)))
    }

    #[tokio::test]
    async fn modal_chooser_round_trips_through_the_ui_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let chooser = ModalChooser::new(tx, origin(Side::B));

        let ui = tokio::spawn(async move {
            let Some(NetworkResponse::SelectionRequested { origin, prompt }) = rx.recv().await else {
                panic!("expected a selection prompt");
            };
            assert_eq!(origin.side, Side::B);
            let SelectionPrompt::Player { mut candidates, reply, .. } = prompt else {
                panic!("expected a player prompt");
            };
            let _ = reply.send(Some(candidates.remove(1)));
        });

        let chosen = chooser
            .choose_player(
                "Will Smith",
                vec![
                    DisambiguationCandidate { name: "Will Smith".into(), playerid: Some("a".into()), ..Default::default() },
                    DisambiguationCandidate { name: "Will Smith".into(), playerid: Some("b".into()), ..Default::default() },
                ],
            )
            .await;
        ui.await.unwrap();
        assert_eq!(chosen.and_then(|c| c.playerid).as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn dropped_prompt_counts_as_cancel() {
        let (tx, mut rx) = mpsc::channel(4);
        let chooser = ModalChooser::new(tx, origin(Side::A));
        let ui = tokio::spawn(async move {
            // Receive and drop without answering.
            let _ = rx.recv().await;
        });
        let chosen = chooser.choose_player_type("Shohei Ohtani", Vec::new()).await;
        ui.await.unwrap();
        assert!(chosen.is_none());
    }

    #[tokio::test]
    async fn compare_fetches_both_players() {
        let mut server = Server::new_async().await;
        let _trout = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::UrlEncoded("name".into(), "Mike Trout".into()))
            .with_body(r#"{"mode":"career","player_type":"hitter","totals":{"war":85.3}}"#)
            .create_async()
            .await;
        let _tucker = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::UrlEncoded("name".into(), "Kyle Tucker".into()))
            .with_body(r#"{"mode":"career","player_type":"hitter","totals":{"war":20.1}}"#)
            .create_async()
            .await;

        let client = StatsApi::new(server.url());
        let (tx, _rx) = mpsc::channel(4);
        let response = handle_compare_players(
            &client,
            &choosers(&tx),
            7,
            ["Mike Trout".into(), "Kyle Tucker".into()],
            ViewMode::Career,
        )
        .await;

        let NetworkResponse::PlayersCompared { generation, results, .. } = response else {
            panic!("expected comparison");
        };
        assert_eq!(generation, 7);
        assert!(results.iter().all(|r| r.error_message().is_none()));
        assert_eq!(results[1].player_type.as_deref(), Some("hitter"));
    }

    #[tokio::test]
    async fn two_ambiguous_names_are_both_resolved_by_the_user() {
        let mut server = Server::new_async().await;
        let mut ambiguous = Vec::new();
        for (name, ids) in [("Will Smith", ["smithwi04", "smithwi05"]), ("Frank Thomas", ["thomafr03", "thomafr04"])] {
            let mock = server
                .mock("GET", "/player-two-way")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("name".into(), name.into()),
                    Matcher::Regex("mode=career$".into()),
                ]))
                .with_status(422)
                .with_body(format!(
                    r#"{{"suggestions": [{{"name": "{name}", "playerid": "{}"}}, {{"name": "{name}", "playerid": "{}"}}]}}"#,
                    ids[0], ids[1]
                ))
                .create_async()
                .await;
            ambiguous.push(mock);
        }
        let mut picked = Vec::new();
        for id in ["smithwi05", "thomafr04"] {
            let mock = server
                .mock("GET", "/player-two-way")
                .match_query(Matcher::UrlEncoded("playerid".into(), id.into()))
                .with_body(r#"{"mode":"career","player_type":"hitter","totals":{"war":10.0}}"#)
                .expect(1)
                .create_async()
                .await;
            picked.push(mock);
        }

        let (tx, mut rx) = mpsc::channel(8);
        let choosers = choosers(&tx);
        let ui = tokio::spawn(async move {
            let mut modals = ModalState::default();
            // Both fetches prompt before anything is answered.
            for _ in 0..2 {
                let Some(NetworkResponse::SelectionRequested { origin, prompt }) = rx.recv().await else {
                    panic!("expected a selection prompt");
                };
                modals.open(origin, prompt);
            }
            let mut answered = Vec::new();
            while let Some(active) = modals.active() {
                answered.push(active.origin.side);
                modals.select_next();
                modals.confirm();
            }
            answered
        });

        let client = StatsApi::new(server.url());
        let response = handle_compare_players(
            &client,
            &choosers,
            1,
            ["Will Smith".into(), "Frank Thomas".into()],
            ViewMode::Career,
        )
        .await;
        let answered = ui.await.unwrap();

        assert_eq!(answered.len(), 2);
        assert!(answered.contains(&Side::A) && answered.contains(&Side::B));
        for mock in ambiguous.iter().chain(&picked) {
            mock.assert_async().await;
        }
        let NetworkResponse::PlayersCompared { results, .. } = response else {
            panic!("expected comparison");
        };
        assert_eq!(results[0].error_message(), None);
        assert_eq!(results[1].error_message(), None);
        assert_eq!(results[0].selected_name.as_deref(), Some("Will Smith"));
        assert_eq!(results[1].selected_name.as_deref(), Some("Frank Thomas"));
    }

    #[tokio::test]
    async fn failed_search_yields_empty_results() {
        let client = StatsApi::new("http://127.0.0.1:1");
        let response = handle_search(&client, 3, Side::B, "trout".into()).await;
        let NetworkResponse::SearchCompleted { generation, side, results } = response else {
            panic!("expected search results");
        };
        assert_eq!((generation, side), (3, Side::B));
        assert!(results.is_empty());
    }
}
