use crate::wire::{OptionsBody, SuggestionEntry, SuggestionsBody};
use crate::{
    DisambiguationCandidate, Mode, PlayerType, StatsResponse, Suggestion, TeamStatType,
    TeamStatsResponse, TwoWayOption, ViewMode,
};
use log::{debug, warn};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const FETCH_FAILED: &str = "Failed to fetch data";
pub const PLAYER_SELECTION_CANCELLED: &str = "User cancelled player selection";
pub const TYPE_SELECTION_CANCELLED: &str = "User cancelled player type selection";

/// Multiple players share the requested name.
const STATUS_AMBIGUOUS: u16 = 422;
/// The player needs a hitter/pitcher choice.
const STATUS_TWO_WAY: u16 = 423;
/// Upper bound on dialogs shown for a single lookup.
const MAX_PROMPTS: usize = 4;

/// Client for the stats backend.
#[derive(Debug, Clone)]
pub struct StatsApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for StatsApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Status(StatusCode, String),
    Parsing(reqwest::Error, String),
    InvalidUrl(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status(status, url) => write!(f, "API error for {url}: {status}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Seam between the fetcher and whatever presents selection dialogs.
///
/// Each call is one dialog: the returned future resolves when the user picks
/// an entry (`Some`) or dismisses the dialog (`None`).
pub trait Chooser {
    fn choose_player(
        &self,
        requested: &str,
        candidates: Vec<DisambiguationCandidate>,
    ) -> impl Future<Output = Option<DisambiguationCandidate>> + Send;

    fn choose_player_type(
        &self,
        requested: &str,
        options: Vec<TwoWayOption>,
    ) -> impl Future<Output = Option<TwoWayOption>> + Send;
}

/// Chooser for non-interactive use: every dialog is dismissed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineAll;

impl Chooser for DeclineAll {
    fn choose_player(
        &self,
        requested: &str,
        candidates: Vec<DisambiguationCandidate>,
    ) -> impl Future<Output = Option<DisambiguationCandidate>> + Send {
        warn!("{} players match {requested}; no prompt available", candidates.len());
        std::future::ready(None)
    }

    fn choose_player_type(
        &self,
        requested: &str,
        _options: Vec<TwoWayOption>,
    ) -> impl Future<Output = Option<TwoWayOption>> + Send {
        warn!("{requested} is a two-way player; no prompt available");
        std::future::ready(None)
    }
}

/// Player endpoints, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TwoWay,
    Disambiguate,
    Legacy,
}

pub const RESOLVER_CHAIN: [Endpoint; 3] = [Endpoint::TwoWay, Endpoint::Disambiguate, Endpoint::Legacy];

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TwoWay => "/player-two-way",
            Endpoint::Disambiguate => "/player-disambiguate",
            Endpoint::Legacy => "/player",
        }
    }

    fn handles_ambiguity(&self) -> bool {
        matches!(self, Endpoint::TwoWay | Endpoint::Disambiguate)
    }

    fn handles_two_way(&self) -> bool {
        matches!(self, Endpoint::TwoWay)
    }

    /// The last resolver returns whatever JSON it gets, error bodies included.
    fn is_last_resort(&self) -> bool {
        matches!(self, Endpoint::Legacy)
    }
}

/// Outcome of one resolver in the chain.
#[derive(Debug)]
enum Step {
    Resolved(StatsResponse),
    Fallthrough(String),
}

/// Identity the player endpoints are queried with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerQuery {
    pub name: String,
    pub mode: Mode,
    pub player_type: Option<PlayerType>,
    pub playerid: Option<String>,
}

impl PlayerQuery {
    pub fn new(name: &str, mode: Mode) -> Self {
        Self {
            name: name.trim().to_string(),
            mode,
            player_type: None,
            playerid: None,
        }
    }

    fn for_candidate(mut self, candidate: DisambiguationCandidate) -> Self {
        self.name = candidate.name;
        self.playerid = candidate.playerid.filter(|id| !id.is_empty());
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("name", self.name.clone()), ("mode", self.mode.as_str().to_string())];
        if let Some(player_type) = self.player_type {
            params.push(("player_type", player_type.as_str().to_string()));
        }
        if let Some(id) = &self.playerid {
            params.push(("playerid", id.clone()));
        }
        params
    }
}

impl StatsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("dugout/0.1 (terminal stat comparison)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch stats for a player.
    ///
    /// Never fails: transport and decoding problems come back as a response
    /// carrying `error`. Resolver chain:
    /// 1) `/player-two-way`: may prompt for a player (422) or a role (423).
    /// 2) `/player-disambiguate`: may prompt for a player (422).
    /// 3) `/player`: legacy lookup, returned as-is even when it is an error body.
    pub async fn fetch_stats<C>(&self, name: &str, view: ViewMode, chooser: &C) -> StatsResponse
    where
        C: Chooser + Sync,
    {
        let query = PlayerQuery::new(name, view.backend_mode());
        let mut last_reason = String::new();

        for endpoint in RESOLVER_CHAIN {
            match self.resolve(endpoint, &query, chooser).await {
                Ok(Step::Resolved(response)) => return response,
                Ok(Step::Fallthrough(reason)) => {
                    debug!("{reason}; falling back from {}", endpoint.path());
                    last_reason = reason;
                }
                Err(e) => {
                    warn!("stats lookup for {name} failed: {e}");
                    return StatsResponse::from_error(FETCH_FAILED);
                }
            }
        }

        StatsResponse::from_error(format!("{FETCH_FAILED}: {last_reason}"))
    }

    async fn resolve<C>(&self, endpoint: Endpoint, query: &PlayerQuery, chooser: &C) -> ApiResult<Step>
    where
        C: Chooser + Sync,
    {
        let mut query = query.clone();
        let mut selected_name: Option<String> = None;
        let mut prompts = 0;

        loop {
            let response = self.send(endpoint.path(), &query.params()).await?;
            let status = response.status();
            let url = response.url().to_string();
            debug!("{url} -> {status}");

            match status.as_u16() {
                STATUS_AMBIGUOUS if endpoint.handles_ambiguity() => {
                    let body: SuggestionsBody = decode(response, &url).await?;
                    if body.suggestions.is_empty() {
                        return Ok(no_choices(prompts, body.error, &url, status));
                    }
                    if prompts >= MAX_PROMPTS {
                        return Ok(Step::Resolved(too_many_prompts(&query.name)));
                    }
                    prompts += 1;

                    let Some(choice) = chooser.choose_player(&query.name, body.suggestions).await else {
                        return Ok(Step::Resolved(StatsResponse::from_error(
                            PLAYER_SELECTION_CANCELLED,
                        )));
                    };
                    debug!("selected {} ({:?})", choice.name, choice.playerid);
                    selected_name = Some(choice.name.clone());
                    query = query.for_candidate(choice);
                }
                STATUS_TWO_WAY if endpoint.handles_two_way() => {
                    let body: OptionsBody = decode(response, &url).await?;
                    if body.options.is_empty() {
                        return Ok(no_choices(prompts, body.error, &url, status));
                    }
                    if prompts >= MAX_PROMPTS {
                        return Ok(Step::Resolved(too_many_prompts(&query.name)));
                    }
                    prompts += 1;

                    let Some(choice) = chooser.choose_player_type(&query.name, body.options).await else {
                        return Ok(Step::Resolved(StatsResponse::from_error(TYPE_SELECTION_CANCELLED)));
                    };
                    debug!("selected {} stats for {}", choice.player_type.as_str(), query.name);
                    selected_name = Some(query.name.clone());
                    query.player_type = Some(choice.player_type);
                }
                _ if status.is_success() || prompts > 0 || endpoint.is_last_resort() => {
                    let mut body: StatsResponse = decode(response, &url).await?;
                    if selected_name.is_some() {
                        body.selected_name = selected_name;
                    }
                    return Ok(Step::Resolved(body));
                }
                _ => return Ok(Step::Fallthrough(format!("{url} returned {status}"))),
            }
        }
    }

    /// Fetch aggregate team stats. Never fails, like `fetch_stats`.
    pub async fn fetch_team(&self, team: &str, view: ViewMode, stat_type: TeamStatType) -> TeamStatsResponse {
        let params = [
            ("team", team.trim().to_string()),
            ("mode", view.backend_mode().as_str().to_string()),
            ("stat_type", stat_type.as_str().to_string()),
        ];
        let result = match self.send("/team", &params).await {
            Ok(response) => {
                let url = response.url().to_string();
                decode::<TeamStatsResponse>(response, &url).await
            }
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!("team lookup for {team} failed: {e}");
            TeamStatsResponse::from_error("Failed to fetch team data")
        })
    }

    pub async fn popular_players(&self) -> ApiResult<Vec<Suggestion>> {
        let entries: Vec<SuggestionEntry> = self.get_json("/popular-players", &[]).await?;
        Ok(entries.into_iter().map(Suggestion::from).collect())
    }

    /// Search by partial name. Prefers the enhanced endpoint (which adds a
    /// display string) and falls back to the plain one.
    pub async fn search_players(&self, query: &str) -> ApiResult<Vec<Suggestion>> {
        let params = [("q", query.trim().to_string())];
        let entries: Vec<SuggestionEntry> =
            match self.get_json("/search-players-enhanced", &params).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("enhanced search unavailable ({e}); using basic search");
                    self.get_json("/search-players", &params).await?
                }
            };
        Ok(entries.into_iter().map(Suggestion::from).collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> ApiResult<T> {
        let response = self.send(path, params).await?;
        let url = response.url().to_string();
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status(), url));
        }
        decode(response, &url).await
    }

    async fn send(&self, path: &str, params: &[(&str, String)]) -> ApiResult<Response> {
        let raw = format!("{}{path}", self.base_url);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        }
        .map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;

        self.client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, raw))
    }
}

async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parsing(e, url.to_owned()))
}

/// A 422/423 with nothing to choose from. Before any dialog it falls through
/// to the next resolver; after one it ends the lookup.
fn no_choices(prompts: usize, error: Option<String>, url: &str, status: StatusCode) -> Step {
    if prompts > 0 {
        Step::Resolved(StatsResponse::from_error(
            error.unwrap_or_else(|| "No matching players found".to_string()),
        ))
    } else {
        Step::Fallthrough(format!("{url} returned {status} without choices"))
    }
}

fn too_many_prompts(name: &str) -> StatsResponse {
    StatsResponse::from_error(format!("Could not resolve {name} to a single player"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Picks a fixed index in every dialog, or dismisses when `pick` is None.
    struct Scripted {
        pick: Option<usize>,
        prompts: AtomicUsize,
    }

    impl Scripted {
        fn picking(pick: Option<usize>) -> Self {
            Self { pick, prompts: AtomicUsize::new(0) }
        }

        fn prompts(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }
    }

    impl Chooser for Scripted {
        fn choose_player(
            &self,
            _requested: &str,
            candidates: Vec<DisambiguationCandidate>,
        ) -> impl Future<Output = Option<DisambiguationCandidate>> + Send {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            std::future::ready(self.pick.and_then(|i| candidates.get(i).cloned()))
        }

        fn choose_player_type(
            &self,
            _requested: &str,
            options: Vec<TwoWayOption>,
        ) -> impl Future<Output = Option<TwoWayOption>> + Send {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            std::future::ready(self.pick.and_then(|i| options.get(i).cloned()))
        }
    }

    const TROUT_CAREER: &str = r#"{
        "mode": "career",
        "player_type": "hitter",
        "totals": {"war": 85.3, "hits": 1648},
        "photo_url": "https://img.example/545361.jpg"
    }"#;

    #[tokio::test]
    async fn primary_success_is_returned_directly() {
        let mut server = mockito::Server::new_async().await;
        let primary = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "Mike Trout".into()),
                Matcher::UrlEncoded("mode".into(), "career".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TROUT_CAREER)
            .create_async()
            .await;
        let fallback = server.mock("GET", "/player-disambiguate").expect(0).create_async().await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(None);
        let res = api.fetch_stats("  Mike Trout ", ViewMode::Career, &chooser).await;

        primary.assert_async().await;
        fallback.assert_async().await;
        assert_eq!(res.error_message(), None);
        assert_eq!(res.player_type(), Some(PlayerType::Hitter));
        assert_eq!(res.selected_name, None);
        assert_eq!(chooser.prompts(), 0);
    }

    #[tokio::test]
    async fn newest_and_oldest_query_season_mode() {
        let mut server = mockito::Server::new_async().await;
        let primary = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::UrlEncoded("mode".into(), "season".into()))
            .with_status(200)
            .with_body(r#"{"mode": "season", "player_type": "hitter", "stats": []}"#)
            .expect(2)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        api.fetch_stats("Mike Trout", ViewMode::Newest, &DeclineAll).await;
        api.fetch_stats("Mike Trout", ViewMode::Oldest, &DeclineAll).await;
        primary.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_walks_the_whole_chain_and_returns_legacy_body() {
        let mut server = mockito::Server::new_async().await;
        let primary = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error": "Player not found"}"#)
            .create_async()
            .await;
        let disambiguate = server
            .mock("GET", "/player-disambiguate")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error": "Player not found"}"#)
            .create_async()
            .await;
        let legacy = server
            .mock("GET", "/player")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error": "Player not found in legacy data"}"#)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let res = api.fetch_stats("Nobody Atall", ViewMode::Career, &DeclineAll).await;

        primary.assert_async().await;
        disambiguate.assert_async().await;
        legacy.assert_async().await;
        assert_eq!(res.error_message(), Some("Player not found in legacy data"));
    }

    #[tokio::test]
    async fn ambiguous_name_resolves_to_the_chosen_candidate() {
        let mut server = mockito::Server::new_async().await;
        let ambiguous = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Regex("mode=career$".into()))
            .with_status(422)
            .with_body(
                r#"{"suggestions": [
                    {"name": "Will Smith", "playerid": "smithwi04", "debut_year": 2012, "birth_year": 1989},
                    {"name": "Will Smith", "playerid": "smithwi05", "debut_year": 2019, "birth_year": 1995}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let chosen = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::UrlEncoded("playerid".into(), "smithwi05".into()))
            .with_status(200)
            .with_body(r#"{"mode": "career", "player_type": "hitter", "totals": {"war": 20.1}}"#)
            .expect(1)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(Some(1));
        let res = api.fetch_stats("Will Smith", ViewMode::Career, &chooser).await;

        ambiguous.assert_async().await;
        chosen.assert_async().await;
        assert_eq!(chooser.prompts(), 1);
        assert_eq!(res.selected_name.as_deref(), Some("Will Smith"));
        assert_eq!(res.error_message(), None);
    }

    #[tokio::test]
    async fn cancelling_a_selection_stops_without_more_requests() {
        let mut server = mockito::Server::new_async().await;
        let ambiguous = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Any)
            .with_status(422)
            .with_body(r#"{"suggestions": [{"name": "Will Smith"}, {"name": "Will Smith"}]}"#)
            .expect(1)
            .create_async()
            .await;
        let disambiguate = server.mock("GET", "/player-disambiguate").match_query(Matcher::Any).expect(0).create_async().await;
        let legacy = server.mock("GET", "/player").match_query(Matcher::Any).expect(0).create_async().await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(None);
        let res = api.fetch_stats("Will Smith", ViewMode::Career, &chooser).await;

        ambiguous.assert_async().await;
        disambiguate.assert_async().await;
        legacy.assert_async().await;
        assert_eq!(res.error_message(), Some(PLAYER_SELECTION_CANCELLED));
    }

    #[tokio::test]
    async fn two_way_player_is_refetched_with_the_chosen_type() {
        let mut server = mockito::Server::new_async().await;
        let two_way = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Regex("mode=career$".into()))
            .with_status(423)
            .with_body(
                r#"{"options": [
                    {"type": "hitter", "label": "Hitting stats"},
                    {"type": "pitcher", "label": "Pitching stats"}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let pitcher = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::UrlEncoded("player_type".into(), "pitcher".into()))
            .with_status(200)
            .with_body(r#"{"mode": "career", "player_type": "pitcher", "totals": {"era": 3.01}}"#)
            .expect(1)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(Some(1));
        let res = api.fetch_stats("Shohei Ohtani", ViewMode::Career, &chooser).await;

        two_way.assert_async().await;
        pitcher.assert_async().await;
        assert_eq!(res.player_type(), Some(PlayerType::Pitcher));
        assert_eq!(res.selected_name.as_deref(), Some("Shohei Ohtani"));
    }

    #[tokio::test]
    async fn disambiguate_endpoint_prompts_after_primary_fails() {
        let mut server = mockito::Server::new_async().await;
        let _broken = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;
        let ambiguous = server
            .mock("GET", "/player-disambiguate")
            .match_query(Matcher::Regex("mode=combined$".into()))
            .with_status(422)
            .with_body(r#"{"suggestions": [{"name": "Frank Thomas", "playerid": "thomafr04"}]}"#)
            .expect(1)
            .create_async()
            .await;
        let chosen = server
            .mock("GET", "/player-disambiguate")
            .match_query(Matcher::UrlEncoded("playerid".into(), "thomafr04".into()))
            .with_status(200)
            .with_body(r#"{"mode": "combined", "player_type": "hitter", "totals": {"war": 68.2}}"#)
            .expect(1)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(Some(0));
        let res = api.fetch_stats("Frank Thomas", ViewMode::Combined, &chooser).await;

        ambiguous.assert_async().await;
        chosen.assert_async().await;
        assert_eq!(res.selected_name.as_deref(), Some("Frank Thomas"));
        assert_eq!(res.mode(), Some(Mode::Combined));
    }

    #[tokio::test]
    async fn endless_ambiguity_gives_up_after_max_prompts() {
        let mut server = mockito::Server::new_async().await;
        let ambiguous = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Any)
            .with_status(422)
            .with_body(r#"{"suggestions": [{"name": "Will Smith", "playerid": "smithwi04"}]}"#)
            .expect(MAX_PROMPTS + 1)
            .create_async()
            .await;
        let disambiguate = server.mock("GET", "/player-disambiguate").match_query(Matcher::Any).expect(0).create_async().await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(Some(0));
        let res = api.fetch_stats("Will Smith", ViewMode::Career, &chooser).await;

        ambiguous.assert_async().await;
        disambiguate.assert_async().await;
        assert_eq!(chooser.prompts(), MAX_PROMPTS);
        assert_eq!(res.error_message(), Some("Could not resolve Will Smith to a single player"));
    }

    #[tokio::test]
    async fn ambiguity_without_suggestions_falls_through() {
        let mut server = mockito::Server::new_async().await;
        let empty = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Any)
            .with_status(422)
            .with_body(r#"{"suggestions": []}"#)
            .expect(1)
            .create_async()
            .await;
        let disambiguate = server
            .mock("GET", "/player-disambiguate")
            .match_query(Matcher::UrlEncoded("name".into(), "Frank Thomas".into()))
            .with_status(200)
            .with_body(r#"{"mode": "career", "player_type": "hitter", "totals": {"war": 68.2}}"#)
            .expect(1)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(Some(0));
        let res = api.fetch_stats("Frank Thomas", ViewMode::Career, &chooser).await;

        empty.assert_async().await;
        disambiguate.assert_async().await;
        assert_eq!(chooser.prompts(), 0);
        assert_eq!(res.error_message(), None);
        assert_eq!(res.selected_name, None);
    }

    #[tokio::test]
    async fn cancelling_the_role_dialog_stops_without_more_requests() {
        let mut server = mockito::Server::new_async().await;
        let two_way = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Any)
            .with_status(423)
            .with_body(r#"{"options": [{"type": "hitter"}, {"type": "pitcher"}]}"#)
            .expect(1)
            .create_async()
            .await;
        let disambiguate = server.mock("GET", "/player-disambiguate").match_query(Matcher::Any).expect(0).create_async().await;
        let legacy = server.mock("GET", "/player").match_query(Matcher::Any).expect(0).create_async().await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(None);
        let res = api.fetch_stats("Shohei Ohtani", ViewMode::Career, &chooser).await;

        two_way.assert_async().await;
        disambiguate.assert_async().await;
        legacy.assert_async().await;
        assert_eq!(chooser.prompts(), 1);
        assert_eq!(res.error_message(), Some(TYPE_SELECTION_CANCELLED));
    }

    #[tokio::test]
    async fn failed_follow_up_after_a_choice_is_final() {
        let mut server = mockito::Server::new_async().await;
        let ambiguous = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Regex("mode=career$".into()))
            .with_status(422)
            .with_body(r#"{"suggestions": [{"name": "Will Smith", "playerid": "smithwi04"}]}"#)
            .expect(1)
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::UrlEncoded("playerid".into(), "smithwi04".into()))
            .with_status(404)
            .with_body(r#"{"error": "No stats for smithwi04"}"#)
            .expect(1)
            .create_async()
            .await;
        let disambiguate = server.mock("GET", "/player-disambiguate").match_query(Matcher::Any).expect(0).create_async().await;

        let api = StatsApi::new(server.url());
        let chooser = Scripted::picking(Some(0));
        let res = api.fetch_stats("Will Smith", ViewMode::Career, &chooser).await;

        ambiguous.assert_async().await;
        missing.assert_async().await;
        disambiguate.assert_async().await;
        assert_eq!(res.error_message(), Some("No stats for smithwi04"));
        assert_eq!(res.selected_name.as_deref(), Some("Will Smith"));
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_to_error_object() {
        let api = StatsApi::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2));
        let res = api.fetch_stats("Mike Trout", ViewMode::Career, &DeclineAll).await;
        assert_eq!(res.error_message(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_error_object() {
        let mut server = mockito::Server::new_async().await;
        let _html = server
            .mock("GET", "/player-two-way")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let res = api.fetch_stats("Mike Trout", ViewMode::Career, &DeclineAll).await;
        assert_eq!(res.error_message(), Some(FETCH_FAILED));
    }

    #[tokio::test]
    async fn search_falls_back_to_basic_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let _enhanced = server
            .mock("GET", "/search-players-enhanced")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let basic = server
            .mock("GET", "/search-players")
            .match_query(Matcher::UrlEncoded("q".into(), "trou".into()))
            .with_status(200)
            .with_body(r#"["Mike Trout", "Dizzy Trout"]"#)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let results = api.search_players("trou").await.expect("basic search should succeed");

        basic.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].name, "Dizzy Trout");
        assert_eq!(results[1].display, None);
    }

    #[tokio::test]
    async fn popular_players_accept_names_and_objects() {
        let mut server = mockito::Server::new_async().await;
        let _popular = server
            .mock("GET", "/popular-players")
            .with_status(200)
            .with_body(r#"["Aaron Judge", {"name": "Juan Soto", "display": "Juan Soto (OF, 2018)"}]"#)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let popular = api.popular_players().await.unwrap();
        assert_eq!(popular[0].shown(), "Aaron Judge");
        assert_eq!(popular[1].shown(), "Juan Soto (OF, 2018)");
    }

    #[tokio::test]
    async fn team_error_body_is_kept() {
        let mut server = mockito::Server::new_async().await;
        let team = server
            .mock("GET", "/team")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("team".into(), "Expos".into()),
                Matcher::UrlEncoded("stat_type".into(), "pitching".into()),
            ]))
            .with_status(404)
            .with_body(r#"{"error": "Team not found"}"#)
            .create_async()
            .await;

        let api = StatsApi::new(server.url());
        let res = api.fetch_team("Expos", ViewMode::Career, TeamStatType::Pitching).await;
        team.assert_async().await;
        assert_eq!(res.error_message(), Some("Team not found"));
    }

    #[test]
    fn query_params_are_ordered_and_optional() {
        let mut q = PlayerQuery::new("Shohei Ohtani", Mode::Season);
        assert_eq!(q.params().len(), 2);
        q.player_type = Some(PlayerType::Pitcher);
        let params = q.params();
        assert_eq!(params[2], ("player_type", "pitcher".to_string()));
    }
}
