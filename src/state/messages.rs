use crate::state::modal::{PromptOrigin, SelectionPrompt};
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use dugout_api::{StatsResponse, Suggestion, TeamStatType, TeamStatsResponse, ViewMode};

/// Which of the two compared entries an input or result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    ComparePlayers {
        generation: u64,
        names: [String; 2],
        view: ViewMode,
    },
    CompareTeams {
        generation: u64,
        names: [String; 2],
        view: ViewMode,
        stat_type: TeamStatType,
    },
    LoadPopular,
    Search {
        generation: u64,
        side: Side,
        query: String,
    },
}

/// Which kind of request a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    ComparePlayers,
    CompareTeams,
    LoadPopular,
    Search,
}

impl NetworkRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            NetworkRequest::ComparePlayers { .. } => RequestKind::ComparePlayers,
            NetworkRequest::CompareTeams { .. } => RequestKind::CompareTeams,
            NetworkRequest::LoadPopular => RequestKind::LoadPopular,
            NetworkRequest::Search { .. } => RequestKind::Search,
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged {
        loading_state: LoadingState,
    },
    PlayersCompared {
        generation: u64,
        names: [String; 2],
        view: ViewMode,
        results: Box<[StatsResponse; 2]>,
    },
    TeamsCompared {
        generation: u64,
        names: [String; 2],
        stat_type: TeamStatType,
        results: Box<[TeamStatsResponse; 2]>,
    },
    PopularLoaded {
        players: Vec<Suggestion>,
    },
    SearchCompleted {
        generation: u64,
        side: Side,
        results: Vec<Suggestion>,
    },
    /// A fetch is paused until the user answers a selection dialog.
    SelectionRequested {
        origin: PromptOrigin,
        prompt: SelectionPrompt,
    },
    Error {
        request: RequestKind,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
