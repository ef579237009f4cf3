use crate::state::messages::Side;
use dugout_api::{DisambiguationCandidate, TwoWayOption};
use log::debug;
use tokio::sync::oneshot;

/// The comparison and side a prompt was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOrigin {
    pub generation: u64,
    pub side: Side,
}

/// A question a paused fetch needs answered. Dropping the prompt without
/// replying resolves the question as cancelled.
#[derive(Debug)]
pub enum SelectionPrompt {
    Player {
        requested: String,
        candidates: Vec<DisambiguationCandidate>,
        reply: oneshot::Sender<Option<DisambiguationCandidate>>,
    },
    PlayerType {
        requested: String,
        options: Vec<TwoWayOption>,
        reply: oneshot::Sender<Option<TwoWayOption>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Player,
    PlayerType,
}

impl SelectionPrompt {
    pub fn kind(&self) -> ModalKind {
        match self {
            SelectionPrompt::Player { .. } => ModalKind::Player,
            SelectionPrompt::PlayerType { .. } => ModalKind::PlayerType,
        }
    }

    pub fn title(&self) -> String {
        match self {
            SelectionPrompt::Player { requested, .. } => {
                format!(" Multiple players named \"{requested}\" ")
            }
            SelectionPrompt::PlayerType { requested, .. } => {
                format!(" {requested} hit and pitched: which stats? ")
            }
        }
    }

    pub fn entries(&self) -> Vec<String> {
        match self {
            SelectionPrompt::Player { candidates, .. } => {
                candidates.iter().map(DisambiguationCandidate::describe).collect()
            }
            SelectionPrompt::PlayerType { options, .. } => {
                options.iter().map(|o| o.describe().to_string()).collect()
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            SelectionPrompt::Player { candidates, .. } => candidates.len(),
            SelectionPrompt::PlayerType { options, .. } => options.len(),
        }
    }

    /// Answer with the entry at `index`, or cancel when `index` is None.
    fn resolve(self, index: Option<usize>) {
        let delivered = match self {
            SelectionPrompt::Player {
                mut candidates,
                reply,
                ..
            } => {
                let choice = index.filter(|i| *i < candidates.len()).map(|i| candidates.swap_remove(i));
                reply.send(choice).is_ok()
            }
            SelectionPrompt::PlayerType {
                mut options, reply, ..
            } => {
                let choice = index.filter(|i| *i < options.len()).map(|i| options.swap_remove(i));
                reply.send(choice).is_ok()
            }
        };
        if !delivered {
            debug!("selection answered after its fetch went away");
        }
    }
}

#[derive(Debug)]
pub struct OpenModal {
    pub prompt: SelectionPrompt,
    pub origin: PromptOrigin,
    pub selected: usize,
}

/// Open selection dialogs, at most one of each kind. The last one opened
/// has focus. A prompt that finds its kind already taken by the other side
/// of the same comparison waits in `queued` until that dialog closes.
#[derive(Debug, Default)]
pub struct ModalState {
    open: Vec<OpenModal>,
    queued: Vec<OpenModal>,
}

impl ModalState {
    /// Show a prompt.
    ///
    /// Dialogs from an older comparison are cancelled. An open dialog of the
    /// same kind and origin is replaced, and its fetch sees a cancellation.
    pub fn open(&mut self, origin: PromptOrigin, prompt: SelectionPrompt) {
        self.cancel_superseded(origin.generation);

        let kind = prompt.kind();
        if let Some(pos) = self
            .open
            .iter()
            .position(|m| m.prompt.kind() == kind && m.origin == origin)
        {
            let replaced = self.open.remove(pos);
            debug!("replacing open {kind:?} dialog");
            replaced.prompt.resolve(None);
        }

        let modal = OpenModal { prompt, origin, selected: 0 };
        if self.open.iter().any(|m| m.prompt.kind() == kind) {
            debug!("queueing {kind:?} dialog for side {:?}", origin.side);
            self.queued.push(modal);
        } else {
            self.open.push(modal);
        }
    }

    pub fn active(&self) -> Option<&OpenModal> {
        self.open.last()
    }

    pub fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    pub fn select_next(&mut self) {
        if let Some(m) = self.open.last_mut() {
            let len = m.prompt.len();
            if len > 0 {
                m.selected = (m.selected + 1) % len;
            }
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(m) = self.open.last_mut() {
            let len = m.prompt.len();
            if len > 0 {
                m.selected = (m.selected + len - 1) % len;
            }
        }
    }

    pub fn select_index(&mut self, index: usize) {
        if let Some(m) = self.open.last_mut()
            && index < m.prompt.len()
        {
            m.selected = index;
        }
    }

    /// Answer the focused dialog with its highlighted entry.
    pub fn confirm(&mut self) {
        if let Some(m) = self.open.pop() {
            m.prompt.resolve(Some(m.selected));
            self.promote_queued();
        }
    }

    /// Close the focused dialog as cancelled.
    pub fn cancel(&mut self) {
        if let Some(m) = self.open.pop() {
            m.prompt.resolve(None);
            self.promote_queued();
        }
    }

    /// Close every dialog as cancelled, e.g. when the user leaves the tab.
    pub fn cancel_all(&mut self) {
        for m in self.open.drain(..).chain(self.queued.drain(..)) {
            m.prompt.resolve(None);
        }
    }

    fn cancel_superseded(&mut self, generation: u64) {
        let (stale, open): (Vec<_>, Vec<_>) =
            self.open.drain(..).partition(|m| m.origin.generation < generation);
        let (stale_queued, queued): (Vec<_>, Vec<_>) =
            self.queued.drain(..).partition(|m| m.origin.generation < generation);
        self.open = open;
        self.queued = queued;
        for m in stale.into_iter().chain(stale_queued) {
            debug!("cancelling dialog from superseded comparison {}", m.origin.generation);
            m.prompt.resolve(None);
        }
        self.promote_queued();
    }

    /// Show the oldest waiting prompt whose kind is free again.
    fn promote_queued(&mut self) {
        let open = &self.open;
        let Some(pos) = self
            .queued
            .iter()
            .position(|q| !open.iter().any(|m| m.prompt.kind() == q.prompt.kind()))
        else {
            return;
        };
        let next = self.queued.remove(pos);
        self.open.push(next);
    }
}
