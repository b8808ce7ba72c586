//! Lifecycle of the audio attached to the current card.
//!
//! The controller issues a fresh [`Ticket`] for every `load`. The backend
//! tags each event it reports with the ticket it was started under, so
//! anything still in flight from a card that has since been replaced is
//! recognised and dropped.

use crate::error::DrillError;
use crate::models::PromptRef;
use chrono::{DateTime, Utc};
use log::{debug, trace, warn};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Ended,
    Error,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Ready => "ready",
            PlaybackState::Playing => "playing",
            PlaybackState::Ended => "ended",
            PlaybackState::Error => "in error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEventKind {
    Loaded,
    LoadFailed(String),
    Finished,
    Failed(String),
}

/// Something the audio backend reports back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioEvent {
    pub ticket: Ticket,
    pub kind: AudioEventKind,
    pub at: DateTime<Utc>,
}

impl AudioEvent {
    pub fn new(ticket: Ticket, kind: AudioEventKind, at: DateTime<Utc>) -> Self {
        Self { ticket, kind, at }
    }
}

/// What the controller tells its owner after applying an event.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackSignal {
    Ready,
    /// A full playback finished at the given instant.
    Completed(DateTime<Utc>),
    Failed(DrillError),
}

/// The thing that actually buffers and plays sound.
///
/// `load` and `play` only start work; their outcome is delivered later as
/// an [`AudioEvent`] carrying the same ticket. `stop` must release whatever
/// the ticket holds and keep any of its pending events from being sent.
pub trait AudioBackend {
    fn load(&mut self, ticket: Ticket, prompt: &PromptRef) -> Result<(), DrillError>;
    fn play(&mut self, ticket: Ticket) -> Result<(), DrillError>;
    fn stop(&mut self, ticket: Ticket);
}

pub struct PlaybackController<B> {
    backend: B,
    state: PlaybackState,
    ticket: Option<Ticket>,
    next_ticket: u64,
    error: Option<DrillError>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: PlaybackState::Idle,
            ticket: None,
            next_ticket: 1,
            error: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn ticket(&self) -> Option<Ticket> {
        self.ticket
    }

    pub fn error(&self) -> Option<&DrillError> {
        self.error.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Releases the current playback, then starts buffering `prompt`.
    pub fn load(&mut self, prompt: &PromptRef) -> Ticket {
        self.release();

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.ticket = Some(ticket);
        self.state = PlaybackState::Loading;
        debug!("loading {} under ticket {}", prompt, ticket.0);

        if let Err(e) = self.backend.load(ticket, prompt) {
            warn!("could not start loading {}: {}", prompt, e);
            self.fail(as_load_error(e));
        }
        ticket
    }

    /// Starts playback from `Ready`, or replays from `Ended`.
    pub fn play(&mut self) -> Result<(), DrillError> {
        let ticket = match (self.state, self.ticket) {
            (PlaybackState::Ready | PlaybackState::Ended, Some(ticket)) => ticket,
            (state, _) => return Err(DrillError::NotPlayable(state)),
        };

        match self.backend.play(ticket) {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                debug!("playing ticket {}", ticket.0);
                Ok(())
            }
            Err(e) => {
                warn!("could not start playback: {}", e);
                let e = as_play_error(e);
                self.fail(e.clone());
                Err(e)
            }
        }
    }

    /// Stops and detaches the current playback, if any.
    pub fn release(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            trace!("releasing ticket {}", ticket.0);
            self.backend.stop(ticket);
        }
        self.state = PlaybackState::Idle;
        self.error = None;
    }

    pub fn handle_event(&mut self, event: AudioEvent) -> Option<PlaybackSignal> {
        if self.ticket != Some(event.ticket) {
            trace!("dropping stale {:?} for ticket {}", event.kind, event.ticket.0);
            return None;
        }

        match (self.state, event.kind) {
            (PlaybackState::Loading, AudioEventKind::Loaded) => {
                self.state = PlaybackState::Ready;
                Some(PlaybackSignal::Ready)
            }
            (PlaybackState::Loading, AudioEventKind::LoadFailed(msg)) => {
                warn!("audio failed to load: {}", msg);
                let e = DrillError::AssetLoad(msg);
                self.fail(e.clone());
                Some(PlaybackSignal::Failed(e))
            }
            (PlaybackState::Playing, AudioEventKind::Finished) => {
                self.state = PlaybackState::Ended;
                Some(PlaybackSignal::Completed(event.at))
            }
            (PlaybackState::Playing, AudioEventKind::Failed(msg)) => {
                warn!("audio failed while playing: {}", msg);
                let e = DrillError::Playback(msg);
                self.fail(e.clone());
                Some(PlaybackSignal::Failed(e))
            }
            (state, kind) => {
                trace!("ignoring {:?} while {}", kind, state);
                None
            }
        }
    }

    fn fail(&mut self, error: DrillError) {
        self.state = PlaybackState::Error;
        self.error = Some(error);
    }
}

fn as_load_error(e: DrillError) -> DrillError {
    match e {
        DrillError::AssetLoad(_) => e,
        other => DrillError::AssetLoad(other.to_string()),
    }
}

fn as_play_error(e: DrillError) -> DrillError {
    match e {
        DrillError::Playback(_) => e,
        other => DrillError::Playback(other.to_string()),
    }
}

/// Backend that performs nothing and remembers every call, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub loads: Vec<(Ticket, PromptRef)>,
    pub plays: Vec<Ticket>,
    pub stops: Vec<Ticket>,
    pub refuse_load: bool,
    pub refuse_play: bool,
}

#[cfg(test)]
impl AudioBackend for RecordingBackend {
    fn load(&mut self, ticket: Ticket, prompt: &PromptRef) -> Result<(), DrillError> {
        self.loads.push((ticket, prompt.clone()));
        if self.refuse_load {
            return Err(DrillError::AssetLoad("no such file".to_string()));
        }
        Ok(())
    }

    fn play(&mut self, ticket: Ticket) -> Result<(), DrillError> {
        self.plays.push(ticket);
        if self.refuse_play {
            return Err(DrillError::Playback("device busy".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self, ticket: Ticket) {
        self.stops.push(ticket);
    }
}
