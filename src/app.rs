//! The review loop: one card at a time, played, revealed and scheduled.
//!
//! `App` owns everything a session needs (deck, recency window, reaction
//! clock, playback) and is driven only through its event methods, which
//! the front end calls one at a time from a single event loop.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::DrillError;
use crate::feedback::{self, StatsLine};
use crate::models::{Card, CardId, PromptRef};
use crate::playback::{AudioBackend, AudioEvent, PlaybackController, PlaybackSignal, PlaybackState};
use crate::srs::{self, RecencyWindow, Selection};
use crate::store::CardStore;
use crate::tracker::ReactionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    AwaitingPlay,
    /// A play request is in flight; waiting for buffering or for the end
    /// of the prompt.
    Playing,
    AwaitingReveal,
    Revealed,
}

/// What a primary action turned out to mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Play,
    Reveal,
    Advance,
}

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Request playback as soon as a new card is shown.
    pub autoplay: bool,
}

/// Everything a front end needs to draw the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub card_id: CardId,
    pub prompt: PromptRef,
    pub answer: Option<String>,
    pub state: ReviewState,
    pub playback: PlaybackState,
    pub can_play: bool,
    pub error: Option<String>,
    pub primary_label: &'static str,
    pub last_reaction: Option<f64>,
    pub total_responses: usize,
    pub mean_reaction_time: Option<f64>,
    pub stats: StatsLine,
}

pub struct App<B, R = StdRng> {
    store: CardStore,
    window: RecencyWindow,
    tracker: ReactionTracker,
    playback: PlaybackController<B>,
    rng: R,
    options: AppOptions,
    state: ReviewState,
    current: CardId,
    play_queued: bool,
    total_responses: usize,
    last_reaction: Option<f64>,
}

impl<B: AudioBackend, R: Rng> App<B, R> {
    /// Draws the first card and starts loading its prompt.
    pub fn new(store: CardStore, backend: B, rng: R, options: AppOptions) -> Result<Self, DrillError> {
        let mut app = Self {
            store,
            window: RecencyWindow::new(),
            tracker: ReactionTracker::new(),
            playback: PlaybackController::new(backend),
            rng,
            options,
            state: ReviewState::AwaitingPlay,
            current: 0,
            play_queued: false,
            total_responses: 0,
            last_reaction: None,
        };
        info!("starting session with {} cards", app.store.len());
        app.show_next_card()?;
        Ok(app)
    }

    /// The single user action: play, reveal or advance depending on where
    /// the current card is.
    pub fn primary_action(&mut self, now: DateTime<Utc>) -> Result<Action, DrillError> {
        match self.state {
            ReviewState::AwaitingPlay => {
                self.request_play();
                Ok(Action::Play)
            }
            ReviewState::Playing | ReviewState::AwaitingReveal => {
                self.reveal(now);
                Ok(Action::Reveal)
            }
            ReviewState::Revealed => {
                self.advance()?;
                Ok(Action::Advance)
            }
        }
    }

    /// Plays the current prompt again. Before the first play this is the
    /// same as the primary action.
    pub fn replay(&mut self) -> Result<(), DrillError> {
        match self.state {
            ReviewState::AwaitingPlay => {
                self.request_play();
                Ok(())
            }
            ReviewState::Playing => Ok(()),
            ReviewState::AwaitingReveal | ReviewState::Revealed => self.playback.play(),
        }
    }

    pub fn handle_audio(&mut self, event: AudioEvent) {
        let Some(signal) = self.playback.handle_event(event) else {
            return;
        };

        match signal {
            PlaybackSignal::Ready => {
                if self.play_queued {
                    self.play_queued = false;
                    self.start_playback();
                }
            }
            PlaybackSignal::Completed(at) => match self.state {
                ReviewState::Playing | ReviewState::AwaitingReveal => {
                    self.tracker.start_clock(at);
                    self.state = ReviewState::AwaitingReveal;
                    debug!("card {} prompt finished, clock started", self.current);
                }
                ReviewState::Revealed | ReviewState::AwaitingPlay => {}
            },
            PlaybackSignal::Failed(e) => {
                self.play_queued = false;
                if self.state == ReviewState::Playing {
                    info!("card {} has no usable audio ({}), waiting for reveal", self.current, e);
                    self.state = ReviewState::AwaitingReveal;
                }
            }
        }
    }

    /// Stops the clock and records the sample, if there is one, then shows
    /// the answer.
    pub fn reveal(&mut self, now: DateTime<Utc>) {
        if self.state == ReviewState::Revealed {
            return;
        }
        self.play_queued = false;

        match self.tracker.stop_clock(now) {
            Some(seconds) => {
                if self.store.record_response(self.current, seconds) {
                    self.total_responses += 1;
                    self.last_reaction = Some(seconds);
                    info!(
                        "card {} answered in {:.2}s ({} responses, mean {:.2}s)",
                        self.current,
                        seconds,
                        self.total_responses,
                        self.store.mean_reaction_time().unwrap_or(0.0)
                    );
                    self.store.log_summary();
                }
            }
            None => debug!("card {} revealed before its prompt finished", self.current),
        }

        self.state = ReviewState::Revealed;
    }

    pub fn advance(&mut self) -> Result<(), DrillError> {
        self.show_next_card()
    }

    /// Releases the audio of the current card.
    pub fn shutdown(&mut self) {
        self.playback.release();
    }

    pub fn view(&self) -> SessionView {
        let card = self.current_card();
        let mean = self.mean_reaction_time();
        SessionView {
            card_id: self.current,
            prompt: card.map(|c| c.prompt.clone()).unwrap_or_else(|| PromptRef::new("")),
            answer: card
                .filter(|_| self.state == ReviewState::Revealed)
                .map(|c| c.answer.clone()),
            state: self.state,
            playback: self.playback.state(),
            can_play: matches!(self.playback.state(), PlaybackState::Ready | PlaybackState::Ended),
            error: self.playback.error().map(|e| e.to_string()),
            primary_label: feedback::primary_label(self.state),
            last_reaction: self.last_reaction,
            total_responses: self.total_responses,
            mean_reaction_time: mean,
            stats: StatsLine::new(self.total_responses, mean),
        }
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.store.get(self.current)
    }

    pub fn current_id(&self) -> CardId {
        self.current
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn window(&self) -> &RecencyWindow {
        &self.window
    }

    pub fn playback(&self) -> &PlaybackController<B> {
        &self.playback
    }

    pub fn total_responses(&self) -> usize {
        self.total_responses
    }

    /// Read from the store after each committed response, never cached.
    pub fn mean_reaction_time(&self) -> Option<f64> {
        self.store.mean_reaction_time()
    }

    fn request_play(&mut self) {
        match self.playback.state() {
            PlaybackState::Loading => {
                debug!("card {} still buffering, play queued", self.current);
                self.play_queued = true;
                self.state = ReviewState::Playing;
            }
            PlaybackState::Ready | PlaybackState::Ended => self.start_playback(),
            PlaybackState::Playing => self.state = ReviewState::Playing,
            PlaybackState::Idle | PlaybackState::Error => {
                debug!("card {} has no playable audio", self.current);
                self.state = ReviewState::AwaitingReveal;
            }
        }
    }

    fn start_playback(&mut self) {
        match self.playback.play() {
            Ok(()) => self.state = ReviewState::Playing,
            Err(e) => {
                info!("card {} could not be played: {}", self.current, e);
                self.state = ReviewState::AwaitingReveal;
            }
        }
    }

    fn show_next_card(&mut self) -> Result<(), DrillError> {
        let next = self.pick_next()?;
        self.current = next;
        self.tracker.reset();
        self.play_queued = false;
        self.last_reaction = None;
        self.state = ReviewState::AwaitingPlay;

        if let Some(card) = self.store.get(next) {
            let prompt = card.prompt.clone();
            self.playback.load(&prompt);
        }
        debug!("showing card {}, recent {:?}", next, self.window.ids());

        if self.options.autoplay {
            self.request_play();
        }
        Ok(())
    }

    fn pick_next(&mut self) -> Result<CardId, DrillError> {
        loop {
            match srs::select_next(self.store.snapshot(), &self.window, &mut self.rng) {
                Selection::Chosen { card, window } => {
                    self.window = window;
                    return Ok(card);
                }
                Selection::Retry { window } => {
                    debug!("every card was shown recently, clearing recency window");
                    self.window = window;
                }
                Selection::EmptyDeck => return Err(DrillError::EmptyDeck),
            }
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
