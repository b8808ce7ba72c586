use crate::error::DrillError;
use crate::models::{Card, CardId, PromptRef};
use log::{debug, warn};
use std::collections::HashSet;

/// One reaction time, kept for the session-wide aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub card_id: CardId,
    pub seconds: f64,
}

/// Holds the deck and its scheduling state for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct CardStore {
    cards: Vec<Card>,
    samples: Vec<Sample>,
}

impl CardStore {
    pub fn new(cards: Vec<Card>) -> Result<Self, DrillError> {
        if cards.is_empty() {
            return Err(DrillError::EmptyDeck);
        }

        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id) {
                return Err(DrillError::DuplicateCardId(card.id));
            }
        }

        Ok(Self {
            cards,
            samples: Vec::new(),
        })
    }

    /// Builds a deck from ordered (answer, prompt) pairs, numbering ids from 1.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, DrillError>
    where
        I: IntoIterator<Item = (S, PromptRef)>,
        S: Into<String>,
    {
        let cards = pairs
            .into_iter()
            .zip(1..)
            .map(|((answer, prompt), id)| Card::new(id, prompt, answer))
            .collect();
        Self::new(cards)
    }

    /// Records a reaction time against a card. Unknown ids are ignored and
    /// reported as `false`; this runs from event callbacks and must never fail.
    pub fn record_response(&mut self, card_id: CardId, seconds: f64) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == card_id) else {
            warn!("ignoring reaction time {:.3}s for unknown card {}", seconds, card_id);
            return false;
        };

        card.record(seconds);
        debug!(
            "card {} recorded {:.3}s, weight now {:.3}",
            card_id, seconds, card.weight
        );
        self.samples.push(Sample { card_id, seconds });
        true
    }

    pub fn snapshot(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Every sample recorded this session, in order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Mean over every sample recorded this session, including ones already
    /// evicted from a card's history. Computed on each call.
    pub fn mean_reaction_time(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.seconds).sum();
        Some(sum / self.samples.len() as f64)
    }

    pub fn log_summary(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        debug!("Current deck:");
        for card in &self.cards {
            let history: Vec<String> = card
                .reaction_times
                .iter()
                .map(|t| format!("{:.2}", t))
                .collect();
            debug!("Card {}:", card.id);
            debug!("  Answer: {}", card.answer);
            debug!("  Weight: {:.3}", card.weight);
            debug!("  Reaction time history: [{}]", history.join(", "));
            debug!(
                "  Mean reaction time: {:.2} seconds",
                card.mean_reaction_time().unwrap_or(0.0)
            );
        }
    }
}
