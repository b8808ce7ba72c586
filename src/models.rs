use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Weight every card starts with before any reaction time is recorded.
pub const DEFAULT_WEIGHT: f64 = 5.0;

/// Number of reaction times kept per card.
pub const HISTORY_LEN: usize = 3;

pub type CardId = u32;

/// Opaque handle to an audio asset. The core never looks inside it; the
/// audio backend decides what it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptRef(String);

impl PromptRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub prompt: PromptRef,
    pub answer: String,
    pub weight: f64,
    pub reaction_times: VecDeque<f64>, // seconds, oldest first
}

impl Card {
    pub fn new(id: CardId, prompt: PromptRef, answer: impl Into<String>) -> Self {
        Self::with_weight(id, prompt, answer, DEFAULT_WEIGHT)
    }

    pub fn with_weight(id: CardId, prompt: PromptRef, answer: impl Into<String>, weight: f64) -> Self {
        Self {
            id,
            prompt,
            answer: answer.into(),
            weight: weight.max(0.0),
            reaction_times: VecDeque::with_capacity(HISTORY_LEN + 1),
        }
    }

    /// Pushes a sample, evicts the oldest beyond `HISTORY_LEN` and sets the
    /// weight to the mean of what is left.
    pub fn record(&mut self, seconds: f64) {
        self.reaction_times.push_back(seconds);
        while self.reaction_times.len() > HISTORY_LEN {
            self.reaction_times.pop_front();
        }
        if let Some(mean) = self.mean_reaction_time() {
            self.weight = mean;
        }
    }

    pub fn mean_reaction_time(&self) -> Option<f64> {
        if self.reaction_times.is_empty() {
            return None;
        }
        let sum: f64 = self.reaction_times.iter().sum();
        Some(sum / self.reaction_times.len() as f64)
    }
}
