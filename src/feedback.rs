use std::fmt;

use crate::app::ReviewState;
use crate::playback::PlaybackState;

/// Responses needed before the average reaction time is shown.
pub const STATS_THRESHOLD: usize = 5;

/// The rolling statistics line shown under the card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsLine {
    Pending { remaining: usize },
    Mean(f64),
}

impl StatsLine {
    pub fn new(total_responses: usize, mean: Option<f64>) -> Self {
        match mean {
            Some(mean) if total_responses >= STATS_THRESHOLD => {
                StatsLine::Mean((mean * 100.0).round() / 100.0)
            }
            _ => StatsLine::Pending {
                remaining: STATS_THRESHOLD.saturating_sub(total_responses).max(1),
            },
        }
    }
}

impl fmt::Display for StatsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsLine::Pending { remaining: 1 } => {
                write!(f, "1 more response needed to see the average")
            }
            StatsLine::Pending { remaining } => {
                write!(f, "{} more responses needed to see the average", remaining)
            }
            StatsLine::Mean(mean) => write!(f, "Average reaction time: {}s", mean),
        }
    }
}

pub fn primary_label(state: ReviewState) -> &'static str {
    match state {
        ReviewState::AwaitingPlay => "Play audio",
        ReviewState::Playing | ReviewState::AwaitingReveal => "Show answer",
        ReviewState::Revealed => "Next card",
    }
}

pub fn playback_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "no audio",
        PlaybackState::Loading => "loading...",
        PlaybackState::Ready => "ready",
        PlaybackState::Playing => "playing",
        PlaybackState::Ended => "played",
        PlaybackState::Error => "unavailable",
    }
}
