use crate::models::CardId;
use crate::playback::PlaybackState;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrillError {
    /// The prompt audio could not be buffered.
    #[error("failed to load audio: {0}")]
    AssetLoad(String),

    /// The prompt audio failed while playing.
    #[error("failed to play audio: {0}")]
    Playback(String),

    #[error("audio cannot be played while {0}")]
    NotPlayable(PlaybackState),

    #[error("the deck has no cards")]
    EmptyDeck,

    #[error("card id {0} appears more than once in the deck")]
    DuplicateCardId(CardId),
}
