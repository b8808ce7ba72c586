use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::models::{Card, CardId, PromptRef, DEFAULT_WEIGHT};
use crate::store::CardStore;

pub struct PromptPair {
    pub question: &'static str,
    pub answer: &'static str,
    pub audio: &'static str,
}

pub const PROMPT_DATA: &[PromptPair] = &[
    PromptPair { question: "What is 2 plus 1?", answer: "3", audio: "audio_files/question_1.wav" },
    PromptPair { question: "What is 2 plus 2?", answer: "4", audio: "audio_files/question_2.wav" },
    PromptPair { question: "What is 2 plus 3?", answer: "5", audio: "audio_files/question_3.wav" },
    PromptPair { question: "What is 2 plus 4?", answer: "6", audio: "audio_files/question_4.wav" },
    PromptPair { question: "What is 2 plus 5?", answer: "7", audio: "audio_files/question_5.wav" },
    PromptPair { question: "What is 2 plus 6?", answer: "8", audio: "audio_files/question_6.wav" },
    PromptPair { question: "What is 2 plus 7?", answer: "9", audio: "audio_files/question_7.wav" },
    PromptPair { question: "What is 2 plus 8?", answer: "10", audio: "audio_files/question_8.wav" },
    PromptPair { question: "What is 2 plus 9?", answer: "11", audio: "audio_files/question_9.wav" },
    PromptPair { question: "What is 2 plus 10?", answer: "12", audio: "audio_files/question_10.wav" },
    PromptPair { question: "What is 2 plus 11?", answer: "13", audio: "audio_files/question_11.wav" },
    PromptPair { question: "What is 2 plus 12?", answer: "14", audio: "audio_files/question_12.wav" },
];

pub fn builtin_deck() -> Vec<Card> {
    PROMPT_DATA
        .iter()
        .zip(1..)
        .map(|(pair, id)| Card::new(id, PromptRef::new(pair.audio), pair.answer))
        .collect()
}

/// Spoken text of a built-in prompt, for front ends that cannot play sound.
pub fn transcript(prompt: &PromptRef) -> Option<&'static str> {
    PROMPT_DATA
        .iter()
        .find(|p| p.audio == prompt.as_str())
        .map(|p| p.question)
}

// One entry of a `flashcards.json` deck manifest. Any recorded
// `reactionTimes` in the file are ignored; every session starts fresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    id: CardId,
    audio_path: String,
    answer: String,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

pub fn parse_manifest(json: &str) -> anyhow::Result<Vec<Card>> {
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(json).context("deck manifest is not a valid card list")?;

    Ok(entries
        .into_iter()
        .map(|e| Card::with_weight(e.id, PromptRef::new(e.audio_path), e.answer, e.weight))
        .collect())
}

/// Reads a deck manifest. Relative audio paths are taken relative to the
/// manifest's own directory.
pub fn load_manifest(path: &Path) -> anyhow::Result<Vec<Card>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read deck manifest {}", path.display()))?;
    let mut cards = parse_manifest(&json)
        .with_context(|| format!("failed to parse deck manifest {}", path.display()))?;

    if let Some(base) = path.parent() {
        for card in &mut cards {
            let audio = Path::new(card.prompt.as_str());
            if audio.is_relative() {
                card.prompt = PromptRef::new(base.join(audio).to_string_lossy());
            }
        }
    }

    log::info!("loaded {} cards from {}", cards.len(), path.display());
    Ok(cards)
}

/// Builds the session deck from a manifest, or the built-in deck if none.
pub fn load_deck(manifest: Option<&Path>) -> anyhow::Result<CardStore> {
    let cards = match manifest {
        Some(path) => load_manifest(path)?,
        None => builtin_deck(),
    };
    let store = CardStore::new(cards).context("deck cannot be used")?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_deck() {
        let deck = builtin_deck();
        assert_eq!(deck.len(), 12);
        assert_eq!(deck[0].id, 1);
        assert_eq!(deck[0].answer, "3");
        assert_eq!(deck[11].answer, "14");
        assert!(deck.iter().all(|c| c.weight == DEFAULT_WEIGHT && c.reaction_times.is_empty()));
    }

    #[test]
    fn test_transcript_lookup() {
        let deck = builtin_deck();
        assert_eq!(transcript(&deck[1].prompt), Some("What is 2 plus 2?"));
        assert_eq!(transcript(&PromptRef::new("elsewhere.wav")), None);
    }

    #[test]
    fn test_parse_manifest_ignores_history() {
        let json = r#"[
            {"id": 1, "audioPath": "audio_files/question_1.wav", "answer": "3", "weight": 5, "reactionTimes": [1.2, 0.8]},
            {"id": 2, "audioPath": "audio_files/question_2.wav", "answer": "4"}
        ]"#;
        let cards = parse_manifest(json).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].prompt.as_str(), "audio_files/question_1.wav");
        assert!(cards[0].reaction_times.is_empty());
        assert_eq!(cards[1].weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_parse_manifest_rejects_garbage() {
        assert!(parse_manifest("{\"id\": 1}").is_err());
    }

    #[test]
    fn test_load_manifest_resolves_relative_audio() {
        let dir = std::env::temp_dir().join(format!("audio-drill-manifest-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flashcards.json");
        fs::write(
            &path,
            r#"[{"id": 3, "audioPath": "audio_files/q.wav", "answer": "5"}]"#,
        )
        .unwrap();

        let cards = load_manifest(&path).unwrap();
        let expected = dir.join("audio_files/q.wav");
        assert_eq!(cards[0].prompt.as_str(), expected.to_string_lossy().as_ref());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_deck_rejects_duplicate_ids() {
        let dir = std::env::temp_dir().join(format!("audio-drill-dupes-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flashcards.json");
        fs::write(
            &path,
            r#"[{"id": 1, "audioPath": "a.wav", "answer": "3"}, {"id": 1, "audioPath": "b.wav", "answer": "4"}]"#,
        )
        .unwrap();

        let err = load_deck(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("more than once"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_deck_defaults_to_builtin() {
        let store = load_deck(None).unwrap();
        assert_eq!(store.len(), PROMPT_DATA.len());
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let err = load_manifest(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read deck manifest"));
    }
}
