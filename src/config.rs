use anyhow::{bail, Context};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Deck manifest; the built-in deck is used when unset.
    pub deck: Option<PathBuf>,
    pub prompt_duration: Duration,
    pub load_delay: Duration,
    pub verify_assets: bool,
    pub autoplay: bool,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deck: None,
            prompt_duration: Duration::from_millis(1200),
            load_delay: Duration::from_millis(150),
            verify_assets: false,
            autoplay: false,
            seed: None,
            log_file: PathBuf::from("audio-drill.log"),
        }
    }
}

impl Config {
    /// Reads `DRILL_*` variables, after loading a `.env` file if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("failed to read .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let deck = lookup("DRILL_DECK").filter(|v| !v.is_empty()).map(PathBuf::from);

        let prompt_duration = parse::<u64, _>(&lookup, "DRILL_PROMPT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.prompt_duration);
        let load_delay = parse::<u64, _>(&lookup, "DRILL_LOAD_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.load_delay);

        // Asset checks only make sense for a real manifest.
        let verify_assets = parse_flag(&lookup, "DRILL_VERIFY_ASSETS")?.unwrap_or(deck.is_some());
        let autoplay = parse_flag(&lookup, "DRILL_AUTOPLAY")?.unwrap_or(defaults.autoplay);
        let seed = parse::<u64, _>(&lookup, "DRILL_SEED")?;
        let log_file = lookup("DRILL_LOG_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        Ok(Self {
            deck,
            prompt_duration,
            load_delay,
            verify_assets,
            autoplay,
            seed,
            log_file,
        })
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("invalid value {:?} for {}", raw, key))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> anyhow::Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => bail!("invalid value {:?} for {}, expected true or false", raw, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_manifest_turns_on_asset_checks() {
        let config = config_from(&[("DRILL_DECK", "deck/flashcards.json")]).unwrap();
        assert_eq!(config.deck, Some(PathBuf::from("deck/flashcards.json")));
        assert!(config.verify_assets);

        let config = config_from(&[
            ("DRILL_DECK", "deck/flashcards.json"),
            ("DRILL_VERIFY_ASSETS", "no"),
        ])
        .unwrap();
        assert!(!config.verify_assets);
    }

    #[test]
    fn test_numeric_and_flag_values() {
        let config = config_from(&[
            ("DRILL_PROMPT_MS", "2500"),
            ("DRILL_LOAD_MS", " 10 "),
            ("DRILL_AUTOPLAY", "TRUE"),
            ("DRILL_SEED", "42"),
            ("DRILL_LOG_FILE", "/tmp/drill.log"),
        ])
        .unwrap();

        assert_eq!(config.prompt_duration, Duration::from_millis(2500));
        assert_eq!(config.load_delay, Duration::from_millis(10));
        assert!(config.autoplay);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_file, PathBuf::from("/tmp/drill.log"));
    }

    #[test]
    fn test_bad_values_name_the_variable() {
        let err = config_from(&[("DRILL_PROMPT_MS", "fast")]).unwrap_err();
        assert!(err.to_string().contains("DRILL_PROMPT_MS"));

        let err = config_from(&[("DRILL_AUTOPLAY", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("DRILL_AUTOPLAY"));
    }
}
