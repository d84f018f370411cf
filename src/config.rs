use std::{env, time::SystemTime};

use anyhow::{Context, Result};

use crate::{choreography::ChoreographyConfig, clock::DEFAULT_FPS, field::FieldConfig};

pub const SEED_VAR: &str = "CONFETTI_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Confetti Cannon".to_owned(),
            width: 960,
            height: 540,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub window: WindowConfig,
    pub field: FieldConfig,
    pub choreography: ChoreographyConfig,
    pub target_fps: f64,
    /// Fixed RNG seed. Time-seeded when `None`.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            field: FieldConfig::default(),
            choreography: ChoreographyConfig::default(),
            target_fps: DEFAULT_FPS,
            seed: None,
        }
    }
}

impl Config {
    /// Defaults, with the seed taken from `CONFETTI_SEED` when set.
    pub fn from_env() -> Result<Self> {
        let seed = match env::var(SEED_VAR) {
            Ok(value) => Some(parse_seed(&value)?),
            Err(env::VarError::NotPresent) => None,
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", SEED_VAR)),
        };
        Ok(Self {
            seed,
            ..Default::default()
        })
    }

    pub fn seed_or_now(&self) -> Result<u64> {
        match self.seed {
            Some(seed) => Ok(seed),
            None => Ok(SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .context("System clock is before the Unix epoch")?
                .as_millis() as _),
        }
    }
}

fn parse_seed(value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be an unsigned integer, got {:?}", SEED_VAR, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed() {
        assert_eq!(parse_seed(" 1234 ").unwrap(), 1234);
        assert!(parse_seed("-1").is_err());
        assert!(parse_seed("confetti").is_err());
    }

    #[test]
    fn explicit_seed_wins() {
        let config = Config {
            seed: Some(77),
            ..Default::default()
        };
        assert_eq!(config.seed_or_now().unwrap(), 77);
    }

    #[test]
    fn defaults_match_burst_rules() {
        let config = Config::default();
        assert_eq!(config.field.burst_size, 40);
        assert_eq!(config.field.max_population, None);
        assert_eq!(config.choreography.random_probability, 0.2);
    }
}
