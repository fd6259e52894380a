use crate::domain::Coins;
use crate::orchestration::{PromptTimeouts, RewardSchedule, DEFAULT_FINISHED_RETENTION};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Optional CSV player catalogue; the built-in one is used when unset.
    pub roster_path: Option<String>,
    pub decision_timeout_secs: u64,
    pub lineup_timeout_secs: u64,
    pub forfeit_penalty: Coins,
    pub win_reward: Coins,
    pub participation_reward: Coins,
    pub starting_balance: Coins,
    /// Finished matches whose outcome and event log stay queryable.
    pub finished_retention: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", 8080u16, "must be a valid u16")?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let roster_path = env_map
            .get("ROSTER_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let decision_timeout_secs =
            parse_positive(&env_map, "DECISION_TIMEOUT_SECS", 60u64, "must be a positive integer")?;
        let lineup_timeout_secs =
            parse_positive(&env_map, "LINEUP_TIMEOUT_SECS", 120u64, "must be a positive integer")?;

        let forfeit_penalty = parse_coins(&env_map, "FORFEIT_PENALTY", 500)?;
        let win_reward = parse_coins(&env_map, "WIN_REWARD", 5000)?;
        let participation_reward = parse_coins(&env_map, "PARTICIPATION_REWARD", 1000)?;
        let starting_balance = parse_coins(&env_map, "STARTING_BALANCE", 50_000)?;
        let finished_retention = parse_positive(
            &env_map,
            "FINISHED_RETENTION",
            DEFAULT_FINISHED_RETENTION as u64,
            "must be a positive integer",
        )? as usize;

        Ok(Config {
            port,
            database_path,
            roster_path,
            decision_timeout_secs,
            lineup_timeout_secs,
            forfeit_penalty,
            win_reward,
            participation_reward,
            starting_balance,
            finished_retention,
        })
    }

    pub fn timeouts(&self) -> PromptTimeouts {
        PromptTimeouts {
            decision: Duration::from_secs(self.decision_timeout_secs),
            lineup: Duration::from_secs(self.lineup_timeout_secs),
        }
    }

    pub fn rewards(&self) -> RewardSchedule {
        RewardSchedule {
            win_reward: self.win_reward,
            participation_reward: self.participation_reward,
            forfeit_penalty: self.forfeit_penalty,
        }
    }
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    reason: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), reason.to_string())),
    }
}

fn parse_positive(
    env_map: &HashMap<String, String>,
    key: &str,
    default: u64,
    reason: &str,
) -> Result<u64, ConfigError> {
    let value = parse_or(env_map, key, default, reason)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(key.to_string(), reason.to_string()));
    }
    Ok(value)
}

// Coin amounts may be zero (reward disabled) but never negative.
fn parse_coins(
    env_map: &HashMap<String, String>,
    key: &str,
    default: Coins,
) -> Result<Coins, ConfigError> {
    let value = parse_or(env_map, key, default, "must be a non-negative integer")?;
    if value < 0 {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("must be a non-negative integer, got {}", value),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/arena.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.roster_path, None);
        assert_eq!(config.timeouts().decision, Duration::from_secs(60));
        assert_eq!(config.timeouts().lineup, Duration::from_secs(120));
        assert_eq!(config.rewards(), RewardSchedule::default());
        assert_eq!(config.starting_balance, 50_000);
        assert_eq!(config.finished_retention, 256);
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("DECISION_TIMEOUT_SECS".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "DECISION_TIMEOUT_SECS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_negative_penalty_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("FORFEIT_PENALTY".to_string(), "-10".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "FORFEIT_PENALTY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut env_map = setup_required_env();
        env_map.insert("ROSTER_PATH".to_string(), "players.csv".to_string());
        env_map.insert("LINEUP_TIMEOUT_SECS".to_string(), "30".to_string());
        env_map.insert("WIN_REWARD".to_string(), "0".to_string());
        env_map.insert("FINISHED_RETENTION".to_string(), "16".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.finished_retention, 16);
        assert_eq!(config.roster_path.as_deref(), Some("players.csv"));
        assert_eq!(config.timeouts().lineup, Duration::from_secs(30));
        assert_eq!(config.rewards().win_reward, 0);
    }
}
