//! Process-lifetime settings for the simulation.
//!
//! All knobs are constant once the process starts: phase durations drive
//! the debate pacing, the poll interval drives the autonomy loop, and the
//! seed makes every decision path reproducible.

use serde::{Deserialize, Serialize};

/// Settings loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Anthropic API key (empty disables the live client).
    pub claude_api_key: String,
    /// Model identifier for the messages API.
    pub claude_model: String,
    /// Default max_tokens for generation calls.
    pub claude_max_tokens: u32,

    /// Proposal phase display duration in seconds.
    pub proposal_phase_secs: u64,
    /// Challenge phase total duration in seconds (split across challengers).
    pub challenge_phase_secs: u64,
    /// Voting phase total duration in seconds (split across voters).
    pub voting_phase_secs: u64,
    /// Result phase display duration in seconds.
    pub result_phase_secs: u64,
    /// Pause between cycles in seconds.
    pub cycle_pause_secs: u64,
    /// Backoff after a failed cycle in seconds.
    pub cycle_backoff_secs: u64,

    /// Autonomy polling interval in seconds.
    pub autonomy_poll_secs: u64,

    /// Seed for all decision RNGs. None seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            claude_api_key: String::new(),
            claude_model: "claude-sonnet-4-20250514".to_string(),
            claude_max_tokens: 2000,
            proposal_phase_secs: 15,
            challenge_phase_secs: 20,
            voting_phase_secs: 15,
            result_phase_secs: 10,
            cycle_pause_secs: 2,
            cycle_backoff_secs: 5,
            autonomy_poll_secs: 5,
            rng_seed: None,
        }
    }
}

impl Settings {
    /// Create settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("PANTHEON_CLAUDE_API_KEY") {
            config.claude_api_key = key;
        }
        if let Ok(model) = std::env::var("PANTHEON_CLAUDE_MODEL") {
            config.claude_model = model;
        }
        if let Ok(val) = std::env::var("PANTHEON_CLAUDE_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                config.claude_max_tokens = n;
            }
        }
        if let Ok(val) = std::env::var("PANTHEON_PROPOSAL_PHASE_SECS") {
            if let Ok(n) = val.parse() {
                config.proposal_phase_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PANTHEON_CHALLENGE_PHASE_SECS") {
            if let Ok(n) = val.parse() {
                config.challenge_phase_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PANTHEON_VOTING_PHASE_SECS") {
            if let Ok(n) = val.parse() {
                config.voting_phase_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PANTHEON_RESULT_PHASE_SECS") {
            if let Ok(n) = val.parse() {
                config.result_phase_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PANTHEON_AUTONOMY_POLL_SECS") {
            if let Ok(n) = val.parse() {
                config.autonomy_poll_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PANTHEON_RNG_SEED") {
            if let Ok(n) = val.parse() {
                config.rng_seed = Some(n);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.proposal_phase_secs, 15);
        assert_eq!(settings.challenge_phase_secs, 20);
        assert_eq!(settings.voting_phase_secs, 15);
        assert_eq!(settings.autonomy_poll_secs, 5);
        assert!(settings.rng_seed.is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.claude_model, settings.claude_model);
        assert_eq!(parsed.cycle_pause_secs, 2);
    }
}
