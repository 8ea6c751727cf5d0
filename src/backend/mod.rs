//! Leaderboard and remote config boundary
//!
//! `ScoreService` is the contract of the remote service. `Backend` wraps one
//! and turns every failure into a safe default (cached leaderboard, built-in
//! rarities, maintenance off), so the game itself never sees an error.

pub mod leaderboard;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Catalog;

pub use leaderboard::{Leaderboard, MAX_HIGH_SCORES};
pub use memory::InMemoryService;

/// Scores above this are treated as tampered
pub const MAX_SCORE_VALUE: u64 = 99_999;
/// Player names are exactly this many characters
pub const NAME_LENGTH: usize = 3;

/// Remote call failures
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("admin credentials required")]
    Unauthorized,
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Invalid player name, caught before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must be exactly {NAME_LENGTH} characters, got {0}")]
    WrongLength(usize),
    #[error("name is blank")]
    Blank,
    #[error("invalid character {0:?} in name")]
    InvalidChar(char),
}

/// Validated three-character initials (A-Z, 0-9, space)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    /// Uppercase and validate raw input
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let name = raw.to_uppercase();
        let len = name.chars().count();
        if len != NAME_LENGTH {
            return Err(NameError::WrongLength(len));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == ' '))
        {
            return Err(NameError::InvalidChar(c));
        }
        if name.trim().is_empty() {
            return Err(NameError::Blank);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
    pub level: u32,
}

/// Remote tuning document: `{ "rarities": { "ice": 3, ... } }`
///
/// Values stay untyped so one bad entry cannot reject the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteGameConfig {
    #[serde(default)]
    pub rarities: BTreeMap<String, serde_json::Value>,
}

impl RemoteGameConfig {
    pub fn from_json(json: &str) -> Result<Self, BackendError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, BackendError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whole-number tiers in `u8` range; anything else is skipped
    pub fn tiers(&self) -> BTreeMap<String, u8> {
        self.rarities
            .iter()
            .filter_map(|(key, value)| {
                let tier = value
                    .as_f64()
                    .filter(|v| v.fract() == 0.0 && (0.0..=255.0).contains(v))
                    .map(|v| v as u8);
                if tier.is_none() {
                    log::warn!("Ignoring rarity override {key}={value}");
                }
                tier.map(|t| (key.clone(), t))
            })
            .collect()
    }

    /// Built-in catalog with this document's overrides applied
    pub fn catalog(&self) -> Catalog {
        Catalog::default().with_rarity_overrides(&self.tiers())
    }
}

/// Email/password pair gating admin mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Remote config/leaderboard contract
pub trait ScoreService {
    /// Best `MAX_HIGH_SCORES` entries, highest first
    fn fetch_high_scores(&mut self) -> Result<Vec<ScoreEntry>, BackendError>;

    /// Store a score (kept only if it beats the name's previous best) and
    /// return the name's 1-based leaderboard rank, if it is on the board
    fn save_high_score(
        &mut self,
        name: &PlayerName,
        score: u64,
        level: u32,
    ) -> Result<Option<usize>, BackendError>;

    fn fetch_game_config(&mut self) -> Result<Option<RemoteGameConfig>, BackendError>;

    fn fetch_maintenance(&mut self) -> Result<bool, BackendError>;

    fn wipe_scores(&mut self, creds: &AdminCredentials) -> Result<(), BackendError>;

    fn set_maintenance(&mut self, creds: &AdminCredentials, on: bool)
    -> Result<(), BackendError>;

    fn save_game_config(
        &mut self,
        creds: &AdminCredentials,
        config: &RemoteGameConfig,
    ) -> Result<(), BackendError>;
}

/// A service that is never reachable; everything runs from the local cache
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl Offline {
    fn err<T>() -> Result<T, BackendError> {
        Err(BackendError::Unavailable("offline".to_string()))
    }
}

impl ScoreService for Offline {
    fn fetch_high_scores(&mut self) -> Result<Vec<ScoreEntry>, BackendError> {
        Self::err()
    }

    fn save_high_score(
        &mut self,
        _name: &PlayerName,
        _score: u64,
        _level: u32,
    ) -> Result<Option<usize>, BackendError> {
        Self::err()
    }

    fn fetch_game_config(&mut self) -> Result<Option<RemoteGameConfig>, BackendError> {
        Self::err()
    }

    fn fetch_maintenance(&mut self) -> Result<bool, BackendError> {
        Self::err()
    }

    fn wipe_scores(&mut self, _creds: &AdminCredentials) -> Result<(), BackendError> {
        Self::err()
    }

    fn set_maintenance(
        &mut self,
        _creds: &AdminCredentials,
        _on: bool,
    ) -> Result<(), BackendError> {
        Self::err()
    }

    fn save_game_config(
        &mut self,
        _creds: &AdminCredentials,
        _config: &RemoteGameConfig,
    ) -> Result<(), BackendError> {
        Self::err()
    }
}

/// Settings resolved once at startup
#[derive(Debug, Clone)]
pub struct BootConfig {
    /// The game must not start while this is set
    pub maintenance: bool,
    pub catalog: Catalog,
}

/// Degrading wrapper around a `ScoreService`
#[derive(Debug)]
pub struct Backend<S> {
    service: S,
    cache: Leaderboard,
    online: bool,
}

impl<S: ScoreService> Backend<S> {
    /// Wrap `service`, starting from the locally persisted cache
    pub fn new(service: S) -> Self {
        Self::with_cache(service, Leaderboard::load())
    }

    pub fn with_cache(service: S, cache: Leaderboard) -> Self {
        Self {
            service,
            cache,
            online: true,
        }
    }

    /// Maintenance flag and rarity overrides
    pub fn boot(&mut self) -> BootConfig {
        let maintenance = match self.service.fetch_maintenance() {
            Ok(on) => on,
            Err(e) => {
                log::warn!("Maintenance check failed, assuming off: {e}");
                self.online = false;
                false
            }
        };

        let catalog = match self.service.fetch_game_config() {
            Ok(Some(config)) => {
                log::info!("Rarities loaded: {:?}", config.rarities);
                config.catalog()
            }
            Ok(None) => Catalog::default(),
            Err(e) => {
                log::warn!("Game config unavailable, using built-in rarities: {e}");
                self.online = false;
                Catalog::default()
            }
        };

        if maintenance {
            log::info!("Maintenance mode is on");
        }
        BootConfig {
            maintenance,
            catalog,
        }
    }

    /// Current leaderboard; the cached copy when the service is down
    pub fn high_scores(&mut self) -> Vec<ScoreEntry> {
        match self.service.fetch_high_scores() {
            Ok(entries) => {
                self.online = true;
                self.cache.replace(entries);
                self.cache.save();
            }
            Err(e) => {
                log::warn!("Failed to fetch scores, using cache: {e}");
                self.online = false;
            }
        }
        self.cache.entries.clone()
    }

    /// Best score on the board, 0 if unknown
    pub fn global_high_score(&mut self) -> u64 {
        self.high_scores().first().map_or(0, |e| e.score)
    }

    /// Validate and store a finished run, returning its 1-based rank
    ///
    /// The score is capped at `MAX_SCORE_VALUE`. When the service is down
    /// the run is merged into the local cache instead.
    pub fn submit_score(
        &mut self,
        raw_name: &str,
        score: u64,
        level: u32,
    ) -> Result<Option<usize>, NameError> {
        let name = PlayerName::parse(raw_name)?;
        let score = score.min(MAX_SCORE_VALUE);
        let level = level.max(1);

        match self.service.save_high_score(&name, score, level) {
            Ok(rank) => {
                log::info!("Score saved: {name} {score} (level {level})");
                self.online = true;
                self.high_scores();
                Ok(rank)
            }
            Err(e) => {
                log::warn!("Failed to save score, keeping it locally: {e}");
                self.online = false;
                let rank = self.cache.merge(name.as_str(), score, level);
                self.cache.save();
                Ok(rank)
            }
        }
    }

    pub fn admin_wipe_scores(&mut self, creds: &AdminCredentials) -> Result<(), BackendError> {
        self.service.wipe_scores(creds)?;
        self.cache.clear();
        self.cache.save();
        log::info!("All scores wiped");
        Ok(())
    }

    pub fn admin_set_maintenance(
        &mut self,
        creds: &AdminCredentials,
        on: bool,
    ) -> Result<(), BackendError> {
        self.service.set_maintenance(creds, on)?;
        log::info!("Maintenance set to {on}");
        Ok(())
    }

    pub fn admin_save_game_config(
        &mut self,
        creds: &AdminCredentials,
        config: &RemoteGameConfig,
    ) -> Result<(), BackendError> {
        self.service.save_game_config(creds, config)?;
        log::info!("Game config saved");
        Ok(())
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn cache(&self) -> &Leaderboard {
        &self.cache
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }
}
