//! In-process `ScoreService` with the same rules as the hosted one
//!
//! Backs the native demo and the tests. `set_available(false)` makes every
//! call fail as if the network were down.

use std::collections::BTreeMap;

use super::{
    AdminCredentials, BackendError, MAX_HIGH_SCORES, MAX_SCORE_VALUE, NAME_LENGTH, PlayerName,
    RemoteGameConfig, ScoreEntry, ScoreService,
};

#[derive(Debug, Clone)]
pub struct InMemoryService {
    /// Best entry per name
    scores: BTreeMap<String, ScoreEntry>,
    config: Option<RemoteGameConfig>,
    maintenance: bool,
    admin: AdminCredentials,
    available: bool,
}

impl InMemoryService {
    pub fn new(admin: AdminCredentials) -> Self {
        Self {
            scores: BTreeMap::new(),
            config: None,
            maintenance: false,
            admin,
            available: true,
        }
    }

    /// Simulate an outage (or recovery)
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Seed the config document without going through admin auth
    pub fn set_game_config(&mut self, config: Option<RemoteGameConfig>) {
        self.config = config;
    }

    fn ensure_available(&self) -> Result<(), BackendError> {
        if self.available {
            Ok(())
        } else {
            Err(BackendError::Unavailable("connection refused".to_string()))
        }
    }

    fn authorize(&self, creds: &AdminCredentials) -> Result<(), BackendError> {
        self.ensure_available()?;
        if *creds == self.admin {
            Ok(())
        } else {
            Err(BackendError::Unauthorized)
        }
    }

    fn top(&self) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self.scores.values().cloned().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(b.level.cmp(&a.level)));
        entries.truncate(MAX_HIGH_SCORES);
        entries
    }
}

impl ScoreService for InMemoryService {
    fn fetch_high_scores(&mut self) -> Result<Vec<ScoreEntry>, BackendError> {
        self.ensure_available()?;
        Ok(self.top())
    }

    fn save_high_score(
        &mut self,
        name: &PlayerName,
        score: u64,
        level: u32,
    ) -> Result<Option<usize>, BackendError> {
        self.ensure_available()?;
        if score > MAX_SCORE_VALUE {
            return Err(BackendError::Rejected(format!("score {score} over cap")));
        }
        if name.as_str().chars().count() != NAME_LENGTH {
            return Err(BackendError::Rejected(format!("bad name {name}")));
        }

        let key = name.as_str().to_string();
        let improves = self.scores.get(&key).is_none_or(|e| score > e.score);
        if improves {
            self.scores.insert(
                key.clone(),
                ScoreEntry {
                    name: key.clone(),
                    score,
                    level,
                },
            );
        }

        Ok(self.top().iter().position(|e| e.name == key).map(|i| i + 1))
    }

    fn fetch_game_config(&mut self) -> Result<Option<RemoteGameConfig>, BackendError> {
        self.ensure_available()?;
        Ok(self.config.clone())
    }

    fn fetch_maintenance(&mut self) -> Result<bool, BackendError> {
        self.ensure_available()?;
        Ok(self.maintenance)
    }

    fn wipe_scores(&mut self, creds: &AdminCredentials) -> Result<(), BackendError> {
        self.authorize(creds)?;
        self.scores.clear();
        Ok(())
    }

    fn set_maintenance(&mut self, creds: &AdminCredentials, on: bool) -> Result<(), BackendError> {
        self.authorize(creds)?;
        self.maintenance = on;
        Ok(())
    }

    fn save_game_config(
        &mut self,
        creds: &AdminCredentials,
        config: &RemoteGameConfig,
    ) -> Result<(), BackendError> {
        self.authorize(creds)?;
        self.config = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> InMemoryService {
        InMemoryService::new(AdminCredentials {
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
        })
    }

    fn name(s: &str) -> PlayerName {
        match PlayerName::parse(s) {
            Ok(n) => n,
            Err(e) => panic!("bad test name {s}: {e}"),
        }
    }

    #[test]
    fn test_only_strictly_greater_overwrites() {
        let mut svc = service();
        svc.save_high_score(&name("AAA"), 500, 4).ok();
        svc.save_high_score(&name("AAA"), 500, 9).ok();
        svc.save_high_score(&name("AAA"), 400, 9).ok();
        let top = svc.fetch_high_scores().unwrap_or_default();
        assert_eq!(top.len(), 1);
        assert_eq!((top[0].score, top[0].level), (500, 4));
    }

    #[test]
    fn test_rejects_scores_over_cap() {
        let mut svc = service();
        assert!(matches!(
            svc.save_high_score(&name("AAA"), MAX_SCORE_VALUE + 1, 1),
            Err(BackendError::Rejected(_))
        ));
        assert!(svc.save_high_score(&name("AAA"), MAX_SCORE_VALUE, 1).is_ok());
    }

    #[test]
    fn test_rank_off_the_board() {
        let mut svc = service();
        for (i, n) in ["AAA", "BBB", "CCC", "DDD", "EEE"].iter().enumerate() {
            svc.save_high_score(&name(n), 1000 - i as u64 * 100, 1).ok();
        }
        assert_eq!(svc.save_high_score(&name("ZZZ"), 10, 1).ok(), Some(None));
        assert_eq!(svc.save_high_score(&name("YYY"), 950, 1).ok(), Some(Some(2)));
    }

    #[test]
    fn test_outage_fails_every_call() {
        let mut svc = service();
        svc.set_available(false);
        assert!(svc.fetch_high_scores().is_err());
        assert!(svc.fetch_maintenance().is_err());
        assert!(svc.fetch_game_config().is_err());
    }
}
