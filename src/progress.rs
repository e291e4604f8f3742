//! Records kept across solves: level, coins and personal bests.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_cap() -> Option<u32> {
    Some(100)
}

/// How many coins a solve is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardPolicy {
    pub base: u32,
    /// Time bonus before minutes are taken off.
    pub time_bonus: u32,
    pub time_penalty_per_minute: f64,
    pub move_bonus: u32,
    pub move_penalty: u32,
    /// Extra multiplier per level, applied to the sum of the above.
    pub level_multiplier: f64,
    pub level_bonus: u32,
    #[serde(default = "default_cap")]
    pub cap: Option<u32>,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            base: 50,
            time_bonus: 100,
            time_penalty_per_minute: 10.0,
            move_bonus: 200,
            move_penalty: 2,
            level_multiplier: 0.2,
            level_bonus: 5,
            cap: default_cap(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub time_bonus: u32,
    pub move_bonus: u32,
    pub level_bonus: u32,
    pub coins: u32,
}

impl RewardPolicy {
    pub fn reward(&self, level: u32, moves: u32, elapsed_ms: u64) -> Reward {
        let minutes = elapsed_ms as f64 / 60_000.0;
        let time_bonus =
            (f64::from(self.time_bonus) - minutes * self.time_penalty_per_minute).floor().max(0.0) as u32;
        let move_bonus = self
            .move_bonus
            .saturating_sub(moves.saturating_mul(self.move_penalty));
        let multiplier = 1.0 + f64::from(level) * self.level_multiplier;
        let level_bonus = level.saturating_mul(self.level_bonus);

        let earned = (f64::from(time_bonus + move_bonus + self.base) * multiplier).floor() as u32;
        let mut coins = earned.saturating_add(level_bonus);
        if let Some(cap) = self.cap {
            coins = coins.min(cap);
        }
        Reward {
            time_bonus,
            move_bonus,
            level_bonus,
            coins,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub level: u32,
    pub coins: u32,
    pub best_moves: Option<u32>,
    pub best_time_ms: Option<u64>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 1,
            coins: 0,
            best_moves: None,
            best_time_ms: None,
        }
    }
}

impl Progress {
    /// Pays out a solve at the current level, updates the records and moves
    /// up one level.
    pub fn record_solve(&mut self, policy: &RewardPolicy, moves: u32, elapsed_ms: u64) -> Reward {
        let reward = policy.reward(self.level, moves, elapsed_ms);
        if self.best_moves.map_or(true, |best| moves < best) {
            self.best_moves = Some(moves);
        }
        if self.best_time_ms.map_or(true, |best| elapsed_ms < best) {
            self.best_time_ms = Some(elapsed_ms);
        }
        self.level += 1;
        self.coins = self.coins.saturating_add(reward.coins);
        tracing::info!(level = self.level, coins = reward.coins, "solve recorded");
        reward
    }

    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Default::default());
        }
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
