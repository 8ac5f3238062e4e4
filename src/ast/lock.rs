//! Lock request types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Requested lock strength, ordered by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    #[default]
    None,
    Read,
    Optimistic,
    OptimisticForceIncrement,
    Write,
    UpgradeNoWait,
    UpgradeSkipLocked,
    PessimisticRead,
    PessimisticWrite,
    PessimisticForceIncrement,
}

impl LockMode {
    fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Read => 5,
            Self::Optimistic => 6,
            Self::OptimisticForceIncrement => 7,
            Self::Write | Self::UpgradeNoWait | Self::UpgradeSkipLocked => 10,
            Self::PessimisticRead => 12,
            Self::PessimisticWrite => 13,
            Self::PessimisticForceIncrement => 17,
        }
    }

    pub fn greater_than(self, other: LockMode) -> bool {
        self.level() > other.level()
    }

    /// Modes above READ take part in lock clause resolution.
    pub fn exceeds_read(self) -> bool {
        self.greater_than(LockMode::Read)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let mode = match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Self::None,
            "read" => Self::Read,
            "optimistic" => Self::Optimistic,
            "optimistic_force_increment" => Self::OptimisticForceIncrement,
            "write" => Self::Write,
            "upgrade_nowait" => Self::UpgradeNoWait,
            "upgrade_skiplocked" | "upgrade_skip_locked" => Self::UpgradeSkipLocked,
            "pessimistic_read" => Self::PessimisticRead,
            "pessimistic_write" => Self::PessimisticWrite,
            "pessimistic_force_increment" => Self::PessimisticForceIncrement,
            _ => return None,
        };
        Some(mode)
    }
}

/// How long a lock request may wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTimeout {
    #[default]
    WaitForever,
    NoWait,
    SkipLocked,
    Millis(u64),
}

/// Lock request for one query execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    pub lock_mode: LockMode,
    /// Overrides keyed by source alias.
    pub alias_specific: BTreeMap<String, LockMode>,
    pub timeout: LockTimeout,
    /// `Some(true)` forces follow-on locking, `Some(false)` forbids it.
    pub follow_on_locking: Option<bool>,
}

impl LockOptions {
    pub fn new(lock_mode: LockMode) -> Self {
        Self {
            lock_mode,
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>, mode: LockMode) -> Self {
        self.alias_specific.insert(alias.into(), mode);
        self
    }

    pub fn with_timeout(mut self, timeout: LockTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_follow_on_locking(mut self, follow_on: bool) -> Self {
        self.follow_on_locking = Some(follow_on);
        self
    }

    pub fn alias_lock_mode(&self, alias: &str) -> Option<LockMode> {
        self.alias_specific.get(alias).copied()
    }

    pub fn has_alias_specific_lock_modes(&self) -> bool {
        !self.alias_specific.is_empty()
    }

    /// True when nothing needs a database lock.
    pub fn is_empty(&self) -> bool {
        !self.lock_mode.exceeds_read()
            && self.alias_specific.values().all(|mode| !mode.exceeds_read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_levels() {
        assert!(LockMode::PessimisticWrite.greater_than(LockMode::PessimisticRead));
        assert!(!LockMode::Read.exceeds_read());
        assert!(LockMode::Optimistic.exceeds_read());
        assert_eq!(LockMode::from_name("pessimistic-write"), Some(LockMode::PessimisticWrite));

        let opts = LockOptions::new(LockMode::Read).with_alias("e", LockMode::PessimisticWrite);
        assert!(!opts.is_empty());
        assert_eq!(opts.alias_lock_mode("e"), Some(LockMode::PessimisticWrite));
    }
}
