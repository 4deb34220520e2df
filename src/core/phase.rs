//! Per-document build phases.
//!
//! ```text
//! idle → extracting → transforming → rewriting → (production: coalescing) → written
//! ```

use std::fmt;

use super::BuildMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Extracting,
    Transforming,
    Rewriting,
    Coalescing,
    Written,
}

impl BuildPhase {
    /// The phase that follows `self` in the given mode, `None` once written.
    pub const fn next(self, mode: BuildMode) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Extracting),
            Self::Extracting => Some(Self::Transforming),
            Self::Transforming => Some(Self::Rewriting),
            Self::Rewriting if mode.is_production() => Some(Self::Coalescing),
            Self::Rewriting | Self::Coalescing => Some(Self::Written),
            Self::Written => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Transforming => "transforming",
            Self::Rewriting => "rewriting",
            Self::Coalescing => "coalescing",
            Self::Written => "written",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracks one document's progress through the phases of one mode.
#[derive(Debug)]
pub struct PhaseTracker {
    mode: BuildMode,
    current: BuildPhase,
}

impl PhaseTracker {
    pub const fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            current: BuildPhase::Idle,
        }
    }

    #[inline]
    pub const fn current(&self) -> BuildPhase {
        self.current
    }

    /// Move to `phase`, which must be the successor of the current phase.
    pub fn enter(&mut self, phase: BuildPhase) -> anyhow::Result<()> {
        match self.current.next(self.mode) {
            Some(next) if next == phase => {
                self.current = phase;
                Ok(())
            }
            _ => anyhow::bail!(
                "invalid phase transition {} → {} ({} build)",
                self.current,
                phase,
                self.mode
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(mode: BuildMode) -> Vec<BuildPhase> {
        let mut phases = vec![BuildPhase::Idle];
        while let Some(next) = phases.last().and_then(|p| p.next(mode)) {
            phases.push(next);
        }
        phases
    }

    #[test]
    fn test_staging_skips_coalescing() {
        assert!(!walk(BuildMode::Staging).contains(&BuildPhase::Coalescing));
        assert_eq!(walk(BuildMode::Staging).last(), Some(&BuildPhase::Written));
    }

    #[test]
    fn test_production_coalesces_before_write() {
        let phases = walk(BuildMode::Production);
        assert_eq!(
            &phases[phases.len() - 2..],
            &[BuildPhase::Coalescing, BuildPhase::Written]
        );
    }

    #[test]
    fn test_tracker_rejects_skips() {
        let mut tracker = PhaseTracker::new(BuildMode::Staging);
        assert!(tracker.enter(BuildPhase::Rewriting).is_err());
        tracker.enter(BuildPhase::Extracting).unwrap();
        tracker.enter(BuildPhase::Transforming).unwrap();
        tracker.enter(BuildPhase::Rewriting).unwrap();
        assert!(tracker.enter(BuildPhase::Coalescing).is_err());
        tracker.enter(BuildPhase::Written).unwrap();
        assert_eq!(tracker.current(), BuildPhase::Written);
    }
}
