use crate::consts::{self, police, traffic};

/// How radar contact with the player is punished.
///
/// The warning flow needs product confirmation of the exact trigger rule;
/// both variants are kept so the decision stays a configuration change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrestPolicy {
    /// First radar contact ends the run.
    Immediate,
    /// Radar contact issues a warning and freezes the arresting officer;
    /// strikes past the limit end the run.
    WarnThenBust { max_warnings: u32 },
}

/// Race-wide settings.
#[derive(Clone, Copy, Debug)]
pub struct RaceConfig {
    /// Laps to finish a circuit race. Ignored in open-world runs.
    pub total_laps: u32,
    pub num_police: usize,
    pub num_traffic: usize,
    pub arrest_policy: ArrestPolicy,
    /// Optional RNG seed for deterministic spawns and traffic speeds.
    /// If `None`, a random seed is used.
    pub rng_seed: Option<u64>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RaceConfig {
    pub const DEFAULT: Self = Self {
        total_laps: consts::TOTAL_LAPS,
        num_police: police::NUM_POLICE,
        num_traffic: traffic::NUM_TRAFFIC,
        arrest_policy: ArrestPolicy::WarnThenBust {
            max_warnings: police::MAX_WARNINGS,
        },
        rng_seed: None,
    };
}
