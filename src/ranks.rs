use crate::error::TrackerError;

/// Predator is awarded by leaderboard position, not by LP.
pub const PREDATOR_LEADERBOARD_CUTOFF: i64 = 750;

/// Ranked tiers in ascending order. Every tier except Predator owns a fixed
/// inclusive LP band; Predator is leaderboard-based and has no upper LP bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RankTier {
    Rookie,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Predator,
}

const BANDED_TIERS: &[(RankTier, i64, i64)] = &[
    (RankTier::Rookie, 0, 3999),
    (RankTier::Bronze, 4000, 7999),
    (RankTier::Silver, 8000, 11999),
    (RankTier::Gold, 12000, 15999),
    (RankTier::Platinum, 16000, 19999),
    (RankTier::Diamond, 20000, 23999),
    (RankTier::Master, 24000, 27999),
];

impl RankTier {
    /// Map the API's rank name (case-insensitive) to a tier. The API reports
    /// the top tier as "Apex Predator".
    pub fn from_api_name(name: &str) -> Option<RankTier> {
        match name.trim().to_lowercase().as_str() {
            "rookie" => Some(RankTier::Rookie),
            "bronze" => Some(RankTier::Bronze),
            "silver" => Some(RankTier::Silver),
            "gold" => Some(RankTier::Gold),
            "platinum" => Some(RankTier::Platinum),
            "diamond" => Some(RankTier::Diamond),
            "master" => Some(RankTier::Master),
            "predator" | "apex predator" => Some(RankTier::Predator),
            _ => None,
        }
    }

    /// Inclusive LP range for banded tiers, None for Predator.
    pub fn lp_range(self) -> Option<(i64, i64)> {
        BANDED_TIERS
            .iter()
            .find(|(tier, _, _)| *tier == self)
            .map(|&(_, min, max)| (min, max))
    }

    pub fn name(self) -> &'static str {
        match self {
            RankTier::Rookie => "Rookie",
            RankTier::Bronze => "Bronze",
            RankTier::Silver => "Silver",
            RankTier::Gold => "Gold",
            RankTier::Platinum => "Platinum",
            RankTier::Diamond => "Diamond",
            RankTier::Master => "Master",
            RankTier::Predator => "Apex Predator",
        }
    }
}

/// Resolve a tier from an LP value by ascending range containment. LP above
/// the Master band resolves to Predator, the only tier left; negative LP is a
/// data-integrity fault, not something to clamp.
pub fn tier_for(lp: i64) -> Result<RankTier, TrackerError> {
    if lp < 0 {
        return Err(TrackerError::OutOfRange(lp));
    }
    for &(tier, min, max) in BANDED_TIERS {
        if lp >= min && lp <= max {
            return Ok(tier);
        }
    }
    Ok(RankTier::Predator)
}

/// LP still needed to cross the next 1000-point band. Tier-agnostic, used
/// purely for intra-tier progress display.
pub fn lp_to_next_tier_boundary(lp: i64) -> i64 {
    1000 - (lp % 1000)
}

/// LP needed to enter the next rank. Predator is terminal and returns 0.
pub fn lp_to_next_rank(tier: RankTier, lp: i64) -> i64 {
    match tier.lp_range() {
        Some((_, max)) => max - lp + 1,
        None => 0,
    }
}
