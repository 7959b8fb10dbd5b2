use crate::models::sample::Sample;
use crate::ranks::RankTier;

/// How a tracking session starts: `New` captures the baseline from the first
/// live sample, `Resume` reloads the baseline persisted by an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    New,
    Resume,
}

/// Durable record of one tracking session. Mutated only by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Total LP when tracking started. Set once, never mutated in-session.
    pub baseline_lp: i64,
    /// Signed change since baseline, recomputed each tick (never accumulated).
    pub session_delta: i64,
    pub lp_to_next_rank: i64,
}

/// Derived values emitted once per tick for the external sink.
#[derive(Debug, Clone)]
pub struct Observation {
    pub session_delta: i64,
    pub sample: Sample,
    pub tier: RankTier,
    pub lp_to_next_tier: i64,
    pub lp_to_next_rank: i64,
}
