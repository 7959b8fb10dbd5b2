use crate::error::TrackerError;
use crate::models::sample::Sample;
use crate::models::session::{Observation, SessionMode, SessionState};
use crate::ranks::{self, RankTier};
use crate::services::store::SessionStore;

/// The tracking state machine. An engine value only exists in the Tracking
/// state: `initialize` is the single Uninitialized -> Tracking transition,
/// and nothing transitions back (termination is the process stopping).
pub struct TrackerEngine {
    state: SessionState,
    store: SessionStore,
}

impl TrackerEngine {
    pub fn initialize(
        store: SessionStore,
        mode: SessionMode,
        first_sample: &Sample,
    ) -> Result<Self, TrackerError> {
        let state = store.initialize(mode, first_sample)?;
        Ok(TrackerEngine { state, store })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// One fetch-compute-persist cycle. The delta slot is only rewritten
    /// when the value actually changed.
    pub fn tick(&mut self, sample: &Sample) -> Result<Observation, TrackerError> {
        // Negative LP is upstream data corruption; nothing below may trust it,
        // not even a reported rank name without an LP band.
        if sample.total_lp < 0 {
            return Err(TrackerError::OutOfRange(sample.total_lp));
        }

        let new_delta = sample.total_lp - self.state.baseline_lp;
        if new_delta != self.state.session_delta {
            self.store.write_delta(new_delta)?;
            self.state.session_delta = new_delta;
        }

        let tier = self.resolve_tier(sample)?;
        let lp_to_next_tier = ranks::lp_to_next_tier_boundary(sample.total_lp);
        let lp_to_next_rank = ranks::lp_to_next_rank(tier, sample.total_lp);
        self.store.write_next_rank(lp_to_next_rank)?;
        self.state.lp_to_next_rank = lp_to_next_rank;

        Ok(Observation {
            session_delta: self.state.session_delta,
            sample: sample.clone(),
            tier,
            lp_to_next_tier,
            lp_to_next_rank,
        })
    }

    /// Trust the API's own rank name when it has one (Predator cannot be
    /// derived from LP alone). A reported band that no longer contains the
    /// LP means the name is stale across a promotion or demotion, so
    /// re-resolve from the LP before doing next-rank math.
    fn resolve_tier(&self, sample: &Sample) -> Result<RankTier, TrackerError> {
        match RankTier::from_api_name(&sample.rank_name) {
            Some(tier) => match tier.lp_range() {
                Some((min, max)) if sample.total_lp < min || sample.total_lp > max => {
                    log::debug!(
                        "reported rank {} does not contain {} LP, re-resolving",
                        tier.name(),
                        sample.total_lp
                    );
                    ranks::tier_for(sample.total_lp)
                }
                _ => Ok(tier),
            },
            None => ranks::tier_for(sample.total_lp),
        }
    }
}
