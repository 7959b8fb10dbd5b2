use crate::config::Config;
use crate::error::TrackerError;
use crate::models::session::{Observation, SessionMode};
use crate::services::engine::TrackerEngine;
use crate::services::fetcher::Fetcher;
use crate::services::store::SessionStore;
use crate::ranks::{RankTier, PREDATOR_LEADERBOARD_CUTOFF};
use chrono::Utc;
use std::time::Duration;

/// Drive the engine forever: fetch, tick, print, sleep. The pre-loop fetch
/// only seeds `initialize`; every terminal fetch error ends the loop and
/// propagates to the process boundary (there is no outer retry).
pub async fn run(cfg: &Config, fetcher: &Fetcher, store: SessionStore) -> Result<(), TrackerError> {
    let first_sample = fetcher.fetch().await?;
    let mode = if cfg.new { SessionMode::New } else { SessionMode::Resume };
    let mut engine = TrackerEngine::initialize(store, mode, &first_sample)?;
    println!(
        "Tracking {} on {} (baseline {} LP, polling every {} min)",
        cfg.user,
        cfg.platform,
        engine.state().baseline_lp,
        cfg.poll_interval_minutes
    );
    if mode == SessionMode::Resume {
        println!(
            "Resumed session: delta {}, {} LP to next rank at last tick",
            engine.state().session_delta,
            engine.state().lp_to_next_rank
        );
    }

    let interval = Duration::from_secs(cfg.poll_interval_minutes * 60);
    loop {
        let sample = fetcher.fetch().await?;
        let observation = engine.tick(&sample)?;
        print_observation(&observation);
        tokio::time::sleep(interval).await;
    }
}

/// Operator-facing per-tick output; the overlay itself reads the slot files.
fn print_observation(obs: &Observation) {
    println!("[{}]", Utc::now().format("%H:%M:%S"));
    println!("Current LP Gain/Loss: {}", obs.session_delta);
    println!("Online: {}", obs.sample.is_online);
    println!("Current State: {}", obs.sample.state_text);
    println!("Legend: {}", obs.sample.legend_name);
    println!("Rank: {} ({} LP)", obs.tier.name(), obs.sample.total_lp);
    println!("Total LP to next tier: {}", obs.lp_to_next_tier);
    if obs.tier == RankTier::Predator {
        println!("LP to next rank: n/a (top {} leaderboard)", PREDATOR_LEADERBOARD_CUTOFF);
    } else {
        println!("LP to next rank: {}", obs.lp_to_next_rank);
    }
}
