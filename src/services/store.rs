use crate::error::TrackerError;
use crate::models::sample::Sample;
use crate::models::session::{SessionMode, SessionState};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Slot file names. Each holds a single plain integer so an external overlay
/// (e.g. an OBS text source) can read it directly.
pub const BASELINE_SLOT: &str = "root_lp.txt";
pub const DELTA_SLOT: &str = "current_lp_counter.txt";
pub const NEXT_RANK_SLOT: &str = "lp_to_next_rank.txt";

// The baseline slot is deliberately absent: zero-filling it would make a
// resume with no prior session load 0 instead of failing.
const OVERLAY_SLOTS: &[&str] = &[DELTA_SLOT, NEXT_RANK_SLOT];

/// Durable holder of the three session scalars. `root` is a path prefix,
/// e.g. "overlay/" or "C:/obs/apex_".
pub struct SessionStore {
    root: String,
}

impl SessionStore {
    pub fn new(root: impl Into<String>) -> Self {
        SessionStore { root: root.into() }
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.root, slot))
    }

    /// Create any missing overlay slot zero-filled, so the overlay never sees
    /// a missing file before the first tick. The baseline slot is only ever
    /// created by a new session.
    pub fn ensure_slots(&self) -> Result<(), TrackerError> {
        for slot in OVERLAY_SLOTS {
            let path = self.slot_path(slot);
            if !path.exists() {
                self.write_slot(slot, 0)?;
            }
        }
        Ok(())
    }

    /// A concurrent reader must never observe a torn value, so every write
    /// goes to a temp sibling first and is renamed over the slot.
    fn write_slot(&self, slot: &str, value: i64) -> Result<(), TrackerError> {
        let path = self.slot_path(slot);
        let tmp = PathBuf::from(format!("{}{}.tmp", self.root, slot));
        fs::write(&tmp, value.to_string())?;
        fs::rename(&tmp, &path)?;
        log::debug!("wrote {} = {}", path.display(), value);
        Ok(())
    }

    fn read_slot(&self, slot: &str) -> Result<Option<i64>, TrackerError> {
        let path = self.slot_path(slot);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TrackerError::Io(e)),
        };
        match contents.trim().parse::<i64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(TrackerError::Io(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("slot {} does not hold an integer: {:?}", path.display(), contents),
            ))),
        }
    }

    pub fn write_baseline(&self, value: i64) -> Result<(), TrackerError> {
        self.write_slot(BASELINE_SLOT, value)
    }

    pub fn write_delta(&self, value: i64) -> Result<(), TrackerError> {
        self.write_slot(DELTA_SLOT, value)
    }

    pub fn write_next_rank(&self, value: i64) -> Result<(), TrackerError> {
        self.write_slot(NEXT_RANK_SLOT, value)
    }

    pub fn load_baseline(&self) -> Result<i64, TrackerError> {
        match self.read_slot(BASELINE_SLOT) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(TrackerError::MissingBaseline(format!(
                "{} not found",
                self.slot_path(BASELINE_SLOT).display()
            ))),
            Err(TrackerError::Io(e)) if e.kind() == ErrorKind::InvalidData => Err(
                TrackerError::MissingBaseline(format!("baseline slot is corrupt: {}", e)),
            ),
            Err(e) => Err(e),
        }
    }

    pub fn initialize(
        &self,
        mode: SessionMode,
        first_sample: &Sample,
    ) -> Result<SessionState, TrackerError> {
        match mode {
            SessionMode::New => {
                self.write_baseline(first_sample.total_lp)?;
                self.write_delta(0)?;
                Ok(SessionState {
                    baseline_lp: first_sample.total_lp,
                    session_delta: 0,
                    lp_to_next_rank: 0,
                })
            }
            SessionMode::Resume => {
                let baseline_lp = self.load_baseline()?;
                let session_delta = self.read_slot(DELTA_SLOT)?.unwrap_or(0);
                let lp_to_next_rank = self.read_slot(NEXT_RANK_SLOT)?.unwrap_or(0);
                Ok(SessionState {
                    baseline_lp,
                    session_delta,
                    lp_to_next_rank,
                })
            }
        }
    }
}
