//! Roll Metrics
//!
//! Counters for the roll provider, exported in Prometheus text format.

use crate::games::types::DieFace;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Prometheus-compatible metrics registry
#[derive(Clone)]
pub struct MetricsRegistry {
    started_at: Instant,
    pub rolls_total: Arc<AtomicU64>,
    /// Indexed by face value minus one
    pub rolls_by_face: Arc<[AtomicU64; 6]>,
    pub errors_total: Arc<AtomicU64>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            rolls_total: Arc::new(AtomicU64::new(0)),
            rolls_by_face: Arc::new(Default::default()),
            errors_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record one roll served
    pub fn record_roll(&self, face: DieFace) {
        self.rolls_total.fetch_add(1, Ordering::SeqCst);
        self.rolls_by_face[(face.value() - DieFace::MIN) as usize].fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn face_count(&self, face: DieFace) -> u64 {
        self.rolls_by_face[(face.value() - DieFace::MIN) as usize].load(Ordering::SeqCst)
    }

    /// Generate Prometheus metrics format
    pub fn to_prometheus_format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP dicebet_rolls_total Total number of dice rolls served\n\
             # TYPE dicebet_rolls_total counter\n\
             dicebet_rolls_total {}\n\n",
            self.rolls_total.load(Ordering::SeqCst)
        ));

        output.push_str(
            "# HELP dicebet_rolls_by_face_total Dice rolls served per face\n\
             # TYPE dicebet_rolls_by_face_total counter\n",
        );
        for face in DieFace::all() {
            output.push_str(&format!(
                "dicebet_rolls_by_face_total{{face=\"{}\"}} {}\n",
                face,
                self.face_count(face)
            ));
        }
        output.push('\n');

        output.push_str(&format!(
            "# HELP dicebet_errors_total Total number of error responses\n\
             # TYPE dicebet_errors_total counter\n\
             dicebet_errors_total {}\n\n",
            self.errors_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP dicebet_uptime_seconds Seconds since the server started\n\
             # TYPE dicebet_uptime_seconds gauge\n\
             dicebet_uptime_seconds {}\n",
            self.started_at.elapsed().as_secs()
        ));

        output
    }
}
