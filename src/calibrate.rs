//! Picks a cost factor against a wall-clock budget.

use std::time::Duration;

use tracing::debug;

use crate::config::MAX_COST;
use crate::engine::Engine;
use crate::password::PasswordHash;
use crate::primitive::{Clock, HashPrimitive, RandomSource, SystemClock};

/// Probes costs 1, 2, 3, ... up to the engine's `max_probe_cost` (never past
/// [`MAX_COST`], where salt generation clamps), timing a full
/// [`PasswordHash::create`] for each.
///
/// [`calibrate`](Self::calibrate) returns the last cost whose probe stayed
/// within the ceiling. Timing is measured after the fact: a single slow probe
/// is never interrupted.
pub struct Calibrator<'e, P, R, C = SystemClock> {
    engine: &'e Engine<P, R>,
    clock: C,
}

impl<'e, P, R> Calibrator<'e, P, R, SystemClock>
where
    P: HashPrimitive,
    R: RandomSource,
{
    pub fn new(engine: &'e Engine<P, R>) -> Self {
        Self::with_clock(engine, SystemClock::new())
    }
}

impl<'e, P, R, C> Calibrator<'e, P, R, C>
where
    P: HashPrimitive,
    R: RandomSource,
    C: Clock,
{
    pub fn with_clock(engine: &'e Engine<P, R>, clock: C) -> Self {
        Calibrator { engine, clock }
    }

    /// Highest cost whose hash took no more than `ceiling_ms` milliseconds.
    ///
    /// Floors at 1 when even the first probe overshoots. Returns the search
    /// bound, capped at [`MAX_COST`], when no probe does. A failing probe ends the search like an
    /// overshoot.
    pub fn calibrate(&self, ceiling_ms: u64) -> u32 {
        let ceiling = Duration::from_millis(ceiling_ms);
        let config = self.engine.config();
        let bound = config.max_probe_cost.min(MAX_COST);

        for cost in 1..=bound {
            let started = self.clock.now();
            let probe =
                PasswordHash::create(self.engine, &config.probe_secret, i64::from(cost));
            let elapsed = self.clock.now().saturating_sub(started);
            debug!(cost, elapsed_ms = elapsed.as_millis() as u64, "calibration probe");

            let within = match probe {
                Ok(_) => elapsed <= ceiling,
                Err(e) => {
                    debug!(cost, error = %e, "calibration probe failed");
                    false
                }
            };
            if !within {
                let chosen = cost.saturating_sub(1).max(1);
                debug!(chosen, ceiling_ms, "calibration finished");
                return chosen;
            }
        }

        debug!(chosen = bound, ceiling_ms, "calibration exhausted search bound");
        bound
    }
}
