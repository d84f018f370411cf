use std::time::{Duration, Instant};

use log::{trace, warn};
use rand::Rng;

use crate::{canvas::Canvas, field::ParticleField};

/// Advances and draws the field once per repaint.
///
/// There is no stop operation; the clock lives as long as whatever keeps
/// calling `tick`.
pub struct SimulationClock<R> {
    field: ParticleField<R>,
    frame: u64,
}

impl<R: Rng> SimulationClock<R> {
    pub fn new(field: ParticleField<R>) -> Self {
        Self { field, frame: 0 }
    }

    pub fn field(&self) -> &ParticleField<R> {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField<R> {
        &mut self.field
    }

    /// Ticks completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Integrates, culls, then renders. Culling between the two means a
    /// particle that shrinks past the threshold is never drawn.
    pub fn tick(&mut self, canvas: &mut impl Canvas) {
        self.field.step();
        let culled = self.field.cull();
        self.field.render_all(canvas);
        self.frame += 1;

        trace!(
            "frame {}: culled {}, population {}",
            self.frame,
            culled,
            self.field.len()
        );
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pacing {
    Tick,
    WaitUntil(Instant),
}

/// Caps the live loop at a target frame rate.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last_tick: Option<Instant>,
}

pub const DEFAULT_FPS: f64 = 60.0;

impl FramePacer {
    /// A rate that is not a positive finite number falls back to
    /// `DEFAULT_FPS`.
    pub fn new(target_fps: f64) -> Self {
        let target_fps = if target_fps.is_finite() && target_fps > 0.0 {
            target_fps
        } else {
            warn!(
                "Invalid target frame rate {}, using {}",
                target_fps, DEFAULT_FPS
            );
            DEFAULT_FPS
        };
        Self {
            interval: Duration::from_secs_f64(1.0 / target_fps),
            last_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn poll(&mut self, now: Instant) -> Pacing {
        if let Some(last) = self.last_tick {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.interval {
                return Pacing::WaitUntil(last + self.interval);
            }
        }
        self.last_tick = Some(now);
        Pacing::Tick
    }
}
