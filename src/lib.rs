//! Confetti bursts: a small per-frame particle engine and the pieces that
//! put it on screen.
//!
//! [`field::ParticleField`] owns the particles, [`clock::SimulationClock`]
//! advances and draws them once per repaint, and anything implementing
//! [`canvas::Canvas`] can receive the drawing.

pub mod canvas;
pub mod choreography;
pub mod clock;
pub mod config;
pub mod field;
pub mod palette;
pub mod particle;
pub mod renderer;
pub mod viewport;

pub use canvas::Canvas;
pub use clock::SimulationClock;
pub use field::{FieldConfig, ParticleField};
pub use particle::Particle;
