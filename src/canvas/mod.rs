//! Immediate-mode 2D drawing surface.
//!
//! Shaped after an HTML canvas context: a current transform that `save` and
//! `restore` push and pop, and filled rectangles drawn through it.

mod recorder;

pub use recorder::{DrawCommand, Recorder};

use glam::Vec2;

use crate::palette::Color;

pub trait Canvas {
    /// Wipes everything drawn since the last clear.
    fn clear(&mut self);

    fn save(&mut self);

    /// Pops the transform pushed by the matching `save`. Unbalanced calls are ignored.
    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2);

    /// Rotates subsequent drawing by `angle` radians about the current origin.
    fn rotate(&mut self, angle: f32);

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
}
