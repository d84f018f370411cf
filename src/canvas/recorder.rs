use glam::{Affine2, Vec2};

use crate::palette::Color;

use super::Canvas;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect {
        transform: Affine2,
        min: Vec2,
        size: Vec2,
        color: Color,
    },
}

/// Canvas that keeps what was drawn instead of rasterizing it.
#[derive(Debug, Clone)]
pub struct Recorder {
    transform: Affine2,
    stack: Vec<Affine2>,
    commands: Vec<DrawCommand>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    /// Number of `save` calls without a matching `restore`.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Fill commands issued since the last clear.
    pub fn fills(&self) -> impl Iterator<Item = &DrawCommand> {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
    }
}

impl Canvas for Recorder {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Affine2::from_angle(angle);
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            transform: self.transform,
            min,
            size,
            color,
        });
    }
}
