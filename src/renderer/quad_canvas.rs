use glam::{Affine2, Vec2};

use crate::{canvas::Canvas, palette::Color};

use super::confetti::QuadInstance;

/// Canvas that turns each filled rectangle into a GPU quad instance.
pub struct QuadCanvas {
    transform: Affine2,
    stack: Vec<Affine2>,
    instances: Vec<QuadInstance>,
}

impl Default for QuadCanvas {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
            instances: Vec::new(),
        }
    }
}

impl QuadCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[QuadInstance] {
        &self.instances
    }
}

impl Canvas for QuadCanvas {
    fn clear(&mut self) {
        self.instances.clear();
        self.stack.clear();
        self.transform = Affine2::IDENTITY;
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
        let transform =
            self.transform * Affine2::from_translation(min) * Affine2::from_scale(size);
        self.instances.push(QuadInstance::new(transform, color));
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::vec2;

    use super::*;
    use crate::{palette::CYAN, particle::Particle};

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn particle_becomes_centered_quad() {
        let mut canvas = QuadCanvas::new();
        Particle::from_state(vec2(100., 50.), Vec2::ZERO, 8., CYAN).render(&mut canvas);

        assert_eq!(canvas.instances().len(), 1);
        let quad = canvas.instances()[0];
        assert!(close(quad.corner(Vec2::ZERO), vec2(96., 46.)));
        assert!(close(quad.corner(Vec2::ONE), vec2(104., 54.)));
        assert!(close(quad.corner(Vec2::splat(0.5)), vec2(100., 50.)));
    }

    #[test]
    fn rotation_turns_quad_about_its_center() {
        let mut canvas = QuadCanvas::new();
        canvas.save();
        canvas.translate(vec2(10., 10.));
        canvas.rotate(FRAC_PI_2);
        canvas.fill_rect(vec2(-1., -1.), vec2(2., 2.), CYAN);
        canvas.restore();

        let quad = canvas.instances()[0];
        assert!(close(quad.corner(Vec2::splat(0.5)), vec2(10., 10.)));
        // The local (-1, -1) corner lands at (11, 9) after a quarter turn.
        assert!(close(quad.corner(Vec2::ZERO), vec2(11., 9.)));
    }

    #[test]
    fn clear_drops_instances() {
        let mut canvas = QuadCanvas::new();
        canvas.fill_rect(Vec2::ZERO, Vec2::ONE, CYAN);
        canvas.clear();
        assert!(canvas.instances().is_empty());
    }
}
