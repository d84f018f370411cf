use std::f32::consts::TAU;

use glam::{vec2, Vec2};
use rand::Rng;

use crate::{
    canvas::Canvas,
    palette::{self, Color},
};

pub const GRAVITY: f32 = 0.5;
pub const GRAVITY_SCALE: f32 = 0.1;
pub const DAMPENING: f32 = 0.96;
pub const SHRINK: f32 = 0.98;
/// Particles at or below this size are dead.
pub const MIN_SIZE: f32 = 0.5;

pub const MAX_SPEED: f32 = 7.5;
pub const MIN_INITIAL_SIZE: f32 = 3.;
pub const MAX_INITIAL_SIZE: f32 = 9.;
pub const MAX_ROTATION_SPEED: f32 = 0.1;

/// A single square of confetti.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub rotation: f32,
    color: Color,
    rotation_speed: f32,
    dampening: f32,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, origin: Vec2) -> Self {
        Self {
            position: origin,
            velocity: vec2(
                rng.gen_range(-MAX_SPEED..MAX_SPEED),
                rng.gen_range(-MAX_SPEED..MAX_SPEED),
            ),
            size: rng.gen_range(MIN_INITIAL_SIZE..MAX_INITIAL_SIZE),
            rotation: rng.gen_range(0.0..TAU),
            color: palette::pick(rng),
            rotation_speed: rng.gen_range(-MAX_ROTATION_SPEED..MAX_ROTATION_SPEED),
            dampening: DAMPENING,
        }
    }

    /// Particle with an explicit starting state and no spin.
    pub fn from_state(position: Vec2, velocity: Vec2, size: f32, color: Color) -> Self {
        Self {
            position,
            velocity,
            size,
            rotation: 0.,
            color,
            rotation_speed: 0.,
            dampening: DAMPENING,
        }
    }

    pub fn with_rotation_speed(mut self, rotation_speed: f32) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn dampening(&self) -> f32 {
        self.dampening
    }

    /// Advances one frame. Position moves with the velocity from before gravity
    /// and drag are applied.
    pub fn integrate(&mut self) {
        self.position += self.velocity;
        self.velocity.y += GRAVITY * GRAVITY_SCALE;
        self.velocity *= self.dampening;
        self.rotation += self.rotation_speed;
        self.size *= SHRINK;
    }

    pub fn is_alive(&self) -> bool {
        self.size > MIN_SIZE
    }

    pub fn render(&self, canvas: &mut impl Canvas) {
        canvas.save();
        canvas.translate(self.position);
        canvas.rotate(self.rotation);
        canvas.fill_rect(
            Vec2::splat(-self.size / 2.),
            Vec2::splat(self.size),
            self.color,
        );
        canvas.restore();
    }
}

/// Number of `integrate` calls after which a particle of `initial_size` is dead.
pub fn steps_to_death(initial_size: f32) -> u32 {
    if initial_size <= MIN_SIZE {
        return 0;
    }
    ((MIN_SIZE as f64 / initial_size as f64).ln() / (SHRINK as f64).ln()).ceil() as u32
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{
        canvas::{DrawCommand, Recorder},
        palette::{GOLD, PALETTE},
    };

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn construction_ranges() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let origin = vec2(120., 80.);
        for _ in 0..1000 {
            let p = Particle::new(&mut rng, origin);
            assert_eq!(p.position, origin);
            assert!(p.velocity.abs().max_element() <= MAX_SPEED);
            assert!((MIN_INITIAL_SIZE..MAX_INITIAL_SIZE).contains(&p.size));
            assert!((0.0..TAU).contains(&p.rotation));
            assert!(p.rotation_speed().abs() <= MAX_ROTATION_SPEED);
            assert_eq!(p.dampening(), DAMPENING);
            assert!(PALETTE.contains(&p.color()));
            assert!(p.is_alive());
        }
    }

    #[test]
    fn single_step_order_of_operations() {
        let mut p = Particle::from_state(Vec2::ZERO, vec2(10., 0.), 5., GOLD);
        p.integrate();
        assert!(close(p.position, vec2(10., 0.)));
        assert!(close(p.velocity, vec2(9.6, 0.048)));

        p.integrate();
        assert!(close(p.position, vec2(19.6, 0.048)));
    }

    #[test]
    fn size_shrinks_geometrically() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let mut p = Particle::new(&mut rng, Vec2::ZERO);
        for _ in 0..300 {
            let before = p.size;
            p.integrate();
            assert!(p.size <= before);
            assert!((p.size - before * SHRINK).abs() <= f32::EPSILON * before);
        }
    }

    #[test]
    fn rotation_advances_by_fixed_speed() {
        let mut p = Particle::from_state(Vec2::ZERO, Vec2::ZERO, 4., GOLD).with_rotation_speed(0.05);
        for _ in 0..4 {
            p.integrate();
        }
        assert!((p.rotation - 0.2).abs() < 1e-6);
        assert_eq!(p.color(), GOLD);
    }

    #[test]
    fn dies_after_closed_form_step_count() {
        for (size, expected) in [(9., 144), (3., 89), (5., 114)] {
            assert_eq!(steps_to_death(size), expected);

            let mut p = Particle::from_state(Vec2::ZERO, Vec2::ZERO, size, GOLD);
            for step in 1..=expected {
                p.integrate();
                assert_eq!(p.is_alive(), step < expected, "size {} step {}", size, step);
            }
        }
    }

    #[test]
    fn already_dead_size_needs_no_steps() {
        assert_eq!(steps_to_death(0.5), 0);
        assert!(!Particle::from_state(Vec2::ZERO, Vec2::ZERO, 0.5, GOLD).is_alive());
    }

    #[test]
    fn render_is_balanced_and_centered() {
        let mut canvas = Recorder::new();
        let p = Particle::from_state(vec2(30., 40.), Vec2::ZERO, 6., GOLD);
        p.render(&mut canvas);

        assert_eq!(canvas.depth(), 0);
        assert_eq!(canvas.transform(), glam::Affine2::IDENTITY);
        match canvas.commands() {
            [DrawCommand::FillRect {
                transform,
                min,
                size,
                color,
            }] => {
                assert_eq!(*min, vec2(-3., -3.));
                assert_eq!(*size, vec2(6., 6.));
                assert_eq!(*color, GOLD);
                assert!(close(transform.transform_point2(Vec2::ZERO), vec2(30., 40.)));
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }
}
