use glam::{vec2, Vec2};
use log::{debug, warn};
use rand::Rng;

use crate::{
    canvas::Canvas,
    particle::Particle,
    viewport::{Size, Viewport},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    /// Particles appended by `spawn_burst`.
    pub burst_size: usize,
    /// Hard population ceiling. `None` leaves the field unbounded.
    pub max_population: Option<usize>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            burst_size: 40,
            max_population: None,
        }
    }
}

/// The live particles, with exclusive rights to add and remove them.
pub struct ParticleField<R> {
    particles: Vec<Particle>,
    rng: R,
    viewport: Viewport,
    config: FieldConfig,
}

impl<R: Rng> ParticleField<R> {
    pub fn new(rng: R, viewport: Viewport, config: FieldConfig) -> Self {
        Self {
            particles: Vec::new(),
            rng,
            viewport,
            config,
        }
    }

    /// Appends `count` particles at `(x, y)`.
    ///
    /// A missing, zero or NaN coordinate sends the whole burst to the viewport
    /// center. Returns how many particles were actually added, which is less
    /// than `count` only when a population ceiling is configured.
    pub fn spawn(&mut self, x: Option<f32>, y: Option<f32>, count: usize) -> usize {
        let origin = match (x.filter(|v| is_truthy(*v)), y.filter(|v| is_truthy(*v))) {
            (Some(x), Some(y)) => vec2(x, y),
            _ => self.viewport.center(),
        };

        let count = match self.config.max_population {
            Some(max) => {
                let room = max.saturating_sub(self.particles.len());
                if room < count {
                    warn!(
                        "Population ceiling {} reached, dropping {} of {} particles",
                        max,
                        count - room,
                        count
                    );
                }
                room.min(count)
            }
            None => count,
        };

        let rng = &mut self.rng;
        self.particles
            .extend((0..count).map(|_| Particle::new(&mut *rng, origin)));

        debug!(
            "Spawned {} particles at {:?}, population {}",
            count,
            origin,
            self.particles.len()
        );
        count
    }

    pub fn spawn_burst(&mut self, origin: Option<Vec2>) -> usize {
        self.spawn(
            origin.map(|o| o.x),
            origin.map(|o| o.y),
            self.config.burst_size,
        )
    }

    pub fn step(&mut self) {
        self.particles.iter_mut().for_each(Particle::integrate);
    }

    /// Drops dead particles and returns how many were removed.
    pub fn cull(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(Particle::is_alive);
        before - self.particles.len()
    }

    pub fn render_all(&self, canvas: &mut impl Canvas) {
        canvas.clear();
        for particle in &self.particles {
            particle.render(canvas);
        }
    }

    pub fn on_resize(&mut self, size: Size) {
        self.viewport = size.into();
        debug!("Viewport resized to {:?}", self.viewport);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, particle: Particle) {
        self.particles.push(particle);
    }
}

fn is_truthy(v: f32) -> bool {
    v != 0. && !v.is_nan()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{canvas::Recorder, palette::GOLD};

    fn field() -> ParticleField<Pcg64Mcg> {
        ParticleField::new(
            Pcg64Mcg::seed_from_u64(1),
            Viewport::new(800., 600.),
            FieldConfig::default(),
        )
    }

    #[test]
    fn spawn_grows_population_by_count() {
        let mut field = field();
        assert_eq!(field.spawn(Some(10.), Some(10.), 40), 40);
        assert_eq!(field.spawn(Some(10.), Some(10.), 7), 7);
        field.step();
        assert_eq!(field.spawn(None, None, 13), 13);
        assert_eq!(field.len(), 60);
    }

    #[test]
    fn spawn_zero_is_noop() {
        let mut field = field();
        assert_eq!(field.spawn(Some(5.), Some(5.), 0), 0);
        assert!(field.is_empty());
    }

    #[test]
    fn spawn_uses_given_origin() {
        let mut field = field();
        field.spawn(Some(100.), Some(250.), 5);
        assert!(field.particles().iter().all(|p| p.position == vec2(100., 250.)));
    }

    #[test]
    fn missing_or_falsy_coordinate_defaults_to_center() {
        let mut field = field();
        field.spawn(None, None, 3);
        field.spawn(Some(100.), None, 3);
        field.spawn(Some(0.), Some(250.), 3);
        field.spawn(Some(f32::NAN), Some(250.), 3);
        assert!(field.particles().iter().all(|p| p.position == vec2(400., 300.)));
    }

    #[test]
    fn default_origin_tracks_latest_resize() {
        let mut field = field();
        field.on_resize(Size {
            width: 1024,
            height: 768,
        });
        field.on_resize(Size {
            width: 300,
            height: 200,
        });
        field.spawn_burst(None);
        assert_eq!(field.len(), 40);
        assert!(field.particles().iter().all(|p| p.position == vec2(150., 100.)));
    }

    #[test]
    fn cull_is_idempotent() {
        let mut field = field();
        field.spawn(Some(1.), Some(1.), 40);
        for _ in 0..100 {
            field.step();
        }
        let removed = field.cull();
        let remaining = field.len();
        assert_eq!(removed + remaining, 40);
        assert_eq!(field.cull(), 0);
        assert_eq!(field.len(), remaining);
    }

    #[test]
    fn cull_removes_exactly_the_dead() {
        let mut field = field();
        field.insert(Particle::from_state(Vec2::ZERO, Vec2::ZERO, 0.5, GOLD));
        field.insert(Particle::from_state(Vec2::ZERO, Vec2::ZERO, 0.51, GOLD));
        field.insert(Particle::from_state(Vec2::ZERO, Vec2::ZERO, 0.2, GOLD));
        assert_eq!(field.cull(), 2);
        assert_eq!(field.particles()[0].size, 0.51);
    }

    #[test]
    fn render_all_clears_then_draws_each() {
        let mut field = field();
        field.spawn(Some(50.), Some(50.), 12);
        let mut canvas = Recorder::new();
        field.render_all(&mut canvas);
        assert_eq!(canvas.commands()[0], crate::canvas::DrawCommand::Clear);
        assert_eq!(canvas.fills().count(), 12);
        assert_eq!(canvas.depth(), 0);
    }

    #[test]
    fn ceiling_truncates_spawn() {
        let mut field = ParticleField::new(
            Pcg64Mcg::seed_from_u64(9),
            Viewport::new(100., 100.),
            FieldConfig {
                burst_size: 40,
                max_population: Some(50),
            },
        );
        assert_eq!(field.spawn_burst(None), 40);
        assert_eq!(field.spawn_burst(None), 10);
        assert_eq!(field.spawn_burst(None), 0);
        assert_eq!(field.len(), 50);
    }

    #[test]
    fn seeded_fields_spawn_identically() {
        let mut a = field();
        let mut b = field();
        a.spawn(Some(3.), Some(4.), 20);
        b.spawn(Some(3.), Some(4.), 20);
        assert_eq!(a.particles(), b.particles());
    }
}
