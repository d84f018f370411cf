use std::time::{Duration, Instant};

use anyhow::Result;
use confetti_cannon::{
    choreography::{Choreographer, GiftState},
    clock::{FramePacer, Pacing, SimulationClock},
    config::Config,
    field::ParticleField,
    renderer::{QuadCanvas, Renderer},
    viewport::{HasSize, Size},
};
use glam::{vec2, Vec2};
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use winit::{dpi::PhysicalPosition, event::VirtualKeyCode, window::Window};

pub struct App {
    window: Window,
    renderer: Renderer,
    canvas: QuadCanvas,
    clock: SimulationClock<Pcg64Mcg>,
    choreographer: Choreographer<Pcg64Mcg>,
    pacer: FramePacer,
    started: Instant,
    cursor: Option<Vec2>,
}

impl App {
    pub async fn new(window: Window, config: Config) -> Result<Self> {
        info!("{:#?}", &config);

        let seed = config.seed_or_now()?;
        info!("Seeded RNG with {}", seed);
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        let field_rng = Pcg64Mcg::from_rng(&mut rng)?;

        let field = ParticleField::new(field_rng, window.size().into(), config.field);
        let renderer = Renderer::new(&window).await?;

        Ok(Self {
            window,
            renderer,
            canvas: QuadCanvas::new(),
            clock: SimulationClock::new(field),
            choreographer: Choreographer::new(rng, config.choreography),
            pacer: FramePacer::new(config.target_fps),
            started: Instant::now(),
            cursor: None,
        })
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn on_resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        let size = Size::from(size);
        self.renderer.resize(size);
        self.clock.field_mut().on_resize(size);
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(vec2(position.x as f32, position.y as f32));
    }

    /// The first click opens the gift; every later one celebrates at the cursor.
    pub fn on_mouse_up(&mut self) {
        let now = self.elapsed();
        match self.choreographer.gift_state() {
            GiftState::Closed => {
                self.choreographer.open_gift(now);
            }
            GiftState::Open { .. } => {
                let at = self
                    .cursor
                    .unwrap_or_else(|| self.clock.field().viewport().center());
                debug!("Celebrating at {:?}", at);
                self.choreographer.celebrate(at, now);
            }
        }
    }

    pub fn on_key_up(&mut self, keycode: VirtualKeyCode) {
        if keycode == VirtualKeyCode::Space {
            self.clock.field_mut().spawn_burst(None);
        }
    }

    /// Fires due bursts and, when a frame is due, ticks the simulation and
    /// presents it.
    pub fn update(&mut self) -> Result<Pacing> {
        let now = self.elapsed();
        self.choreographer.poll(now, self.clock.field_mut());

        let pacing = self.pacer.poll(Instant::now());
        if pacing == Pacing::Tick {
            self.clock.tick(&mut self.canvas);
            self.renderer.render(&self.canvas)?;
        }
        Ok(pacing)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}
