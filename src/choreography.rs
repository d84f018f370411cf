//! Timed bursts: the gift reveal, the celebrate button and the ambient
//! random bursts that keep going once the gift is open.
//!
//! Time is passed in as a `Duration` since some fixed start, so the same
//! schedule runs under a real clock or a test loop.

use std::time::Duration;

use glam::{vec2, Vec2};
use log::{debug, info};
use rand::Rng;

use crate::{field::ParticleField, viewport::Viewport};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChoreographyConfig {
    /// Wait between opening the gift and the first burst.
    pub reveal_delay: Duration,
    /// Gift bursts, relative to the end of the reveal delay.
    pub gift_bursts: [(Duration, BurstSite); 3],
    pub celebrate_follow_up: Duration,
    pub random_interval: Duration,
    /// Chance that a random-burst interval actually fires.
    pub random_probability: f64,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(800),
            gift_bursts: [
                (Duration::ZERO, BurstSite::Center),
                (Duration::from_millis(300), BurstSite::Fraction(vec2(0.25, 0.25))),
                (Duration::from_millis(600), BurstSite::Fraction(vec2(0.75, 0.25))),
            ],
            celebrate_follow_up: Duration::from_millis(200),
            random_interval: Duration::from_millis(3000),
            random_probability: 0.2,
        }
    }
}

/// Where a scheduled burst goes off. Resolved when it fires, so it follows
/// resizes made in the meantime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BurstSite {
    Center,
    Fraction(Vec2),
    Point(Vec2),
    Random,
}

impl BurstSite {
    pub fn resolve<R: Rng + ?Sized>(self, viewport: Viewport, rng: &mut R) -> Vec2 {
        match self {
            BurstSite::Center => viewport.center(),
            BurstSite::Fraction(fraction) => viewport.at_fraction(fraction),
            BurstSite::Point(point) => point,
            BurstSite::Random => vec2(
                rng.gen_range(0.0..1.0) * viewport.width,
                rng.gen_range(0.0..1.0) * viewport.height,
            ),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GiftState {
    Closed,
    /// Opened at the given time; bursts are scheduled.
    Open { since: Duration },
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Scheduled {
    due: Duration,
    site: BurstSite,
}

pub struct Choreographer<R> {
    config: ChoreographyConfig,
    rng: R,
    gift: GiftState,
    pending: Vec<Scheduled>,
    next_random: Option<Duration>,
}

impl<R: Rng> Choreographer<R> {
    pub fn new(rng: R, config: ChoreographyConfig) -> Self {
        Self {
            config,
            rng,
            gift: GiftState::Closed,
            pending: Vec::new(),
            next_random: None,
        }
    }

    pub fn gift_state(&self) -> GiftState {
        self.gift
    }

    /// Bursts scheduled but not yet fired.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Opens the gift once. Later calls do nothing and return `false`.
    pub fn open_gift(&mut self, now: Duration) -> bool {
        if self.gift != GiftState::Closed {
            return false;
        }
        info!("Gift opened at {:?}", now);
        self.gift = GiftState::Open { since: now };

        let reveal = now + self.config.reveal_delay;
        for (offset, site) in self.config.gift_bursts {
            self.schedule(reveal + offset, site);
        }
        self.next_random = Some(reveal + self.config.random_interval);
        true
    }

    pub fn celebrate(&mut self, at: Vec2, now: Duration) {
        self.schedule(now, BurstSite::Point(at));
        self.schedule(now + self.config.celebrate_follow_up, BurstSite::Random);
    }

    pub fn schedule(&mut self, due: Duration, site: BurstSite) {
        self.pending.push(Scheduled { due, site });
    }

    /// Fires everything due at `now` into `field`, oldest first. Returns the
    /// number of bursts that went off.
    pub fn poll<F: Rng>(&mut self, now: Duration, field: &mut ParticleField<F>) -> usize {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due <= now {
                due.push(*s);
                false
            } else {
                true
            }
        });

        // Missed ticks collapse into one roll; a stalled loop never replays them.
        if let Some(at) = self.next_random.filter(|at| *at <= now) {
            if self.rng.gen_bool(self.config.random_probability) {
                due.push(Scheduled {
                    due: at,
                    site: BurstSite::Random,
                });
            }
            let next = next_boundary(at, self.config.random_interval, now);
            if next > at + self.config.random_interval {
                debug!("Skipped random bursts between {:?} and {:?}", at, next);
            }
            self.next_random = Some(next);
        }

        due.sort_by_key(|s| s.due);
        for burst in &due {
            let origin = burst.site.resolve(field.viewport(), &mut self.rng);
            debug!("Burst {:?} due {:?} at {:?}", burst.site, burst.due, origin);
            field.spawn_burst(Some(origin));
        }
        due.len()
    }
}

/// First tick strictly after `now` on the grid `start + k * interval`.
fn next_boundary(start: Duration, interval: Duration, now: Duration) -> Duration {
    if interval.is_zero() {
        return now;
    }
    let elapsed = now.saturating_sub(start).as_nanos() / interval.as_nanos();
    u32::try_from(elapsed + 1)
        .ok()
        .and_then(|ticks| interval.checked_mul(ticks))
        .and_then(|offset| start.checked_add(offset))
        .unwrap_or(Duration::MAX)
}
