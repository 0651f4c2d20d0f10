//! Per-frame state for the decorative weather backdrop.
//!
//! `step` is pure: the host owns the timer and the drawing, this module only
//! moves particles. Rates are expressed per second so any frame rate works.

use std::f32::consts::PI;
use std::time::Duration;

use rand::Rng;

use crate::model::AnimationMode;

const SUN_RADIUS: f32 = 30.0;
const SUN_MARGIN: f32 = 80.0;
const SUN_RAYS: usize = 12;
/// Radians per second of the pulse.
const SUN_PULSE_RATE: f32 = 5.0;

const RAIN_DROPS: usize = 70;
/// Pixels per second.
const RAIN_SPEED: f32 = 800.0 / 3.0;

const SNOW_FLAKES: usize = 40;
/// Snow speeds are tuned per frame at this rate.
const SNOW_FPS: f32 = 25.0;
const SNOW_SWAY: f32 = 0.8;
const SNOW_PHASE_RATE: f32 = 2.5;

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 320.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sun {
    pub cx: f32,
    pub cy: f32,
    pub phase: f32,
}

impl Sun {
    pub fn radius(&self) -> f32 {
        SUN_RADIUS * (1.0 + 0.03 * self.phase.sin())
    }

    pub fn rays(&self) -> impl Iterator<Item = Line> + '_ {
        (0..SUN_RAYS).map(move |i| {
            let angle = i as f32 * PI / 6.0;
            let length = SUN_RADIUS + 25.0 + 5.0 * (self.phase + i as f32 * 0.4).sin();
            let (sin, cos) = angle.sin_cos();
            Line {
                x1: self.cx + cos * (SUN_RADIUS + 5.0),
                y1: self.cy + sin * (SUN_RADIUS + 5.0),
                x2: self.cx + cos * length,
                y2: self.cy + sin * length,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainDrop {
    pub x: f32,
    pub y: f32,
    pub length: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flake {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Pixels per frame at `SNOW_FPS`.
    pub speed: f32,
    pub phase: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Particles {
    Sun(Sun),
    Rain(Vec<RainDrop>),
    Snow(Vec<Flake>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub scene: Scene,
    pub particles: Particles,
}

impl AnimationState {
    pub fn new<R: Rng + ?Sized>(mode: AnimationMode, scene: Scene, rng: &mut R) -> Self {
        let w = scene.width.max(1.0);
        let h = scene.height.max(1.0);

        let particles = match mode {
            AnimationMode::Sun => Particles::Sun(Sun {
                cx: w - SUN_MARGIN,
                cy: SUN_MARGIN,
                phase: 0.0,
            }),
            AnimationMode::Rain => Particles::Rain(
                (0..RAIN_DROPS)
                    .map(|_| RainDrop {
                        x: rng.gen_range(0.0..=w),
                        y: rng.gen_range(-h..=0.0),
                        length: rng.gen_range(8.0..=16.0),
                    })
                    .collect(),
            ),
            AnimationMode::Snow => Particles::Snow(
                (0..SNOW_FLAKES)
                    .map(|_| Flake {
                        x: rng.gen_range(0.0..=w),
                        y: rng.gen_range(-h..=0.0),
                        radius: rng.gen_range(2.0..=4.0),
                        speed: rng.gen_range(0.5..1.5),
                        phase: rng.gen_range(0.0..2.0 * PI),
                    })
                    .collect(),
            ),
        };

        Self { scene, particles }
    }

    /// Randomly seeded state, for hosts that don't need reproducible frames.
    pub fn start(mode: AnimationMode, scene: Scene) -> Self {
        Self::new(mode, scene, &mut rand::thread_rng())
    }

    pub fn mode(&self) -> AnimationMode {
        match self.particles {
            Particles::Sun(_) => AnimationMode::Sun,
            Particles::Rain(_) => AnimationMode::Rain,
            Particles::Snow(_) => AnimationMode::Snow,
        }
    }

    /// Advance by `dt`. Particles leaving the bottom re-enter above the top.
    pub fn step(mut self, dt: Duration) -> Self {
        let secs = dt.as_secs_f32();
        let height = self.scene.height;

        match &mut self.particles {
            Particles::Sun(sun) => {
                sun.phase = (sun.phase + SUN_PULSE_RATE * secs) % (2.0 * PI);
            }
            Particles::Rain(drops) => {
                for drop in drops.iter_mut() {
                    drop.y += RAIN_SPEED * secs;
                    if drop.y > height {
                        drop.y = -10.0;
                    }
                }
            }
            Particles::Snow(flakes) => {
                for flake in flakes.iter_mut() {
                    flake.y += flake.speed * SNOW_FPS * secs;
                    flake.x += flake.phase.sin() * SNOW_SWAY * SNOW_FPS * secs;
                    flake.phase += SNOW_PHASE_RATE * secs;
                    if flake.y - flake.radius > height {
                        flake.y = -flake.radius;
                    }
                }
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn particle_counts_follow_mode() {
        let scene = Scene::default();
        let rain = AnimationState::new(AnimationMode::Rain, scene, &mut rng());
        let snow = AnimationState::new(AnimationMode::Snow, scene, &mut rng());
        let sun = AnimationState::new(AnimationMode::Sun, scene, &mut rng());

        assert!(matches!(&rain.particles, Particles::Rain(d) if d.len() == RAIN_DROPS));
        assert!(matches!(&snow.particles, Particles::Snow(f) if f.len() == SNOW_FLAKES));
        assert_eq!(sun.mode(), AnimationMode::Sun);
    }

    #[test]
    fn sun_sits_in_the_top_right_corner() {
        let state = AnimationState::new(AnimationMode::Sun, Scene::default(), &mut rng());
        let Particles::Sun(sun) = &state.particles else {
            panic!("expected sun");
        };
        assert_eq!((sun.cx, sun.cy), (400.0, 80.0));
        assert_eq!(sun.rays().count(), SUN_RAYS);
        assert_eq!(sun.radius(), SUN_RADIUS);
    }

    #[test]
    fn sun_pulse_advances_with_time() {
        let state = AnimationState::new(AnimationMode::Sun, Scene::default(), &mut rng())
            .step(Duration::from_millis(40));
        let Particles::Sun(sun) = &state.particles else {
            panic!("expected sun");
        };
        assert!((sun.phase - 0.2).abs() < 1e-5);
        assert!(sun.radius() > SUN_RADIUS);
    }

    #[test]
    fn rain_falls_and_wraps() {
        let scene = Scene {
            width: 100.0,
            height: 100.0,
        };
        let state = AnimationState {
            scene,
            particles: Particles::Rain(vec![
                RainDrop { x: 10.0, y: 0.0, length: 10.0 },
                RainDrop { x: 20.0, y: 95.0, length: 10.0 },
            ]),
        }
        .step(Duration::from_millis(30));

        let Particles::Rain(drops) = &state.particles else {
            panic!("expected rain");
        };
        assert!((drops[0].y - 8.0).abs() < 1e-3);
        assert_eq!(drops[1].y, -10.0);
    }

    #[test]
    fn snow_drifts_down_and_wraps() {
        let scene = Scene {
            width: 100.0,
            height: 100.0,
        };
        let start = Flake { x: 50.0, y: 10.0, radius: 3.0, speed: 1.0, phase: 0.0 };
        let state = AnimationState {
            scene,
            particles: Particles::Snow(vec![start, Flake { y: 103.5, ..start }]),
        }
        .step(Duration::from_millis(40));

        let Particles::Snow(flakes) = &state.particles else {
            panic!("expected snow");
        };
        assert!((flakes[0].y - 11.0).abs() < 1e-3);
        assert!((flakes[0].phase - 0.1).abs() < 1e-5);
        assert_eq!(flakes[1].y, -3.0);
    }

    #[test]
    fn zero_dt_is_identity() {
        let state = AnimationState::new(AnimationMode::Snow, Scene::default(), &mut rng());
        assert_eq!(state.clone().step(Duration::ZERO), state);
    }
}
