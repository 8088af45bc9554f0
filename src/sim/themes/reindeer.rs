//! Reindeer: catch runaway reindeer before they escape across the screen

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::renderer::{Baseline, DisplayList, Glyph, TextAlign};
use crate::sim::collision::Rect;
use crate::sim::landmarks::FrameInput;
use crate::sim::theme::{Theme, ThemeKind, ThemeStats, random_between, speed_mult, spread_spawn};

pub const DEER_SIZE: f32 = 60.0;
const BASE_SPAWN_INTERVAL: f32 = 1.5;
/// Escaped once past the right edge by this much
const ESCAPE_MARGIN: f32 = 20.0;
const SPAWN_GAP: f32 = 0.4;
const SPAWN_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Reindeer {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    /// Y at spawn; the path is linear drift plus a sine wobble around it
    pub initial_y: f32,
    pub wobble_speed: f32,
    pub wobble_amp: f32,
    /// Seconds since spawn
    pub age: f32,
}

impl Reindeer {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, DEER_SIZE, DEER_SIZE)
    }

    fn advance(&mut self, dt: f32) {
        self.age += dt;
        self.pos.x += self.vel.x * dt;
        self.pos.y = self.initial_y
            + self.vel.y * self.age
            + (self.age * self.wobble_speed).sin() * self.wobble_amp;
    }
}

pub struct ReindeerTheme {
    width: f32,
    height: f32,
    stats: ThemeStats,
    pub herd: Vec<Reindeer>,
    spawn_timer: f32,
    last_spawn_y: f32,
}

impl ReindeerTheme {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            stats: ThemeStats::new(ThemeKind::Reindeer.starting_lives()),
            herd: Vec::new(),
            spawn_timer: 0.0,
            last_spawn_y: height / 2.0,
        }
    }

    fn spawn(&mut self, speed: f32, rng: &mut Pcg32) {
        let y = spread_spawn(
            rng,
            50.0,
            self.height - DEER_SIZE - 50.0,
            self.last_spawn_y,
            self.height * SPAWN_GAP,
            SPAWN_ATTEMPTS,
        );
        let start = Vec2::new(-DEER_SIZE, y);
        let target = Vec2::new(
            self.width + 50.0,
            random_between(rng, 0.0, self.height - DEER_SIZE),
        );
        let run_speed = random_between(rng, 150.0, 300.0) * speed;
        let vel = (target - start).normalize_or_zero() * run_speed;

        self.herd.push(Reindeer {
            pos: start,
            vel,
            initial_y: y,
            wobble_speed: random_between(rng, 2.0, 7.0),
            wobble_amp: random_between(rng, 50.0, 150.0),
            age: 0.0,
        });
        self.last_spawn_y = y;
    }
}

impl Theme for ReindeerTheme {
    fn kind(&self) -> ThemeKind {
        ThemeKind::Reindeer
    }

    fn update(&mut self, dt: f32, input: &FrameInput, difficulty: f32, rng: &mut Pcg32) {
        let speed = speed_mult(difficulty);

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(speed, rng);
            self.spawn_timer = BASE_SPAWN_INTERVAL / speed;
        }

        let points: Vec<Vec2> = input.hand_points(self.width, self.height).collect();
        let escape_x = self.width + ESCAPE_MARGIN;
        let stats = &mut self.stats;

        self.herd.retain_mut(|deer| {
            deer.advance(dt);

            let rect = deer.rect();
            if points.iter().any(|p| rect.contains(*p)) {
                stats.add_score(1);
                return false;
            }

            if deer.pos.x > escape_x {
                stats.lose_life();
                return false;
            }
            true
        });
    }

    fn draw(&self, out: &mut DisplayList) {
        // The emoji faces left; mirror it so the herd runs right
        for deer in &self.herd {
            out.glyph(
                Glyph::new("🦌", deer.rect().center(), 50.0)
                    .align(TextAlign::Center, Baseline::Middle)
                    .flipped(),
            );
        }
    }

    fn stats(&self) -> ThemeStats {
        self.stats
    }
}
