//! Christmas Tree: catch falling ornaments with any part of your hands

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use crate::renderer::{DisplayList, Glyph};
use crate::sim::collision::point_in_circle;
use crate::sim::landmarks::FrameInput;
use crate::sim::theme::{Theme, ThemeKind, ThemeStats, random_between, speed_mult, spread_spawn};

const ORNAMENTS: [&str; 8] = ["🎄", "🎀", "🔴", "🔵", "🟡", "🎁", "🔔", "🕯️"];

pub const ORNAMENT_RADIUS: f32 = 25.0;
/// How close a landmark must get to an ornament's center
pub const CATCH_RADIUS: f32 = 20.0;
const SPAWN_Y: f32 = -50.0;
const BASE_SPAWN_INTERVAL: f32 = 1.2;
/// Minimum horizontal gap between consecutive spawns, as a share of width
const SPAWN_GAP: f32 = 0.4;
const SPAWN_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Ornament {
    pub pos: Vec2,
    /// Fall speed in px/s
    pub speed: f32,
    pub emoji: &'static str,
}

pub struct ChristmasTreeTheme {
    width: f32,
    height: f32,
    stats: ThemeStats,
    pub ornaments: Vec<Ornament>,
    spawn_timer: f32,
    last_spawn_x: f32,
}

impl ChristmasTreeTheme {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            stats: ThemeStats::new(ThemeKind::ChristmasTree.starting_lives()),
            ornaments: Vec::new(),
            spawn_timer: 0.0,
            last_spawn_x: width / 2.0,
        }
    }

    fn spawn(&mut self, speed: f32, rng: &mut Pcg32) {
        let x = spread_spawn(
            rng,
            ORNAMENT_RADIUS,
            self.width - ORNAMENT_RADIUS,
            self.last_spawn_x,
            self.width * SPAWN_GAP,
            SPAWN_ATTEMPTS,
        );
        let emoji = ORNAMENTS.choose(rng).copied().unwrap_or(ORNAMENTS[0]);
        self.ornaments.push(Ornament {
            pos: Vec2::new(x, SPAWN_Y),
            speed: random_between(rng, 150.0, 250.0) * speed,
            emoji,
        });
        self.last_spawn_x = x;
        log::debug!("ornament {} spawned at x={:.0}", emoji, x);
    }
}

impl Theme for ChristmasTreeTheme {
    fn kind(&self) -> ThemeKind {
        ThemeKind::ChristmasTree
    }

    fn update(&mut self, dt: f32, input: &FrameInput, difficulty: f32, rng: &mut Pcg32) {
        let speed = speed_mult(difficulty);

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(speed, rng);
            self.spawn_timer = BASE_SPAWN_INTERVAL / speed;
        }

        let points: Vec<Vec2> = input.hand_points(self.width, self.height).collect();
        let height = self.height;
        let stats = &mut self.stats;

        self.ornaments.retain_mut(|ornament| {
            ornament.pos.y += ornament.speed * dt;

            if points
                .iter()
                .any(|p| point_in_circle(*p, ornament.pos, CATCH_RADIUS))
            {
                stats.add_score(1);
                return false;
            }

            if ornament.pos.y - ORNAMENT_RADIUS > height {
                stats.lose_life();
                return false;
            }
            true
        });
    }

    fn draw(&self, out: &mut DisplayList) {
        for ornament in &self.ornaments {
            out.glyph(Glyph::new(ornament.emoji, ornament.pos, 50.0));
        }
    }

    fn stats(&self) -> ThemeStats {
        self.stats
    }
}
