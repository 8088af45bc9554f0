//! Santa Claus: grab gifts falling from the sleigh and put them back in

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::renderer::{DisplayList, Glyph};
use crate::sim::collision::Rect;
use crate::sim::landmarks::FrameInput;
use crate::sim::theme::{Theme, ThemeKind, ThemeStats, speed_mult};

pub const GIFT_SIZE: f32 = 50.0;
const GIFT_FALL_SPEED: f32 = 200.0;
const GIFT_POINTS: u32 = 10;
const BASE_SPAWN_INTERVAL: f32 = 2.0;

pub const SLEIGH_W: f32 = 180.0;
pub const SLEIGH_H: f32 = 90.0;
const SLEIGH_Y: f32 = 50.0;
const SLEIGH_SPEED: f32 = 150.0;

#[derive(Debug, Clone)]
pub struct Gift {
    /// Top-left corner
    pub pos: Vec2,
    pub vy: f32,
    /// Hand currently carrying the gift
    pub held_by: Option<usize>,
}

impl Gift {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, GIFT_SIZE, GIFT_SIZE)
    }
}

#[derive(Debug, Clone)]
pub struct Sleigh {
    pub x: f32,
    /// +1 moving right, -1 moving left
    pub direction: f32,
}

impl Sleigh {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, SLEIGH_Y, SLEIGH_W, SLEIGH_H)
    }

    /// Bounce between the canvas edges
    fn update(&mut self, dt: f32, speed: f32, width: f32) {
        self.x += SLEIGH_SPEED * speed * self.direction * dt;
        let max_x = (width - SLEIGH_W).max(0.0);
        if self.x > max_x {
            self.direction = -1.0;
            self.x = max_x;
        } else if self.x < 0.0 {
            self.direction = 1.0;
            self.x = 0.0;
        }
    }
}

pub struct SantaTheme {
    width: f32,
    height: f32,
    stats: ThemeStats,
    pub sleigh: Sleigh,
    pub gifts: Vec<Gift>,
    spawn_timer: f32,
}

impl SantaTheme {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            stats: ThemeStats::new(ThemeKind::Santa.starting_lives()),
            // Enters from off-screen left; the first update clamps it in
            sleigh: Sleigh {
                x: -SLEIGH_W,
                direction: 1.0,
            },
            gifts: Vec::new(),
            spawn_timer: 0.0,
        }
    }
}

impl Theme for SantaTheme {
    fn kind(&self) -> ThemeKind {
        ThemeKind::Santa
    }

    fn update(&mut self, dt: f32, input: &FrameInput, difficulty: f32, _rng: &mut Pcg32) {
        let speed = speed_mult(difficulty);
        let (width, height) = (self.width, self.height);

        self.sleigh.update(dt, speed, width);

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            let sleigh = self.sleigh.rect();
            self.gifts.push(Gift {
                pos: Vec2::new(sleigh.x + sleigh.w / 2.0 - 20.0, sleigh.bottom()),
                vy: GIFT_FALL_SPEED * speed,
                held_by: None,
            });
            self.spawn_timer = BASE_SPAWN_INTERVAL / speed;
        }

        let sleigh = self.sleigh.rect();
        let tips: Vec<Option<Vec2>> = (0..input.hands.len())
            .map(|i| input.fingertip(i).map(|tip| tip.to_canvas(width, height)))
            .collect();
        let stats = &mut self.stats;

        self.gifts.retain_mut(|gift| {
            // A held gift whose hand vanished falls again
            let carried_tip = gift.held_by.and_then(|i| tips.get(i).copied().flatten());
            if carried_tip.is_none() {
                gift.held_by = None;
            }

            if let Some(tip) = carried_tip {
                gift.pos = tip - Vec2::splat(GIFT_SIZE / 2.0);
                if sleigh.contains(gift.rect().center()) {
                    stats.add_score(GIFT_POINTS);
                    return false;
                }
            } else {
                gift.pos.y += gift.vy * dt;
                // Later hands win, as every touching hand re-grabs
                for (i, tip) in tips.iter().enumerate() {
                    if let Some(tip) = tip {
                        if gift.rect().contains(*tip) {
                            gift.held_by = Some(i);
                        }
                    }
                }
            }

            if gift.pos.y > height {
                stats.lose_life();
                return false;
            }
            true
        });
    }

    fn draw(&self, out: &mut DisplayList) {
        let center = self.sleigh.rect().center();
        out.glyph(Glyph::new("🛷", center, 100.0));
        out.glyph(Glyph::new("🎅", center + Vec2::new(-20.0, -30.0), 50.0));
        out.glyph(Glyph::new("🎁", center + Vec2::new(30.0, -20.0), 30.0));
        out.glyph(Glyph::new("✨", center + Vec2::new(10.0, -40.0), 30.0));

        for gift in &self.gifts {
            out.glyph(Glyph::new("🎁", gift.rect().center(), 40.0));
        }
    }

    fn stats(&self) -> ThemeStats {
        self.stats
    }
}
