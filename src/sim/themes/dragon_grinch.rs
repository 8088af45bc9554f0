//! Dragon Grinch: open your mouth to breathe fire and burn down the trees

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::renderer::{Baseline, Color, DisplayList, Glyph, TextAlign};
use crate::sim::collision::{Rect, point_in_circle};
use crate::sim::landmarks::{FrameInput, LOWER_LIP, NOSE_TIP, UPPER_LIP};
use crate::sim::theme::{Theme, ThemeKind, ThemeStats, random_between};

pub const TREE_W: f32 = 60.0;
pub const TREE_H: f32 = 80.0;
const TREE_HEALTH: f32 = 100.0;
const BURNING_BELOW: f32 = 50.0;
const INITIAL_TREES: usize = 5;
const TREE_SPAWN_INTERVAL: f32 = 2.0;
const TREE_POINTS: u32 = 10;

/// Normalized lip gap above which the mouth counts as open
pub const MOUTH_OPEN_THRESHOLD: f32 = 0.05;
const FIRE_COOLDOWN: f32 = 0.05;
const PARTICLES_PER_PUFF: usize = 3;
const PARTICLE_SPEED: f32 = 400.0;
const PARTICLE_LIFE: f32 = 1.0;
const PARTICLE_RADIUS: f32 = 10.0;
const PARTICLE_GROWTH: f32 = 10.0;
const FIRE_DAMAGE: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct FireParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left; also the draw alpha
    pub life: f32,
    pub radius: f32,
    /// Red through yellow
    pub hue: f32,
}

impl FireParticle {
    fn new(pos: Vec2, angle: f32, hue: f32) -> Self {
        Self {
            pos,
            vel: Vec2::from_angle(angle) * PARTICLE_SPEED,
            life: PARTICLE_LIFE,
            radius: PARTICLE_RADIUS,
            hue,
        }
    }

    fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= dt;
        self.radius += PARTICLE_GROWTH * dt;
    }
}

#[derive(Debug, Clone)]
pub struct BurnableTree {
    /// Top-left corner
    pub pos: Vec2,
    pub health: f32,
}

impl BurnableTree {
    fn random(rng: &mut Pcg32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(
                random_between(rng, 0.0, width - TREE_W),
                random_between(rng, 0.0, height - TREE_H),
            ),
            health: TREE_HEALTH,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, TREE_W, TREE_H)
    }

    pub fn is_burning(&self) -> bool {
        self.health < BURNING_BELOW
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

pub struct DragonGrinchTheme {
    width: f32,
    height: f32,
    stats: ThemeStats,
    pub trees: Vec<BurnableTree>,
    pub particles: Vec<FireParticle>,
    spawn_timer: f32,
    fire_cooldown: f32,
}

impl DragonGrinchTheme {
    pub fn new(width: f32, height: f32, rng: &mut Pcg32) -> Self {
        let trees = (0..INITIAL_TREES)
            .map(|_| BurnableTree::random(rng, width, height))
            .collect();
        Self {
            width,
            height,
            stats: ThemeStats::new(ThemeKind::DragonGrinch.starting_lives()),
            trees,
            particles: Vec::new(),
            spawn_timer: 0.0,
            fire_cooldown: 0.0,
        }
    }

    /// Fire origin if the first face has its mouth open
    fn fire_origin(&self, input: &FrameInput) -> Option<Vec2> {
        let face = input.face()?;
        let nose = face.get(NOSE_TIP)?;
        let upper = face.get(UPPER_LIP)?;
        let lower = face.get(LOWER_LIP)?;
        (upper.distance(lower) > MOUTH_OPEN_THRESHOLD)
            .then(|| nose.to_canvas(self.width, self.height))
    }
}

impl Theme for DragonGrinchTheme {
    fn kind(&self) -> ThemeKind {
        ThemeKind::DragonGrinch
    }

    fn update(&mut self, dt: f32, input: &FrameInput, difficulty: f32, rng: &mut Pcg32) {
        if (self.trees.len() as f32) < INITIAL_TREES as f32 + difficulty {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 {
                self.trees
                    .push(BurnableTree::random(rng, self.width, self.height));
                self.spawn_timer = TREE_SPAWN_INTERVAL;
                log::debug!("Grinch tree spawned ({} standing)", self.trees.len());
            }
        }

        // Cooldown only runs while a face is tracked
        if input.face().is_some() {
            self.fire_cooldown -= dt;
            if let Some(origin) = self.fire_origin(input) {
                if self.fire_cooldown <= 0.0 {
                    for _ in 0..PARTICLES_PER_PUFF {
                        let angle = rng.random_range(0.0..std::f32::consts::TAU);
                        let hue = rng.random_range(0.0..60.0);
                        self.particles.push(FireParticle::new(origin, angle, hue));
                    }
                    self.fire_cooldown = FIRE_COOLDOWN;
                }
            }
        }

        let trees = &mut self.trees;
        let stats = &mut self.stats;

        self.particles.retain_mut(|particle| {
            particle.advance(dt);

            if let Some(i) = trees
                .iter()
                .position(|tree| {
                    point_in_circle(tree.rect().center(), particle.pos, particle.radius)
                })
            {
                trees[i].health -= FIRE_DAMAGE;
                if trees[i].is_destroyed() {
                    trees.remove(i);
                    stats.add_score(TREE_POINTS);
                }
                return false;
            }

            particle.life > 0.0
        });
    }

    fn draw(&self, out: &mut DisplayList) {
        for tree in &self.trees {
            let rect = tree.rect();
            let emoji = if tree.is_burning() { "🔥" } else { "🎄" };
            out.glyph(
                Glyph::new(emoji, rect.center(), 60.0).align(TextAlign::Center, Baseline::Middle),
            );

            if tree.health < TREE_HEALTH {
                let bar = Rect::new(rect.x, rect.y - 10.0, TREE_W, 5.0);
                out.fill_rect(bar, Color::Css("red"));
                out.fill_rect(
                    Rect::new(bar.x, bar.y, TREE_W * (tree.health / TREE_HEALTH), bar.h),
                    Color::Css("green"),
                );
            }
        }

        for particle in &self.particles {
            out.circle(
                particle.pos,
                particle.radius,
                Color::Hsl(particle.hue, 100.0, 50.0),
                particle.life,
            );
        }

        out.glyph(
            Glyph::new("Open mouth to breathe fire! 🔥", Vec2::new(20.0, 40.0), 20.0)
                .align(TextAlign::Left, Baseline::Alphabetic)
                .colored(Color::WHITE),
        );
    }

    fn stats(&self) -> ThemeStats {
        self.stats
    }
}
