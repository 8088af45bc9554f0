//! Sleigh Formula 1: steer a racing sleigh down a curving road by tilting
//! your head, collecting ornaments and staying off the snow

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use crate::renderer::{Color, DisplayList, Glyph};
use crate::sim::collision::{Rect, point_in_rect};
use crate::sim::landmarks::{FrameInput, LEFT_EYE_OUTER, NOSE_TIP, RIGHT_EYE_OUTER};
use crate::sim::theme::{Theme, ThemeKind, ThemeStats, random_between, speed_mult};
use crate::{per_frame_chance, per_frame_factor};

pub const CAR_W: f32 = 100.0;
pub const CAR_H: f32 = 60.0;
/// Base scroll speed of road, trees and collectibles
const SCROLL_SPEED: f32 = 400.0;
/// Head tilt below this (radians) is ignored
const TILT_DEAD_ZONE: f32 = 0.05;
/// Steering acceleration per radian of tilt (negative: tilt left steers left)
const STEERING_GAIN: f32 = -1000.0;
/// Velocity kept per 60 Hz frame
const STEERING_DAMPING: f32 = 0.95;
/// Chance per 60 Hz frame that the road picks a new bend
const CURVE_CHANGE_CHANCE: f32 = 0.01;
const MAX_CURVE: f32 = 200.0;
const OFF_ROAD_DAMAGE_INTERVAL: f32 = 0.5;
const BASE_COLLECTIBLE_INTERVAL: f32 = 1.0;
const COLLECTIBLE_SIZE: f32 = 50.0;
const COLLECTIBLE_POINTS: u32 = 10;
/// Pickups register at this inset from the sleigh's top-left corner
const PICKUP_INSET: f32 = 10.0;
const COLLECTIBLES: [&str; 5] = ["🍬", "💡", "☃️", "🎀", "🎁"];
/// Chance per 60 Hz frame of a new roadside tree, before difficulty scaling
const TREE_CHANCE: f32 = 0.2;
const INITIAL_TREES: usize = 100;
const ROAD_SEGMENTS: usize = 20;

/// Perspective road: narrow at the horizon, wide at the bottom, bending by
/// `curve` pixels at the horizon
#[derive(Debug, Clone)]
pub struct Road {
    pub canvas_w: f32,
    pub top_w: f32,
    pub bottom_w: f32,
    pub curve: f32,
    pub target_curve: f32,
}

impl Road {
    fn new(width: f32) -> Self {
        Self {
            canvas_w: width,
            top_w: width * 0.1,
            bottom_w: width * 0.6,
            curve: 0.0,
            target_curve: 0.0,
        }
    }

    /// Road width at `progress` (0 = horizon, 1 = bottom of screen)
    #[inline]
    pub fn width_at(&self, progress: f32) -> f32 {
        self.top_w + (self.bottom_w - self.top_w) * progress
    }

    /// Road center x at `progress`
    #[inline]
    pub fn center_at(&self, progress: f32) -> f32 {
        self.canvas_w / 2.0 - self.curve * (1.0 - progress).powi(2)
    }

    /// Left and right edge at `progress`
    pub fn edges_at(&self, progress: f32) -> (f32, f32) {
        let center = self.center_at(progress);
        let half = self.width_at(progress) / 2.0;
        (center - half, center + half)
    }
}

#[derive(Debug, Clone)]
pub struct RaceSleigh {
    /// Top-left corner
    pub pos: Vec2,
    pub vx: f32,
}

impl RaceSleigh {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, CAR_W, CAR_H)
    }
}

/// Ornament lying on the road, grows as it approaches
#[derive(Debug, Clone)]
pub struct Collectible {
    pub y: f32,
    /// Position across the road, -1 (left edge) to 1 (right edge)
    pub lane_offset: f32,
    pub emoji: &'static str,
    pub scale: f32,
    pub x: f32,
}

impl Collectible {
    pub fn size(&self) -> f32 {
        COLLECTIBLE_SIZE * self.scale
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size(), self.size())
    }
}

/// Scenery only
#[derive(Debug, Clone)]
pub struct RoadsideTree {
    pub y: f32,
    /// -1 left of the road, +1 right
    pub side: f32,
    pub emoji: &'static str,
}

pub struct SleighFormula1Theme {
    width: f32,
    height: f32,
    stats: ThemeStats,
    pub sleigh: RaceSleigh,
    pub road: Road,
    pub collectibles: Vec<Collectible>,
    pub trees: Vec<RoadsideTree>,
    collectible_timer: f32,
    damage_cooldown: f32,
    /// Distance scrolled, drives the center-line dashes
    road_offset: f32,
    pub off_road: bool,
    /// Face points shown as steering feedback
    feedback: Vec<Vec2>,
}

impl SleighFormula1Theme {
    pub fn new(width: f32, height: f32, rng: &mut Pcg32) -> Self {
        let trees = (0..INITIAL_TREES)
            .map(|_| {
                let y = random_between(rng, 0.0, height);
                random_tree(rng, y)
            })
            .collect();
        Self {
            width,
            height,
            stats: ThemeStats::new(ThemeKind::SleighFormula1.starting_lives()),
            sleigh: RaceSleigh {
                pos: Vec2::new(width / 2.0 - CAR_W / 2.0, height - 120.0),
                vx: 0.0,
            },
            road: Road::new(width),
            collectibles: Vec::new(),
            trees,
            collectible_timer: 0.0,
            damage_cooldown: 0.0,
            road_offset: 0.0,
            off_road: false,
            feedback: Vec::new(),
        }
    }

    /// Road progress (0..1) at a screen y
    #[inline]
    fn progress_at(&self, y: f32) -> f32 {
        y / self.height
    }

    fn steer(&mut self, dt: f32, input: &FrameInput) {
        let mut steering = 0.0;
        self.feedback.clear();

        if let Some(face) = input.face() {
            if let (Some(left), Some(right)) =
                (face.get(LEFT_EYE_OUTER), face.get(RIGHT_EYE_OUTER))
            {
                let tilt = head_tilt(left.x, left.y, right.x, right.y);
                if tilt.abs() > TILT_DEAD_ZONE {
                    steering = tilt * STEERING_GAIN;
                }
            }
            for idx in [LEFT_EYE_OUTER, RIGHT_EYE_OUTER, NOSE_TIP] {
                if let Some(p) = face.get(idx) {
                    self.feedback.push(p.to_canvas(self.width, self.height));
                }
            }
        }

        self.sleigh.vx += steering * dt;
        self.sleigh.vx *= per_frame_factor(STEERING_DAMPING, dt);
        self.sleigh.pos.x += self.sleigh.vx * dt;
    }

    fn bend_road(&mut self, dt: f32, rng: &mut Pcg32) {
        if rng.random::<f32>() < per_frame_chance(CURVE_CHANGE_CHANCE, dt) {
            self.road.target_curve = random_between(rng, -MAX_CURVE, MAX_CURVE);
        }
        let ease = dt.min(1.0);
        self.road.curve += (self.road.target_curve - self.road.curve) * ease;
    }

    fn check_off_road(&mut self, dt: f32) {
        let rect = self.sleigh.rect();
        let (left, right) = self.road.edges_at(self.progress_at(rect.bottom()));

        self.off_road = rect.x < left || rect.right() > right;
        if self.off_road {
            self.damage_cooldown -= dt;
            if self.damage_cooldown <= 0.0 {
                self.stats.lose_life();
                self.damage_cooldown = OFF_ROAD_DAMAGE_INTERVAL;
            }
        }

        // Keep the sleigh on screen even when off the road
        let max_x = (self.width - CAR_W).max(0.0);
        self.sleigh.pos.x = self.sleigh.pos.x.clamp(0.0, max_x);
    }
}

/// Head roll angle from the two outer eye corners (normalized coordinates)
#[inline]
pub fn head_tilt(left_x: f32, left_y: f32, right_x: f32, right_y: f32) -> f32 {
    (right_y - left_y).atan2(right_x - left_x)
}

fn random_tree(rng: &mut Pcg32, y: f32) -> RoadsideTree {
    RoadsideTree {
        y,
        side: if rng.random_bool(0.5) { -1.0 } else { 1.0 },
        emoji: if rng.random::<f32>() > 0.8 { "🎄" } else { "🌲" },
    }
}

impl Theme for SleighFormula1Theme {
    fn kind(&self) -> ThemeKind {
        ThemeKind::SleighFormula1
    }

    fn update(&mut self, dt: f32, input: &FrameInput, difficulty: f32, rng: &mut Pcg32) {
        let speed = speed_mult(difficulty);
        let scroll = SCROLL_SPEED * speed;

        self.steer(dt, input);
        self.bend_road(dt, rng);
        self.check_off_road(dt);
        self.road_offset += scroll * dt;

        // Scenery
        if rng.random::<f32>() < per_frame_chance(TREE_CHANCE * speed, dt) {
            self.trees.push(random_tree(rng, -50.0));
        }
        let height = self.height;
        for tree in &mut self.trees {
            tree.y += scroll * dt;
        }
        self.trees.retain(|t| t.y <= height);

        // Collectibles
        self.collectible_timer -= dt;
        if self.collectible_timer <= 0.0 {
            self.collectibles.push(Collectible {
                y: -50.0,
                lane_offset: random_between(rng, -0.8, 0.8),
                emoji: COLLECTIBLES.choose(rng).copied().unwrap_or(COLLECTIBLES[0]),
                scale: 0.2,
                x: 0.0,
            });
            self.collectible_timer = BASE_COLLECTIBLE_INTERVAL / speed;
        }

        let sleigh = self.sleigh.rect();
        let road = &self.road;
        let stats = &mut self.stats;
        self.collectibles.retain_mut(|item| {
            item.y += scroll * dt;
            let progress = item.y / height;
            item.scale = 0.2 + progress * 0.8;
            // Track the bending road
            item.x = road.center_at(progress) + item.lane_offset * road.width_at(progress) / 2.0
                - item.size() / 2.0;

            let rect = item.rect();
            let in_band = rect.bottom() > sleigh.y + PICKUP_INSET && rect.y < sleigh.bottom();
            let grab_point = Vec2::new(sleigh.x + PICKUP_INSET, sleigh.y + PICKUP_INSET);
            if in_band && point_in_rect(grab_point, &rect) {
                stats.add_score(COLLECTIBLE_POINTS);
                return false;
            }
            // Missed ornaments just disappear
            item.y <= height
        });
    }

    fn draw(&self, out: &mut DisplayList) {
        out.fill_rect(Rect::new(0.0, 0.0, self.width, self.height), Color::Css("#0f380f"));

        let segment_h = self.height / ROAD_SEGMENTS as f32;
        for i in 0..ROAD_SEGMENTS {
            let (y1, y2) = (i as f32 * segment_h, (i + 1) as f32 * segment_h);
            let (l1, r1) = self.road.edges_at(self.progress_at(y1));
            let (l2, r2) = self.road.edges_at(self.progress_at(y2));
            out.quad(
                [Vec2::new(l1, y1), Vec2::new(r1, y1), Vec2::new(r2, y2), Vec2::new(l2, y2)],
                Color::Css("#555"),
            );
        }

        // Dashed center strip scrolling with the road
        let dash_phase = (self.road_offset / segment_h.max(1.0)) as usize;
        for i in 0..ROAD_SEGMENTS {
            if (i + dash_phase) % 2 == 0 {
                continue;
            }
            let (y1, y2) = (i as f32 * segment_h, (i + 1) as f32 * segment_h);
            let from = Vec2::new(self.road.center_at(self.progress_at(y1)), y1);
            let to = Vec2::new(self.road.center_at(self.progress_at(y2)), y2);
            out.line(from, to, Color::Css("#EDA"), 4.0);
        }

        for tree in &self.trees {
            let (left, right) = self.road.edges_at(self.progress_at(tree.y));
            let x = if tree.side < 0.0 { left - 40.0 } else { right + 10.0 };
            out.glyph(Glyph::new(tree.emoji, Vec2::new(x, tree.y), 30.0));
        }

        for item in &self.collectibles {
            let center = item.rect().center();
            out.glyph(Glyph::new(item.emoji, center, (40.0 * item.scale).floor()));
        }

        // Sprite points sideways; turn it to face up the road and lean into turns
        let lean = self.sleigh.vx * 0.0005;
        out.glyph(
            Glyph::new("🏎️🛷", self.sleigh.rect().center(), 60.0).rotated(PI / 2.0 + lean),
        );

        if self.off_road {
            out.tint(Color::Rgba(255, 0, 0, 0.3));
        }

        for p in &self.feedback {
            out.circle(*p, 5.0, Color::Rgba(255, 255, 0, 0.8), 1.0);
        }
    }

    fn stats(&self) -> ThemeStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::landmarks::Landmark;
    use crate::sim::themes::test_support::{H, W};
    use rand::SeedableRng;

    fn face_with_eyes(left: Landmark, right: Landmark) -> FrameInput {
        let mut face = vec![Landmark::new(0.5, 0.5); RIGHT_EYE_OUTER + 1];
        face[LEFT_EYE_OUTER] = left;
        face[RIGHT_EYE_OUTER] = right;
        FrameInput {
            hands: vec![],
            faces: vec![face],
        }
    }

    fn calm_theme(rng: &mut Pcg32) -> SleighFormula1Theme {
        let mut theme = SleighFormula1Theme::new(W, H, rng);
        theme.collectible_timer = 100.0;
        theme
    }

    #[test]
    fn test_road_geometry() {
        let road = Road::new(1000.0);
        assert_eq!(road.width_at(0.0), 100.0);
        assert_eq!(road.width_at(1.0), 600.0);
        assert_eq!(road.edges_at(1.0), (200.0, 800.0));
        let bent = Road {
            curve: 100.0,
            ..road
        };
        assert_eq!(bent.center_at(0.0), 400.0);
        assert_eq!(bent.center_at(1.0), 500.0);
    }

    #[test]
    fn test_level_head_does_not_steer() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut theme = calm_theme(&mut rng);
        let start_x = theme.sleigh.pos.x;
        let input = face_with_eyes(Landmark::new(0.4, 0.5), Landmark::new(0.6, 0.51));
        theme.update(0.016, &input, 1.0, &mut rng);
        assert_eq!(theme.sleigh.vx, 0.0);
        assert_eq!(theme.sleigh.pos.x, start_x);
    }

    #[test]
    fn test_tilt_steers_opposite_to_angle() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut theme = calm_theme(&mut rng);
        // Right eye higher than left: negative angle, steers right
        let input = face_with_eyes(Landmark::new(0.4, 0.6), Landmark::new(0.6, 0.4));
        assert!(head_tilt(0.4, 0.6, 0.6, 0.4) < -TILT_DEAD_ZONE);
        theme.update(0.016, &input, 1.0, &mut rng);
        assert!(theme.sleigh.vx > 0.0);
    }

    #[test]
    fn test_off_road_damage_is_rate_limited() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut theme = calm_theme(&mut rng);
        theme.sleigh.pos.x = 0.0;
        for _ in 0..10 {
            theme.update(0.01, &FrameInput::default(), 1.0, &mut rng);
        }
        assert!(theme.off_road);
        // 0.1 s off-road: only the first hit landed
        assert_eq!(theme.stats().lives, 14);

        for _ in 0..50 {
            theme.update(0.01, &FrameInput::default(), 1.0, &mut rng);
        }
        assert_eq!(theme.stats().lives, 13);
    }

    /// Ornament on the road centre level with the sleigh's nose
    fn ornament_beside_sleigh(theme: &SleighFormula1Theme) -> (Collectible, f32) {
        let y = theme.sleigh.pos.y + 5.0;
        let center = theme.road.center_at(y / H);
        let item = Collectible {
            y,
            lane_offset: 0.0,
            emoji: "🍬",
            scale: 1.0,
            x: 0.0,
        };
        (item, center)
    }

    #[test]
    fn test_collect_ornament() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut theme = calm_theme(&mut rng);
        let (item, center) = ornament_beside_sleigh(&theme);
        // Grab point sits on the ornament's centre line
        theme.sleigh.pos.x = center - PICKUP_INSET;
        theme.collectibles.push(item);
        theme.update(0.0, &FrameInput::default(), 1.0, &mut rng);
        assert!(theme.collectibles.is_empty());
        assert_eq!(theme.stats().score, COLLECTIBLE_POINTS);
    }

    #[test]
    fn test_edge_overlap_does_not_collect() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut theme = calm_theme(&mut rng);
        let (item, center) = ornament_beside_sleigh(&theme);
        // Sleigh's right end overlaps the ornament, its grab point doesn't
        theme.sleigh.pos.x = center - CAR_W + 20.0;
        assert!(theme.sleigh.rect().right() > center);
        theme.collectibles.push(item);
        theme.update(0.0, &FrameInput::default(), 1.0, &mut rng);
        assert_eq!(theme.collectibles.len(), 1);
        assert_eq!(theme.stats().score, 0);
    }

    #[test]
    fn test_missed_collectible_is_free() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut theme = calm_theme(&mut rng);
        theme.collectibles.push(Collectible {
            y: H + 1.0,
            lane_offset: 0.8,
            emoji: "🎁",
            scale: 1.0,
            x: 0.0,
        });
        theme.update(0.0, &FrameInput::default(), 1.0, &mut rng);
        assert!(theme.collectibles.is_empty());
        assert_eq!(theme.stats().lives, 15);
        assert_eq!(theme.stats().score, 0);
    }

    #[test]
    fn test_draw_tints_when_off_road() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut theme = calm_theme(&mut rng);
        theme.off_road = true;
        let mut list = DisplayList::new();
        theme.draw(&mut list);
        assert!(list
            .commands
            .iter()
            .any(|c| matches!(c, crate::renderer::DrawCommand::Tint { .. })));
    }
}
