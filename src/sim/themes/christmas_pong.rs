//! Christmas Pong: beat the robot elf at paddle tennis with your fingertip

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::renderer::{Color, DisplayList, Glyph};
use crate::sim::collision::{Rect, circle_overlaps_rect};
use crate::sim::landmarks::FrameInput;
use crate::sim::theme::{Theme, ThemeKind, ThemeStats, speed_mult};

pub const PADDLE_W: f32 = 100.0;
pub const PADDLE_H: f32 = 20.0;
/// Distance of each paddle from its screen edge
const PADDLE_MARGIN: f32 = 50.0;
const AI_SPEED: f32 = 250.0;
/// AI ignores offsets smaller than this
const AI_DEAD_BAND: f32 = 10.0;

pub const BALL_RADIUS: f32 = 15.0;
const BALL_SERVE_SPEED: f32 = 200.0;
/// Rebound speed-up
const PADDLE_BOOST: f32 = 1.1;
/// Random horizontal kick on rebound
const PADDLE_SPIN: f32 = 50.0;
const POINTS_PER_GOAL: u32 = 30;

#[derive(Debug, Clone)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub is_ai: bool,
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PADDLE_W, PADDLE_H)
    }

    /// AI chases `target_x`; the player's paddle centers on it directly
    fn update(&mut self, dt: f32, target_x: f32, ai_speed: f32, canvas_w: f32) {
        if self.is_ai {
            let center = self.x + PADDLE_W / 2.0;
            if center < target_x - AI_DEAD_BAND {
                self.x += ai_speed * dt;
            } else if center > target_x + AI_DEAD_BAND {
                self.x -= ai_speed * dt;
            }
        } else {
            self.x = target_x - PADDLE_W / 2.0;
        }
        self.x = self.x.clamp(0.0, (canvas_w - PADDLE_W).max(0.0));
    }
}

#[derive(Debug, Clone)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
}

pub struct ChristmasPongTheme {
    width: f32,
    height: f32,
    stats: ThemeStats,
    pub ai_paddle: Paddle,
    pub player_paddle: Paddle,
    pub ball: Ball,
}

impl ChristmasPongTheme {
    pub fn new(width: f32, height: f32, rng: &mut Pcg32) -> Self {
        let paddle_x = (width - PADDLE_W) / 2.0;
        Self {
            width,
            height,
            stats: ThemeStats::new(ThemeKind::ChristmasPong.starting_lives()),
            ai_paddle: Paddle {
                x: paddle_x,
                y: PADDLE_MARGIN,
                is_ai: true,
            },
            player_paddle: Paddle {
                x: paddle_x,
                y: height - PADDLE_MARGIN - PADDLE_H,
                is_ai: false,
            },
            ball: Ball {
                pos: Vec2::new(width / 2.0, height / 2.0),
                vel: serve_velocity(rng),
            },
        }
    }

    fn reset_ball(&mut self, rng: &mut Pcg32) {
        self.ball.pos = Vec2::new(self.width / 2.0, self.height / 2.0);
        self.ball.vel = serve_velocity(rng);
    }

    /// Bounce off `paddle` if the ball overlaps it while moving toward it.
    /// `toward` is the sign of vy that approaches the paddle.
    fn bounce_off(ball: &mut Ball, paddle: &Paddle, toward: f32, rng: &mut Pcg32) -> bool {
        if !circle_overlaps_rect(ball.pos, BALL_RADIUS, &paddle.rect()) {
            return false;
        }
        if ball.vel.y * toward > 0.0 {
            ball.vel.y *= -PADDLE_BOOST;
            ball.vel.x += (rng.random::<f32>() - 0.5) * PADDLE_SPIN;
            return true;
        }
        false
    }
}

/// Diagonal serve in a random quadrant
fn serve_velocity(rng: &mut Pcg32) -> Vec2 {
    let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    Vec2::new(sx, sy) * BALL_SERVE_SPEED
}

impl Theme for ChristmasPongTheme {
    fn kind(&self) -> ThemeKind {
        ThemeKind::ChristmasPong
    }

    fn update(&mut self, dt: f32, input: &FrameInput, difficulty: f32, rng: &mut Pcg32) {
        let speed = speed_mult(difficulty);

        // The whole rally speeds up with difficulty
        self.ball.pos += self.ball.vel * dt * speed;

        if self.ball.pos.x - BALL_RADIUS < 0.0 {
            self.ball.pos.x = BALL_RADIUS;
            self.ball.vel.x = -self.ball.vel.x;
        } else if self.ball.pos.x + BALL_RADIUS > self.width {
            self.ball.pos.x = self.width - BALL_RADIUS;
            self.ball.vel.x = -self.ball.vel.x;
        }

        self.ai_paddle
            .update(dt, self.ball.pos.x, AI_SPEED * speed, self.width);

        let hand_x = input
            .fingertip(0)
            .map(|tip| tip.to_canvas(self.width, self.height).x)
            .unwrap_or(self.width / 2.0);
        self.player_paddle.update(dt, hand_x, 0.0, self.width);

        Self::bounce_off(&mut self.ball, &self.player_paddle, 1.0, rng);
        Self::bounce_off(&mut self.ball, &self.ai_paddle, -1.0, rng);

        if self.ball.pos.y - BALL_RADIUS < 0.0 {
            // Robot missed
            self.stats.add_score(POINTS_PER_GOAL);
            self.reset_ball(rng);
        } else if self.ball.pos.y + BALL_RADIUS > self.height {
            self.stats.lose_life();
            self.reset_ball(rng);
        }
    }

    fn draw(&self, out: &mut DisplayList) {
        let mid = self.height / 2.0;
        out.dashed_line(
            Vec2::new(0.0, mid),
            Vec2::new(self.width, mid),
            Color::Rgba(255, 255, 255, 0.5),
            1.0,
            10.0,
        );

        for (paddle, color, emoji) in [
            (&self.ai_paddle, Color::Css("#e74c3c"), "🤖"),
            (&self.player_paddle, Color::Css("#2ecc71"), "🎅"),
        ] {
            let rect = paddle.rect();
            out.fill_rect(rect, color);
            out.glyph(Glyph::new(emoji, rect.center(), 30.0));
        }

        out.glyph(Glyph::new("🎾", self.ball.pos, 30.0));
    }

    fn stats(&self) -> ThemeStats {
        self.stats
    }
}
