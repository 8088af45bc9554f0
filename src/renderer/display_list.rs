//! Backend-agnostic draw commands
//!
//! Themes describe a frame as a flat list of commands; the canvas painter (or
//! a test) consumes it. Coordinates are canvas pixels.

use glam::Vec2;

use crate::sim::collision::Rect;

/// Fill/stroke color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Named or hex CSS color
    Css(&'static str),
    /// Hue in degrees, saturation and lightness in percent
    Hsl(f32, f32, f32),
    /// 0-255 channels plus 0-1 alpha
    Rgba(u8, u8, u8, f32),
}

impl Color {
    pub const WHITE: Color = Color::Css("white");

    pub fn to_css(&self) -> String {
        match *self {
            Color::Css(name) => name.to_string(),
            Color::Hsl(h, s, l) => format!("hsl({:.0}, {:.0}%, {:.0}%)", h, s, l),
            Color::Rgba(r, g, b, a) => format!("rgba({}, {}, {}, {})", r, g, b, a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    #[default]
    Middle,
    Alphabetic,
}

/// An emoji or text sprite
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub pos: Vec2,
    /// Font size in pixels
    pub size: f32,
    pub align: TextAlign,
    pub baseline: Baseline,
    /// Rotation around `pos` in radians
    pub rotation: f32,
    /// Mirror horizontally around `pos`
    pub flip_x: bool,
    pub color: Option<Color>,
}

impl Glyph {
    pub fn new(text: impl Into<String>, pos: Vec2, size: f32) -> Self {
        Self {
            text: text.into(),
            pos,
            size,
            align: TextAlign::Center,
            baseline: Baseline::Middle,
            rotation: 0.0,
            flip_x: false,
            color: None,
        }
    }

    pub fn align(mut self, align: TextAlign, baseline: Baseline) -> Self {
        self.align = align;
        self.baseline = baseline;
        self
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn flipped(mut self) -> Self {
        self.flip_x = true;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Glyph(Glyph),
    FillRect {
        rect: Rect,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
        alpha: f32,
    },
    /// Filled convex quad, points in winding order
    Quad {
        points: [Vec2; 4],
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
        /// Dash length (0 = solid)
        dash: f32,
    },
    /// Translucent fill over the whole canvas
    Tint {
        color: Color,
    },
}

/// One frame's worth of draw commands
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn glyph(&mut self, glyph: Glyph) {
        self.commands.push(DrawCommand::Glyph(glyph));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color, alpha: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha: alpha.clamp(0.0, 1.0),
        });
    }

    pub fn quad(&mut self, points: [Vec2; 4], color: Color) {
        self.commands.push(DrawCommand::Quad { points, color });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
            dash: 0.0,
        });
    }

    pub fn dashed_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32, dash: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
            dash,
        });
    }

    pub fn tint(&mut self, color: Color) {
        self.commands.push(DrawCommand::Tint { color });
    }

    /// All glyph texts, in draw order
    pub fn glyph_texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Glyph(g) => Some(g.text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css() {
        assert_eq!(Color::Css("#555").to_css(), "#555");
        assert_eq!(Color::Hsl(30.4, 100.0, 50.0).to_css(), "hsl(30, 100%, 50%)");
        assert_eq!(Color::Rgba(255, 0, 0, 0.3).to_css(), "rgba(255, 0, 0, 0.3)");
    }

    #[test]
    fn test_circle_alpha_is_clamped() {
        let mut list = DisplayList::new();
        list.circle(Vec2::ZERO, 5.0, Color::WHITE, -0.5);
        assert!(matches!(
            list.commands[0],
            DrawCommand::Circle { alpha, .. } if alpha == 0.0
        ));
    }

    #[test]
    fn test_glyph_texts() {
        let mut list = DisplayList::new();
        list.glyph(Glyph::new("🎄", Vec2::ZERO, 50.0));
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        list.glyph(Glyph::new("🔔", Vec2::ONE, 50.0).flipped());
        assert_eq!(list.glyph_texts().collect::<Vec<_>>(), vec!["🎄", "🔔"]);
    }
}
