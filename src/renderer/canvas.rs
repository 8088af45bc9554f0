//! 2D canvas painter
//!
//! Walks a `DisplayList` and issues `CanvasRenderingContext2d` calls. Canvas
//! errors are non-fatal: a failed transform just skips that sprite.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

use super::display_list::{Baseline, DisplayList, DrawCommand, Glyph, TextAlign};

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    pub size: (f32, f32),
}

impl CanvasPainter {
    /// Grab the 2D context of a canvas element
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            size: (canvas.width() as f32, canvas.height() as f32),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width as f32, height as f32);
    }

    pub fn clear(&self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.size.0 as f64, self.size.1 as f64);
    }

    /// Draw the camera frame mirrored so players see themselves as in a mirror
    pub fn draw_camera_frame(&self, video: &HtmlVideoElement) {
        let (w, h) = (self.size.0 as f64, self.size.1 as f64);
        self.ctx.save();
        self.ctx.scale(-1.0, 1.0).ok();
        self.ctx.translate(-w, 0.0).ok();
        self.ctx
            .draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, w, h)
            .ok();
        self.ctx.restore();
    }

    pub fn paint(&self, list: &DisplayList) {
        for command in &list.commands {
            match command {
                DrawCommand::Glyph(glyph) => self.paint_glyph(glyph),
                DrawCommand::FillRect { rect, color } => {
                    self.ctx.set_fill_style_str(&color.to_css());
                    self.ctx.fill_rect(
                        rect.x as f64,
                        rect.y as f64,
                        rect.w as f64,
                        rect.h as f64,
                    );
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                    alpha,
                } => {
                    self.ctx.set_global_alpha(*alpha as f64);
                    self.ctx.set_fill_style_str(&color.to_css());
                    self.ctx.begin_path();
                    self.ctx
                        .arc(
                            center.x as f64,
                            center.y as f64,
                            radius.max(0.0) as f64,
                            0.0,
                            std::f64::consts::TAU,
                        )
                        .ok();
                    self.ctx.fill();
                    self.ctx.set_global_alpha(1.0);
                }
                DrawCommand::Quad { points, color } => {
                    self.ctx.set_fill_style_str(&color.to_css());
                    self.ctx.begin_path();
                    self.ctx.move_to(points[0].x as f64, points[0].y as f64);
                    for p in &points[1..] {
                        self.ctx.line_to(p.x as f64, p.y as f64);
                    }
                    self.ctx.close_path();
                    self.ctx.fill();
                }
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    width,
                    dash,
                } => {
                    self.set_dash(*dash);
                    self.ctx.set_stroke_style_str(&color.to_css());
                    self.ctx.set_line_width(*width as f64);
                    self.ctx.begin_path();
                    self.ctx.move_to(from.x as f64, from.y as f64);
                    self.ctx.line_to(to.x as f64, to.y as f64);
                    self.ctx.stroke();
                    self.set_dash(0.0);
                }
                DrawCommand::Tint { color } => {
                    self.ctx.set_fill_style_str(&color.to_css());
                    self.ctx
                        .fill_rect(0.0, 0.0, self.size.0 as f64, self.size.1 as f64);
                }
            }
        }
    }

    fn paint_glyph(&self, glyph: &Glyph) {
        self.ctx.save();
        self.ctx.set_font(&format!("{}px Arial", glyph.size.max(1.0).floor()));
        self.ctx.set_text_align(match glyph.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        self.ctx.set_text_baseline(match glyph.baseline {
            Baseline::Middle => "middle",
            Baseline::Alphabetic => "alphabetic",
        });
        if let Some(color) = glyph.color {
            self.ctx.set_fill_style_str(&color.to_css());
        }
        self.ctx.translate(glyph.pos.x as f64, glyph.pos.y as f64).ok();
        if glyph.rotation != 0.0 {
            self.ctx.rotate(glyph.rotation as f64).ok();
        }
        if glyph.flip_x {
            self.ctx.scale(-1.0, 1.0).ok();
        }
        self.ctx.fill_text(&glyph.text, 0.0, 0.0).ok();
        self.ctx.restore();
    }

    fn set_dash(&self, dash: f32) {
        let pattern = js_sys::Array::new();
        if dash > 0.0 {
            pattern.push(&JsValue::from_f64(dash as f64));
            pattern.push(&JsValue::from_f64(dash as f64));
        }
        self.ctx.set_line_dash(&pattern).ok();
    }
}
