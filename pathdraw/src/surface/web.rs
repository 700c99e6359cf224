//! Browser backend: the surface draws straight into the page's 2D context.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::{Canvas, StrokeStyle};

fn log_js_error(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        tracing::warn!(op, error = ?err, "canvas call failed");
    }
}

impl Canvas for CanvasRenderingContext2d {
    fn resize(&mut self, width: u32, height: u32) {
        if let Some(canvas) = CanvasRenderingContext2d::canvas(self) {
            canvas.set_width(width);
            canvas.set_height(height);
        }
    }

    fn scale(&mut self, x: f64, y: f64) {
        log_js_error("scale", CanvasRenderingContext2d::scale(self, x, y));
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, width, height);
    }

    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.set_line_width(style.width);
        self.set_stroke_style_str(style.color);
        self.set_line_cap(style.cap.as_str());
    }
}
