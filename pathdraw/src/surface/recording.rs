use super::{Canvas, StrokeStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Resize(u32, u32),
    Scale(f64, f64),
    ClearRect(f64, f64, f64, f64),
    Save,
    Restore,
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
    Style(StrokeStyle),
}

/// Canvas that only remembers what was asked of it.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<CanvasOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn count(&self, pred: impl Fn(&CanvasOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Canvas for RecordingCanvas {
    fn resize(&mut self, width: u32, height: u32) {
        self.ops.push(CanvasOp::Resize(width, height));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.ops.push(CanvasOp::Scale(x, y));
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(CanvasOp::ClearRect(x, y, width, height));
    }

    fn save(&mut self) {
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(CanvasOp::Restore);
    }

    fn begin_path(&mut self) {
        self.ops.push(CanvasOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(CanvasOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(CanvasOp::LineTo(x, y));
    }

    fn stroke(&mut self) {
        self.ops.push(CanvasOp::Stroke);
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.ops.push(CanvasOp::Style(*style));
    }
}
