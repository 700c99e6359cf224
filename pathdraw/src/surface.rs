use path_protocol::PathRecord;
use tracing::{debug, trace};

use crate::geo::LatLng;
use crate::map::{Point, Projection, Size};

pub mod recording;
pub mod svg;
#[cfg(feature = "web")]
pub mod web;

pub use recording::{CanvasOp, RecordingCanvas};
pub use svg::SvgCanvas;

/// Pointer closer than this to any edge pans the map instead of drawing.
pub const EDGE_MARGIN: f64 = 40.0;

/// Only every Nth pointer-move while drawing becomes a path point.
pub const COMMIT_EVERY: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub color: &'static str,
    pub cap: LineCap,
}

pub const MY_PATH_STYLE: StrokeStyle = StrokeStyle {
    width: 5.0,
    color: "rgba(255,1,2,1)",
    cap: LineCap::Round,
};

pub const OTHERS_STYLE: StrokeStyle = StrokeStyle {
    width: 4.0,
    color: "rgba(255,1,2,0.6)",
    cap: LineCap::Round,
};

/// The parts of a 2D drawing context the surface needs.
pub trait Canvas {
    /// Set the backing store size in device pixels.
    fn resize(&mut self, width: u32, height: u32);
    fn scale(&mut self, x: f64, y: f64);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);
    fn set_stroke_style(&mut self, style: &StrokeStyle);
}

/// High-density screens get a 2x backing store, everything else 1x.
pub fn effective_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio > 1.0 { 2.0 } else { 1.0 }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// Not drawing.
    Idle,
    /// Counted but not sampled.
    Skipped,
    /// A new path point.
    Committed(LatLng),
    /// Pointer reached the edge; the map should re-center here.
    Panned(LatLng),
}

/// Transparent canvas layered over the map container.
pub struct DrawingSurface<C: Canvas> {
    canvas: C,
    stage: Size,
    pixel_ratio: f64,
    ready: bool,
    capturing: bool,
    pointer_down: bool,
    moves: u32,
}

impl<C: Canvas> DrawingSurface<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            stage: Size::new(0.0, 0.0),
            pixel_ratio: 1.0,
            ready: false,
            capturing: false,
            pointer_down: false,
            moves: 0,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    pub fn stage(&self) -> Size {
        self.stage
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_capturing(&self) -> bool {
        self.ready && self.capturing
    }

    pub fn is_drawing(&self) -> bool {
        self.pointer_down
    }

    /// Size the backing store to the container. Without a laid-out container
    /// the surface stays inert.
    pub fn init(&mut self, container: Option<Size>, device_pixel_ratio: f64) -> bool {
        let Some(stage) = container.filter(|s| !s.is_empty()) else {
            debug!("map container not laid out, drawing surface stays inactive");
            return false;
        };
        let ratio = effective_pixel_ratio(device_pixel_ratio);
        self.stage = stage;
        self.pixel_ratio = ratio;
        self.canvas.resize(
            (stage.width * ratio).round() as u32,
            (stage.height * ratio).round() as u32,
        );
        self.canvas.scale(ratio, ratio);
        self.ready = true;
        true
    }

    pub fn set_capture(&mut self, capturing: bool) {
        self.capturing = capturing;
        if !capturing {
            self.end_stroke();
        }
    }

    pub fn clear(&mut self) {
        if self.ready {
            self.canvas
                .clear_rect(0.0, 0.0, self.stage.width, self.stage.height);
        }
    }

    pub fn is_near_edge(&self, at: Point) -> bool {
        at.x < EDGE_MARGIN
            || at.y < EDGE_MARGIN
            || at.x > self.stage.width - EDGE_MARGIN
            || at.y > self.stage.height - EDGE_MARGIN
    }

    /// Start a stroke continuing from `from`.
    pub fn pointer_down<P: Projection>(&mut self, projection: &P, from: LatLng) -> bool {
        if !self.is_capturing() {
            return false;
        }
        self.pointer_down = true;
        self.moves = 0;

        let start = projection.container_point_from_coords(from);
        self.canvas.save();
        self.canvas.begin_path();
        self.canvas.set_stroke_style(&MY_PATH_STYLE);
        self.canvas.move_to(start.x, start.y);
        true
    }

    pub fn pointer_move<P: Projection>(&mut self, projection: &P, at: Point) -> MoveOutcome {
        if !self.pointer_down || !self.is_capturing() {
            return MoveOutcome::Idle;
        }
        self.moves += 1;

        if self.is_near_edge(at) {
            self.end_stroke();
            let target = projection.coords_from_container_point(at);
            debug!(x = at.x, y = at.y, %target, "pointer at canvas edge, panning");
            return MoveOutcome::Panned(target);
        }

        if self.moves < COMMIT_EVERY {
            return MoveOutcome::Skipped;
        }
        self.moves = 0;

        let coords = projection.coords_from_container_point(at);
        let point = projection.container_point_from_coords(coords);
        self.canvas.line_to(point.x, point.y);
        self.canvas.stroke();
        trace!(%coords, "committed path point");
        MoveOutcome::Committed(coords)
    }

    /// Returns whether a stroke was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_drawing = self.pointer_down;
        self.end_stroke();
        was_drawing
    }

    fn end_stroke(&mut self) {
        if self.pointer_down {
            self.pointer_down = false;
            self.canvas.restore();
        }
        self.moves = 0;
    }

    /// Clear and re-project every path against `projection`.
    pub fn redraw<P: Projection>(
        &mut self,
        projection: &P,
        mine: &[LatLng],
        others: &[PathRecord],
        highlight: Option<&PathRecord>,
    ) {
        if !self.ready {
            return;
        }
        self.clear();

        if !others.is_empty() {
            self.canvas.save();
            self.canvas.set_stroke_style(&OTHERS_STYLE);
            self.canvas.begin_path();
            for other in others {
                self.trace_polyline(projection, &other.coords);
            }
            self.canvas.stroke();
            self.canvas.restore();
        }

        for coords in [Some(mine), highlight.map(|r| r.coords.as_slice())]
            .into_iter()
            .flatten()
            .filter(|c| !c.is_empty())
        {
            self.canvas.save();
            self.canvas.set_stroke_style(&MY_PATH_STYLE);
            self.canvas.begin_path();
            self.trace_polyline(projection, coords);
            self.canvas.stroke();
            self.canvas.restore();
        }

        // A stroke in progress continues from the last point.
        if self.pointer_down
            && let Some(last) = mine.last()
        {
            let point = projection.container_point_from_coords(*last);
            self.canvas.begin_path();
            self.canvas.set_stroke_style(&MY_PATH_STYLE);
            self.canvas.move_to(point.x, point.y);
        }
    }

    fn trace_polyline<P: Projection>(&mut self, projection: &P, coords: &[LatLng]) {
        let mut points = coords
            .iter()
            .map(|c| projection.container_point_from_coords(*c));
        if let Some(first) = points.next() {
            self.canvas.move_to(first.x, first.y);
        }
        for point in points {
            self.canvas.line_to(point.x, point.y);
        }
    }
}
