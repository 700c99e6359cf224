use path_protocol::PathRecord;
use tracing::debug;

use crate::geo::{Bounds, LatLng};
use crate::map::{MapAdapter, MapEvent, MapWidget, Point};
use crate::path::DrawnPath;
use crate::surface::{Canvas, DrawingSurface, MoveOutcome};

/// The map and the drawing surface as one unit.
///
/// Owns the map adapter, the canvas, my path and everyone else's paths, so
/// every view change and every redraw go through one place.
pub struct SyncedOverlay<M: MapWidget, C: Canvas> {
    map: MapAdapter<M>,
    surface: DrawingSurface<C>,
    mine: Option<DrawnPath>,
    others: Vec<PathRecord>,
    highlight: Option<PathRecord>,
}

impl<M: MapWidget, C: Canvas> SyncedOverlay<M, C> {
    pub fn new(map: M, canvas: C) -> Self {
        Self {
            map: MapAdapter::new(map),
            surface: DrawingSurface::new(canvas),
            mine: None,
            others: Vec::new(),
            highlight: None,
        }
    }

    pub fn map(&self) -> &MapAdapter<M> {
        &self.map
    }

    /// Direct access for marker handling. View changes made here are picked
    /// up by the next [`SyncedOverlay::sync`].
    pub fn map_mut(&mut self) -> &mut MapAdapter<M> {
        &mut self.map
    }

    pub fn surface(&self) -> &DrawingSurface<C> {
        &self.surface
    }

    pub fn canvas(&self) -> &C {
        self.surface.canvas()
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        self.surface.canvas_mut()
    }

    pub fn my_path(&self) -> Option<&DrawnPath> {
        self.mine.as_ref()
    }

    pub fn others(&self) -> &[PathRecord] {
        &self.others
    }

    pub fn highlight(&self) -> Option<&PathRecord> {
        self.highlight.as_ref()
    }

    /// Lay out the canvas over the map container and draw what is known.
    pub fn attach(&mut self, device_pixel_ratio: f64) -> bool {
        self.map.relayout();
        let attached = self
            .surface
            .init(self.map.container_size(), device_pixel_ratio);
        if attached {
            self.redraw();
        }
        attached
    }

    /// Apply queued map notifications: stale overlays are cleared while the
    /// map moves and redrawn once it settles.
    pub fn sync(&mut self) {
        let mut redraw = false;
        for event in self.map.drain_events() {
            if event.is_starting() {
                self.surface.clear();
                redraw = false;
            } else {
                redraw = true;
            }
        }
        if redraw {
            self.redraw();
        }
    }

    pub fn handle_map_event(&mut self, event: MapEvent) {
        self.map.notify(event);
        self.sync();
    }

    pub fn recenter(&mut self, center: LatLng) {
        self.map.set_center(center);
        self.sync();
    }

    pub fn set_level(&mut self, level: u8) {
        self.map.set_level(level);
        self.sync();
    }

    pub fn frame(&mut self, bounds: Bounds) {
        self.map.frame(bounds);
        self.sync();
    }

    pub fn set_others(&mut self, others: Vec<PathRecord>) {
        self.others = others;
        self.redraw();
    }

    pub fn set_highlight(&mut self, record: Option<PathRecord>) {
        self.highlight = record;
        self.redraw();
    }

    pub fn start_drawing(&mut self, path: DrawnPath) {
        self.mine = Some(path);
        self.surface.set_capture(true);
        self.redraw();
    }

    /// Stop capturing input; my path stays on screen.
    pub fn finish_drawing(&mut self) {
        self.surface.set_capture(false);
    }

    pub fn pointer_down(&mut self) -> bool {
        let Some(mine) = &self.mine else {
            return false;
        };
        let projection = self.map.projection();
        self.surface.pointer_down(&projection, mine.last())
    }

    pub fn pointer_move(&mut self, at: Point) -> MoveOutcome {
        if self.mine.is_none() {
            return MoveOutcome::Idle;
        }
        let projection = self.map.projection();
        let outcome = self.surface.pointer_move(&projection, at);
        match outcome {
            MoveOutcome::Committed(coords) => {
                if let Some(mine) = self.mine.as_mut() {
                    mine.push(coords);
                }
            }
            MoveOutcome::Panned(target) => {
                self.recenter(target);
            }
            MoveOutcome::Idle | MoveOutcome::Skipped => {}
        }
        outcome
    }

    /// End the stroke. Returns whether my path has arrived.
    pub fn pointer_up(&mut self) -> bool {
        self.surface.pointer_up();
        self.mine.as_ref().is_some_and(DrawnPath::has_arrived)
    }

    pub fn undo(&mut self) -> usize {
        let removed = self.mine.as_mut().map_or(0, DrawnPath::undo);
        if removed > 0 {
            debug!(removed, "undid path points");
            self.redraw();
        }
        removed
    }

    pub fn redraw(&mut self) {
        let projection = self.map.projection();
        let mine = self.mine.as_ref().map(DrawnPath::coords).unwrap_or(&[]);
        self.surface
            .redraw(&projection, mine, &self.others, self.highlight.as_ref());
    }
}
