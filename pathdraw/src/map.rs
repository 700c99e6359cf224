use std::{
    collections::HashMap,
    ops::{Add, Sub},
};

use tracing::debug;

use crate::geo::{Bounds, LatLng};

pub mod headless;

pub use headless::{HeadlessMap, MercatorProjection};

/// Pixel position, either absolute (world pixels at the current level) or
/// relative to the map container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Client box of the map container in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Conversion between geographic coordinates and screen space for one view
/// of the map.
pub trait Projection {
    fn point_from_coords(&self, coords: LatLng) -> Point;
    fn coords_from_point(&self, point: Point) -> LatLng;
    fn container_point_from_coords(&self, coords: LatLng) -> Point;
    fn coords_from_container_point(&self, point: Point) -> LatLng;
}

/// Pan/zoom lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEvent {
    DragStart,
    DragEnd,
    ZoomStart,
    ZoomChanged,
    /// The view was moved programmatically (re-centering, framing).
    Recentered,
}

impl MapEvent {
    /// The user started moving the map; any overlay is now stale.
    pub fn is_starting(self) -> bool {
        matches!(self, Self::DragStart | Self::ZoomStart)
    }

    /// The view settled and overlays must be re-projected.
    pub fn is_settling(self) -> bool {
        !self.is_starting()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    Starting,
    StartingDrag,
    Destination,
    DestinationDrag,
}

impl MarkerIcon {
    pub const SIZE: (u32, u32) = (30, 30);
    /// Anchor inside the image, so the sticker's middle sits on the coordinate.
    pub const OFFSET: (u32, u32) = (15, 15);

    /// Top-left corner of the image for a marker sitting on `at`.
    pub fn origin(at: Point) -> Point {
        Point::new(at.x - f64::from(Self::OFFSET.0), at.y - f64::from(Self::OFFSET.1))
    }

    pub fn asset(self) -> &'static str {
        match self {
            Self::Starting => "assets/sticker.svg",
            Self::StartingDrag => "assets/sticker_drag.svg",
            Self::Destination => "assets/sticker_blue.svg",
            Self::DestinationDrag => "assets/sticker_blue_drag.svg",
        }
    }

    pub fn dragging(self) -> Self {
        match self {
            Self::Starting | Self::StartingDrag => Self::StartingDrag,
            Self::Destination | Self::DestinationDrag => Self::DestinationDrag,
        }
    }

    pub fn resting(self) -> Self {
        match self {
            Self::Starting | Self::StartingDrag => Self::Starting,
            Self::Destination | Self::DestinationDrag => Self::Destination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub draggable: bool,
    pub icon: MarkerIcon,
}

/// The third-party interactive map.
///
/// Implementations wrap whatever the host provides (the browser SDK, or
/// [`HeadlessMap`] off-screen). Levels follow the SDK: 1 is the closest.
pub trait MapWidget {
    type Projection: Projection;

    fn center(&self) -> LatLng;
    fn set_center(&mut self, center: LatLng);
    fn level(&self) -> u8;
    fn set_level(&mut self, level: u8);
    /// Re-center and pick the closest level that shows the whole region.
    fn set_bounds(&mut self, bounds: Bounds);
    /// `None` while the container is not laid out yet.
    fn container_size(&self) -> Option<Size>;
    fn projection(&self) -> Self::Projection;
    fn add_marker(&mut self, options: MarkerOptions) -> MarkerId;
    fn set_marker_position(&mut self, marker: MarkerId, position: LatLng);
    fn set_marker_icon(&mut self, marker: MarkerId, icon: MarkerIcon);
    /// Recompute the container size after a layout change.
    fn relayout(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedMarker {
    position: LatLng,
    icon: MarkerIcon,
    dragging: bool,
}

/// Owns the single map view and queues its notifications.
///
/// Hosts forward user gestures with [`MapAdapter::notify`]; programmatic
/// view changes queue their own events. The queue is drained by whoever
/// keeps overlays aligned with the map.
pub struct MapAdapter<W: MapWidget> {
    widget: W,
    markers: HashMap<MarkerId, TrackedMarker>,
    pending: Vec<MapEvent>,
}

impl<W: MapWidget> MapAdapter<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            markers: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn center(&self) -> LatLng {
        self.widget.center()
    }

    pub fn level(&self) -> u8 {
        self.widget.level()
    }

    pub fn projection(&self) -> W::Projection {
        self.widget.projection()
    }

    pub fn container_size(&self) -> Option<Size> {
        self.widget.container_size()
    }

    pub fn relayout(&mut self) {
        self.widget.relayout();
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.widget.set_center(center);
        self.pending.push(MapEvent::Recentered);
    }

    pub fn set_level(&mut self, level: u8) {
        if self.widget.level() == level {
            return;
        }
        self.widget.set_level(level);
        self.pending.push(MapEvent::ZoomChanged);
    }

    pub fn frame(&mut self, bounds: Bounds) {
        self.widget.set_bounds(bounds);
        debug!(
            center = %self.widget.center(),
            level = self.widget.level(),
            "framed map to bounds"
        );
        self.pending.push(MapEvent::Recentered);
    }

    /// Record a gesture reported by the widget.
    pub fn notify(&mut self, event: MapEvent) {
        self.pending.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn place_marker(&mut self, options: MarkerOptions) -> MarkerId {
        let id = self.widget.add_marker(options);
        self.markers.insert(
            id,
            TrackedMarker {
                position: options.position,
                icon: options.icon,
                dragging: false,
            },
        );
        id
    }

    pub fn move_marker(&mut self, marker: MarkerId, position: LatLng) {
        if let Some(tracked) = self.markers.get_mut(&marker) {
            tracked.position = position;
            self.widget.set_marker_position(marker, position);
        }
    }

    pub fn marker_position(&self, marker: MarkerId) -> Option<LatLng> {
        self.markers.get(&marker).map(|m| m.position)
    }

    pub fn marker_icon(&self, marker: MarkerId) -> Option<MarkerIcon> {
        self.markers.get(&marker).map(|m| m.icon)
    }

    pub fn is_dragging(&self, marker: MarkerId) -> bool {
        self.markers.get(&marker).is_some_and(|m| m.dragging)
    }

    pub fn marker_drag_started(&mut self, marker: MarkerId) {
        if let Some(tracked) = self.markers.get_mut(&marker) {
            tracked.dragging = true;
            tracked.icon = tracked.icon.dragging();
            self.widget.set_marker_icon(marker, tracked.icon);
        }
    }

    /// The marker was dropped at `position`. The view is left where it is.
    pub fn marker_drag_ended(&mut self, marker: MarkerId, position: LatLng) -> Option<LatLng> {
        let tracked = self.markers.get_mut(&marker)?;
        tracked.dragging = false;
        tracked.icon = tracked.icon.resting();
        tracked.position = position;
        self.widget.set_marker_icon(marker, tracked.icon);
        Some(position)
    }
}
