use std::f64::consts::PI;

use crate::geo::{Bounds, LatLng};

use super::{MapWidget, MarkerIcon, MarkerId, MarkerOptions, Point, Projection, Size};

pub const TILE_SIZE: f64 = 256.0;
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 14;

/// Share of the container a framed region may occupy.
const FRAME_FILL: f64 = 0.8;

/// Web Mercator zoom equivalent of an SDK level.
fn zoom(level: u8) -> i32 {
    20 - i32::from(level.clamp(MIN_LEVEL, MAX_LEVEL))
}

fn world_size(level: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom(level))
}

fn lng_to_x(lng: f64, level: u8) -> f64 {
    (lng + 180.0) / 360.0 * world_size(level)
}

fn lat_to_y(lat: f64, level: u8) -> f64 {
    let sin = lat.to_radians().sin().clamp(-0.9999, 0.9999);
    (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * world_size(level)
}

fn x_to_lng(x: f64, level: u8) -> f64 {
    x / world_size(level) * 360.0 - 180.0
}

fn y_to_lat(y: f64, level: u8) -> f64 {
    let n = PI - 2.0 * PI * y / world_size(level);
    n.sinh().atan().to_degrees()
}

/// Snapshot of a [`HeadlessMap`] view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorProjection {
    center: LatLng,
    level: u8,
    size: Size,
}

impl MercatorProjection {
    pub fn new(center: LatLng, level: u8, size: Size) -> Self {
        Self {
            center,
            level,
            size,
        }
    }

    /// Absolute pixel position of the container's top-left corner.
    fn origin(&self) -> Point {
        let center = self.point_from_coords(self.center);
        Point::new(
            center.x - self.size.width / 2.0,
            center.y - self.size.height / 2.0,
        )
    }
}

impl Projection for MercatorProjection {
    fn point_from_coords(&self, coords: LatLng) -> Point {
        Point::new(
            lng_to_x(coords.lng, self.level),
            lat_to_y(coords.lat, self.level),
        )
    }

    fn coords_from_point(&self, point: Point) -> LatLng {
        LatLng::new(y_to_lat(point.y, self.level), x_to_lng(point.x, self.level))
    }

    fn container_point_from_coords(&self, coords: LatLng) -> Point {
        self.point_from_coords(coords) - self.origin()
    }

    fn coords_from_container_point(&self, point: Point) -> LatLng {
        self.coords_from_point(point + self.origin())
    }
}

/// Off-screen map used for scripted walks, rendering, and tests.
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    center: LatLng,
    level: u8,
    size: Option<Size>,
    markers: Vec<MarkerOptions>,
}

impl HeadlessMap {
    pub fn new(center: LatLng, level: u8, size: Size) -> Self {
        Self {
            center,
            level: level.clamp(MIN_LEVEL, MAX_LEVEL),
            size: Some(size),
            markers: Vec::new(),
        }
    }

    /// A map whose container has not been laid out.
    pub fn detached(center: LatLng, level: u8) -> Self {
        Self {
            size: None,
            ..Self::new(center, level, Size::new(0.0, 0.0))
        }
    }

    pub fn marker(&self, marker: MarkerId) -> Option<&MarkerOptions> {
        self.markers.get(marker.0 as usize)
    }

    pub fn markers(&self) -> &[MarkerOptions] {
        &self.markers
    }

    fn fits(&self, bounds: &Bounds, level: u8, size: Size) -> bool {
        let width = lng_to_x(bounds.north_east.lng, level) - lng_to_x(bounds.south_west.lng, level);
        let height = lat_to_y(bounds.south_west.lat, level) - lat_to_y(bounds.north_east.lat, level);
        width <= size.width * FRAME_FILL && height <= size.height * FRAME_FILL
    }
}

impl MapWidget for HeadlessMap {
    type Projection = MercatorProjection;

    fn center(&self) -> LatLng {
        self.center
    }

    fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    fn level(&self) -> u8 {
        self.level
    }

    fn set_level(&mut self, level: u8) {
        self.level = level.clamp(MIN_LEVEL, MAX_LEVEL);
    }

    fn set_bounds(&mut self, bounds: Bounds) {
        self.center = bounds.center();
        let Some(size) = self.size.filter(|s| !s.is_empty()) else {
            return;
        };
        self.level = (MIN_LEVEL..=MAX_LEVEL)
            .find(|&level| self.fits(&bounds, level, size))
            .unwrap_or(MAX_LEVEL);
    }

    fn container_size(&self) -> Option<Size> {
        self.size
    }

    fn projection(&self) -> MercatorProjection {
        MercatorProjection::new(
            self.center,
            self.level,
            self.size.unwrap_or(Size::new(0.0, 0.0)),
        )
    }

    fn add_marker(&mut self, options: MarkerOptions) -> MarkerId {
        self.markers.push(options);
        MarkerId((self.markers.len() - 1) as u32)
    }

    fn set_marker_position(&mut self, marker: MarkerId, position: LatLng) {
        if let Some(options) = self.markers.get_mut(marker.0 as usize) {
            options.position = position;
        }
    }

    fn set_marker_icon(&mut self, marker: MarkerId, icon: MarkerIcon) {
        if let Some(options) = self.markers.get_mut(marker.0 as usize) {
            options.icon = icon;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::measure;

    const GANGNAM: LatLng = LatLng::new(37.4918782, 127.0324566);

    #[test]
    fn center_projects_to_middle_of_container() {
        let map = HeadlessMap::new(GANGNAM, 4, Size::new(800.0, 600.0));
        let point = map.projection().container_point_from_coords(GANGNAM);
        assert!((point.x - 400.0).abs() < 1e-6);
        assert!((point.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn container_projection_round_trips() {
        let map = HeadlessMap::new(GANGNAM, 4, Size::new(800.0, 600.0));
        let projection = map.projection();
        let point = Point::new(123.0, 456.0);
        let coords = projection.coords_from_container_point(point);
        let back = projection.container_point_from_coords(coords);
        assert!((back.x - point.x).abs() < 1e-6);
        assert!((back.y - point.y).abs() < 1e-6);
    }

    #[test]
    fn absolute_and_container_points_differ_by_origin() {
        let map = HeadlessMap::new(GANGNAM, 6, Size::new(400.0, 400.0));
        let projection = map.projection();
        let coords = LatLng::new(37.5, 127.04);
        let absolute = projection.point_from_coords(coords);
        let relative = projection.container_point_from_coords(coords);
        let origin = absolute - relative;
        let center = projection.point_from_coords(GANGNAM);
        assert!((origin.x - (center.x - 200.0)).abs() < 1e-6);
        assert!((origin.y - (center.y - 200.0)).abs() < 1e-6);
    }

    #[test]
    fn level_doubles_the_ground_resolution() {
        let near = HeadlessMap::new(GANGNAM, 3, Size::new(800.0, 600.0)).projection();
        let far = HeadlessMap::new(GANGNAM, 4, Size::new(800.0, 600.0)).projection();
        let step = Point::new(500.0, 300.0);
        let near_m = measure(GANGNAM, near.coords_from_container_point(step));
        let far_m = measure(GANGNAM, far.coords_from_container_point(step));
        assert!((far_m / near_m - 2.0).abs() < 0.01);
    }

    #[test]
    fn framing_picks_the_closest_level_that_fits() {
        let mut map = HeadlessMap::new(GANGNAM, 9, Size::new(800.0, 600.0));
        let destination = LatLng::new(37.4979, 127.0276);
        let bounds = Bounds::from_points([GANGNAM, destination]).unwrap();
        map.set_bounds(bounds);

        assert_eq!(map.center(), bounds.center());
        let projection = map.projection();
        for coords in [GANGNAM, destination] {
            let p = projection.container_point_from_coords(coords);
            assert!((0.0..=800.0).contains(&p.x));
            assert!((0.0..=600.0).contains(&p.y));
        }
        let tighter = map.level() - 1;
        assert!(!map.fits(&bounds, tighter, Size::new(800.0, 600.0)));
    }

    #[test]
    fn detached_map_keeps_level_when_framing() {
        let mut map = HeadlessMap::detached(GANGNAM, 7);
        map.set_bounds(Bounds::from_point(LatLng::new(37.0, 127.0)));
        assert_eq!(map.level(), 7);
        assert_eq!(map.center(), LatLng::new(37.0, 127.0));
        assert!(map.container_size().is_none());
    }
}
