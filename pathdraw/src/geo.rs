pub use path_protocol::LatLng;

/// Equatorial radius used by the map SDK's own distance helper.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Great-circle distance in meters (Haversine).
pub fn measure(a: LatLng, b: LatLng) -> f64 {
    let d_lat = b.lat.to_radians() - a.lat.to_radians();
    let d_lng = b.lng.to_radians() - a.lng.to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c * 1000.0
}

/// Arithmetic midpoint. Only meaningful at street scale.
pub fn center(a: LatLng, b: LatLng) -> LatLng {
    LatLng::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
}

/// Total length in meters of a polyline.
pub fn polyline_length(coords: &[LatLng]) -> f64 {
    coords.windows(2).map(|w| measure(w[0], w[1])).sum()
}

/// Length of the map's scale bar at each level (1 = closest).
pub fn scale_bar_meters(level: u8) -> Option<u32> {
    let meters = match level {
        1 => 20,
        2 => 30,
        3 => 50,
        4 => 100,
        5 => 250,
        6 => 500,
        7 => 1_000,
        8 => 2_000,
        9 => 4_000,
        10 => 8_000,
        11 => 16_000,
        12 => 32_000,
        13 => 64_000,
        14 => 128_000,
        _ => return None,
    };
    Some(meters)
}

/// Axis-aligned geographic rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    pub fn center(&self) -> LatLng {
        center(self.south_west, self.north_east)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GANGNAM: LatLng = LatLng::new(37.4918782, 127.0324566);

    #[test]
    fn measure_is_zero_for_identical_points() {
        assert_eq!(measure(GANGNAM, GANGNAM), 0.0);
    }

    #[test]
    fn measure_is_symmetric_and_positive() {
        let other = LatLng::new(37.5665, 126.9780);
        let there = measure(GANGNAM, other);
        let back = measure(other, GANGNAM);
        assert!(there > 0.0);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn measure_matches_a_constructed_kilometer() {
        // One kilometer due north on a sphere of the same radius.
        let d_lat = (1.0 / EARTH_RADIUS_KM).to_degrees();
        let north = LatLng::new(GANGNAM.lat + d_lat, GANGNAM.lng);
        let meters = measure(GANGNAM, north);
        assert!((meters - 1000.0).abs() < 10.0, "got {meters}");
    }

    #[test]
    fn center_is_arithmetic_midpoint() {
        let mid = center(LatLng::new(10.0, 20.0), LatLng::new(20.0, 40.0));
        assert_eq!(mid, LatLng::new(15.0, 30.0));
    }

    #[test]
    fn bounds_cover_every_point() {
        let a = LatLng::new(37.49, 127.03);
        let b = LatLng::new(37.51, 127.01);
        let bounds = Bounds::from_points([a, b]).unwrap();
        assert!(bounds.contains(a));
        assert!(bounds.contains(b));
        assert!(bounds.contains(bounds.center()));
        assert!(!bounds.contains(LatLng::new(37.52, 127.02)));
        assert_eq!(bounds.south_west, LatLng::new(37.49, 127.01));
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn polyline_length_sums_segments() {
        let d_lat = (0.5 / EARTH_RADIUS_KM).to_degrees();
        let mid = LatLng::new(GANGNAM.lat + d_lat, GANGNAM.lng);
        let end = LatLng::new(GANGNAM.lat + 2.0 * d_lat, GANGNAM.lng);
        let total = polyline_length(&[GANGNAM, mid, end]);
        assert!((total - 1000.0).abs() < 10.0);
        assert_eq!(polyline_length(&[GANGNAM]), 0.0);
    }

    #[test]
    fn scale_bar_covers_sdk_levels() {
        assert_eq!(scale_bar_meters(4), Some(100));
        assert_eq!(scale_bar_meters(14), Some(128_000));
        assert_eq!(scale_bar_meters(0), None);
        assert_eq!(scale_bar_meters(15), None);
    }
}
