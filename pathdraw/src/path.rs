use path_protocol::PathRecord;

use crate::geo::{LatLng, measure, polyline_length};

/// Distance to the destination under which the walk counts as arrived.
pub const ARRIVAL_THRESHOLD_M: f64 = 300.0;

/// Points removed by one undo.
pub const UNDO_CHUNK: usize = 8;

/// The visitor's own path while it is being drawn.
///
/// Never empty: it is seeded with the starting coordinate and undo falls
/// back to that seed.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPath {
    starting: LatLng,
    destination: LatLng,
    coords: Vec<LatLng>,
}

impl DrawnPath {
    pub fn new(starting: LatLng, destination: LatLng) -> Self {
        Self {
            starting,
            destination,
            coords: vec![starting],
        }
    }

    pub fn starting(&self) -> LatLng {
        self.starting
    }

    pub fn destination(&self) -> LatLng {
        self.destination
    }

    pub fn coords(&self) -> &[LatLng] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn last(&self) -> LatLng {
        self.coords.last().copied().unwrap_or(self.starting)
    }

    /// Append a drawn point; returns whether the path has now arrived.
    pub fn push(&mut self, coords: LatLng) -> bool {
        self.coords.push(coords);
        self.has_arrived()
    }

    /// At least one point was drawn and the last one is near the destination.
    pub fn has_arrived(&self) -> bool {
        self.coords.len() > 1 && measure(self.last(), self.destination) <= ARRIVAL_THRESHOLD_M
    }

    /// Drop the trailing [`UNDO_CHUNK`] points. Returns how many were removed.
    pub fn undo(&mut self) -> usize {
        let before = self.coords.len();
        if before <= 1 {
            return 0;
        }
        self.coords.truncate(before.saturating_sub(UNDO_CHUNK));
        if self.coords.is_empty() {
            self.coords.push(self.starting);
        }
        before - self.coords.len()
    }

    pub fn length_meters(&self) -> f64 {
        polyline_length(&self.coords)
    }

    pub fn to_record(&self, id: impl Into<String>) -> PathRecord {
        PathRecord {
            id: id.into(),
            user: None,
            coords: self.coords.clone(),
            starting: self.starting,
            destination: self.destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_KM;

    const START: LatLng = LatLng::new(37.4918782, 127.0324566);

    fn north_of(origin: LatLng, meters: f64) -> LatLng {
        LatLng::new(origin.lat + (meters / 1000.0 / EARTH_RADIUS_KM).to_degrees(), origin.lng)
    }

    fn path_with(len: usize) -> DrawnPath {
        let mut path = DrawnPath::new(START, north_of(START, 5_000.0));
        for i in 1..len {
            path.push(north_of(START, i as f64 * 10.0));
        }
        path
    }

    #[test]
    fn undo_removes_a_chunk() {
        let mut path = path_with(20);
        assert_eq!(path.undo(), UNDO_CHUNK);
        assert_eq!(path.len(), 12);
        assert_eq!(path.last(), north_of(START, 110.0));
    }

    #[test]
    fn undo_reseeds_with_the_starting_point() {
        for len in [2, 5, 8] {
            let mut path = path_with(len);
            path.undo();
            assert_eq!(path.coords(), &[START]);
        }

        let mut path = path_with(9);
        path.undo();
        assert_eq!(path.coords(), &[START]);
    }

    #[test]
    fn undo_on_the_seed_alone_is_a_no_op() {
        let mut path = path_with(1);
        assert_eq!(path.undo(), 0);
        assert_eq!(path.coords(), &[START]);
    }

    #[test]
    fn arrival_follows_the_last_point() {
        let destination = north_of(START, 1_000.0);
        let mut path = DrawnPath::new(START, destination);
        assert!(!path.has_arrived());

        assert!(!path.push(north_of(START, 500.0)));
        assert!(path.push(north_of(START, 800.0)));
        assert!(path.has_arrived());
    }

    #[test]
    fn the_seed_alone_never_arrives() {
        let path = DrawnPath::new(START, north_of(START, 50.0));
        assert!(!path.has_arrived());
    }

    #[test]
    fn record_keeps_endpoints_and_points() {
        let path = path_with(4);
        let record = path.to_record("walk-1");
        assert_eq!(record.id, "walk-1");
        assert_eq!(record.coords, path.coords());
        assert_eq!(record.starting, START);
        assert_eq!(record.destination, north_of(START, 5_000.0));
        assert!((path.length_meters() - 30.0).abs() < 0.1);
    }
}
