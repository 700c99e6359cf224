//! Draw a walking path on a map between two searched pins, and see the
//! paths other visitors drew.
//!
//! The crate holds the page logic only. Maps and canvases come in through
//! [`map::MapWidget`] and [`surface::Canvas`]; network calls are made by the
//! host, which reports their outcome back to [`PathPage`].

pub mod geo;
pub mod link;
pub mod map;
pub mod overlay;
pub mod page;
pub mod path;
pub mod phase;
pub mod surface;

pub use page::{Notice, PageError, PathPage};
pub use path_protocol::{LatLng, PathRecord};
pub use phase::{Phase, Pin};
