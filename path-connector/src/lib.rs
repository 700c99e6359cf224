pub mod config;
pub mod error;
pub mod geocode;
pub mod local;
pub mod session;
pub mod store;

pub use config::ConnectorConfig;
pub use error::ConnectorError;
pub use geocode::{Geocoder, KakaoGeocoder, StaticGeocoder};
pub use local::LocalIds;
pub use session::WalkScript;
pub use store::{PathStore, RetryPolicy};
