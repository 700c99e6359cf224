use std::collections::HashMap;
use std::future::Future;

use path_protocol::LatLng;
use serde::Deserialize;
use tracing::debug;

use crate::config::ConnectorConfig;
use crate::error::ConnectorError;

/// Address search. `Ok(None)` means the lookup worked but found nothing.
pub trait Geocoder {
    fn lookup(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<LatLng>, ConnectorError>> + Send;
}

/// The map provider's address search REST API.
#[derive(Debug, Clone)]
pub struct KakaoGeocoder {
    http: reqwest::Client,
    endpoint: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    x: String,
    y: String,
}

impl KakaoGeocoder {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            key: key.into(),
        }
    }

    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let key = config
            .geocode_key
            .clone()
            .ok_or(ConnectorError::MissingGeocodeKey)?;
        Ok(Self::new(reqwest::Client::new(), &config.geocode_url, key))
    }
}

impl Geocoder for KakaoGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<LatLng>, ConnectorError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query)])
            .header("Authorization", format!("KakaoAK {}", self.key))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let found: SearchResponse = response.json().await?;
        let Some(first) = found.documents.first() else {
            debug!(query, "no address match");
            return Ok(None);
        };
        let (Ok(lat), Ok(lng)) = (first.y.parse::<f64>(), first.x.parse::<f64>()) else {
            debug!(query, x = %first.x, y = %first.y, "address match without usable coordinates");
            return Ok(None);
        };
        Ok(Some(LatLng::new(lat, lng)).filter(LatLng::is_valid))
    }
}

/// Fixed place names, for offline walks. Queries that already are
/// `lat,lng` pairs resolve to themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, LatLng>,
}

impl StaticGeocoder {
    pub fn new(places: HashMap<String, LatLng>) -> Self {
        Self { places }
    }

    pub fn resolve(&self, query: &str) -> Option<LatLng> {
        let query = query.trim();
        self.places
            .get(query)
            .copied()
            .or_else(|| query.parse().ok())
    }
}

impl Geocoder for StaticGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<LatLng>, ConnectorError> {
        Ok(self.resolve(query))
    }
}
