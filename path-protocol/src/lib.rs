use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Content type of every stored path blob.
pub const PATH_CONTENT_TYPE: &str = "application/json";

/// Name under which a visitor's uploaded path ids are kept on the device.
pub const MY_PATH_IDS_KEY: &str = "myPathIds";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("malformed envelope body: {0}")]
    Body(#[from] serde_json::Error),
    #[error("signed upload response did not contain a url")]
    MissingUploadUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate {input:?}, expected `lat,lng`")]
pub struct ParseLatLngError {
    input: String,
}

/// A geographic coordinate in degrees.
///
/// Blobs written by the map SDK carry its internal field names (`Ma` for
/// latitude, `La` for longitude), so those are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(alias = "Ma", alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "La", alias = "longitude")]
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for LatLng {
    type Err = ParseLatLngError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLatLngError {
            input: s.to_string(),
        };
        let (lat, lng) = s.split_once(',').ok_or_else(err)?;
        let lat: f64 = lat.trim().parse().map_err(|_| err())?;
        let lng: f64 = lng.trim().parse().map_err(|_| err())?;
        let coords = LatLng::new(lat, lng);
        if !coords.is_valid() {
            return Err(err());
        }
        Ok(coords)
    }
}

/// One visitor's drawn walk, as stored in blob storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub coords: Vec<LatLng>,
    pub starting: LatLng,
    pub destination: LatLng,
}

impl PathRecord {
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUploadRequest {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
}

impl SignedUploadRequest {
    pub fn for_record(record: &PathRecord) -> Self {
        Self {
            file_name: record.file_name(),
            file_type: PATH_CONTENT_TYPE.to_string(),
        }
    }
}

/// Gateway proxy wrapper: the real payload is JSON encoded inside `body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub body: String,
}

impl Envelope {
    pub fn into_body(self) -> Result<String, ProtocolError> {
        match self.status_code {
            Some(status) if !(200..300).contains(&status) => Err(ProtocolError::Upstream {
                status,
                body: self.body,
            }),
            _ => Ok(self.body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    Key(String),
    Record(PathRecord),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IndexResponse {
    Entries(Vec<IndexEntry>),
    Envelope(Envelope),
}

impl IndexResponse {
    pub fn into_entries(self) -> Result<Vec<IndexEntry>, ProtocolError> {
        match self {
            Self::Entries(entries) => Ok(entries),
            Self::Envelope(envelope) => {
                let body = envelope.into_body()?;
                Ok(serde_json::from_str(&body)?)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SignedUrlResponse {
    Url(String),
    Envelope(Envelope),
    Object {
        #[serde(alias = "signedRequest", alias = "signedUrl", alias = "uploadURL")]
        url: String,
    },
}

impl SignedUrlResponse {
    pub fn into_url(self) -> Result<String, ProtocolError> {
        match self {
            Self::Url(url) | Self::Object { url } => Ok(url),
            Self::Envelope(envelope) => {
                let body = envelope.into_body()?;
                let body = body.trim();
                match serde_json::from_str::<SignedUrlResponse>(body) {
                    Ok(Self::Url(url)) | Ok(Self::Object { url }) => Ok(url),
                    _ if body.starts_with("http") => Ok(body.to_string()),
                    _ => Err(ProtocolError::MissingUploadUrl),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_sdk_field_names() {
        let coords: LatLng = serde_json::from_str(r#"{"La":127.0324566,"Ma":37.4918782}"#).unwrap();
        assert_eq!(coords, LatLng::new(37.4918782, 127.0324566));

        let coords: LatLng = serde_json::from_str(r#"{"latitude":1.5,"longitude":2.5}"#).unwrap();
        assert_eq!(coords, LatLng::new(1.5, 2.5));
    }

    #[test]
    fn stored_coordinates_keep_every_bit() {
        let drawn = LatLng::new(37.4 + 0.001, 127.0324566 - 0.0007);
        let text = serde_json::to_string(&drawn).unwrap();
        let read: LatLng = serde_json::from_str(&text).unwrap();
        assert_eq!(read.lat.to_bits(), drawn.lat.to_bits());
        assert_eq!(read.lng.to_bits(), drawn.lng.to_bits());
    }

    #[test]
    fn parses_and_formats_lat_lng_pairs() {
        let coords: LatLng = " 37.5, 127.25 ".parse().unwrap();
        assert_eq!(coords, LatLng::new(37.5, 127.25));
        assert_eq!(coords.to_string(), "37.5,127.25");

        assert!("37.5".parse::<LatLng>().is_err());
        assert!("abc,127".parse::<LatLng>().is_err());
        assert!("95,127".parse::<LatLng>().is_err());
    }

    #[test]
    fn index_accepts_plain_keys_records_and_envelopes() {
        let plain: IndexResponse = serde_json::from_str(r#"["a.json","b.json"]"#).unwrap();
        assert_eq!(
            plain.into_entries().unwrap(),
            vec![
                IndexEntry::Key("a.json".into()),
                IndexEntry::Key("b.json".into())
            ]
        );

        let wrapped: IndexResponse =
            serde_json::from_str(r#"{"statusCode":200,"body":"[\"a.json\"]"}"#).unwrap();
        assert_eq!(
            wrapped.into_entries().unwrap(),
            vec![IndexEntry::Key("a.json".into())]
        );

        let records: IndexResponse = serde_json::from_str(
            r#"[{"id":"x","coords":[],"starting":{"lat":1,"lng":2},"destination":{"lat":3,"lng":4}}]"#,
        )
        .unwrap();
        match &records.into_entries().unwrap()[0] {
            IndexEntry::Record(record) => assert_eq!(record.id, "x"),
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn failed_envelope_reports_upstream_status() {
        let wrapped: IndexResponse =
            serde_json::from_str(r#"{"statusCode":500,"body":"boom"}"#).unwrap();
        match wrapped.into_entries() {
            Err(ProtocolError::Upstream { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn signed_url_unwraps_every_shape() {
        let direct: SignedUrlResponse = serde_json::from_str(r#""https://s3/put""#).unwrap();
        assert_eq!(direct.into_url().unwrap(), "https://s3/put");

        let object: SignedUrlResponse =
            serde_json::from_str(r#"{"signedRequest":"https://s3/obj"}"#).unwrap();
        assert_eq!(object.into_url().unwrap(), "https://s3/obj");

        let wrapped: SignedUrlResponse =
            serde_json::from_str(r#"{"statusCode":200,"body":"\"https://s3/env\""}"#).unwrap();
        assert_eq!(wrapped.into_url().unwrap(), "https://s3/env");

        let raw: SignedUrlResponse = serde_json::from_str(r#"{"body":"https://s3/raw"}"#).unwrap();
        assert_eq!(raw.into_url().unwrap(), "https://s3/raw");
    }

    #[test]
    fn upload_request_names_the_blob_after_the_path() {
        let record = PathRecord {
            id: "abc".into(),
            user: None,
            coords: vec![],
            starting: LatLng::new(0.0, 0.0),
            destination: LatLng::new(1.0, 1.0),
        };
        let request = SignedUploadRequest::for_record(&record);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fileName"], "abc.json");
        assert_eq!(json["fileType"], "application/json");
        assert!(serde_json::to_value(&record).unwrap().get("user").is_none());
    }
}
