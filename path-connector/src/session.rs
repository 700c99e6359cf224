//! Scripted walks: drive the path page on a headless map, the way a visitor
//! would in the browser, and render the result.

use std::collections::HashMap;
use std::path::Path;

use path_protocol::{LatLng, PathRecord};
use pathdraw::geo::Bounds;
use pathdraw::map::{HeadlessMap, MarkerIcon, Point, Projection, Size};
use pathdraw::overlay::SyncedOverlay;
use pathdraw::page::{DEFAULT_CENTER, INITIAL_LEVEL};
use pathdraw::path::DrawnPath;
use pathdraw::surface::{MoveOutcome, SvgCanvas, svg};
use pathdraw::{Notice, PathPage, Pin};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ConnectorError;
use crate::geocode::{Geocoder, StaticGeocoder};
use crate::local::LocalIds;
use crate::store::PathStore;

pub type HeadlessPage = PathPage<HeadlessMap, SvgCanvas>;

/// Target name that walks toward the destination pin.
pub const DESTINATION: &str = "destination";

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn default_steps() -> u32 {
    100
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalkScript {
    /// Address query or `lat,lng`.
    pub starting: String,
    pub destination: String,
    /// Known places, looked up before the geocoding service.
    #[serde(default)]
    pub places: HashMap<String, LatLng>,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_pixel_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

/// One pointer gesture on the drawing surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Stroke {
    /// Drag from the path's end toward `destination` or a `lat,lng` pair.
    Toward {
        toward: String,
        #[serde(default = "default_steps")]
        steps: u32,
    },
    /// Drag through container pixels.
    Points { points: Vec<[f64; 2]> },
    Undo { undo: u32 },
}

impl WalkScript {
    pub fn load(path: &Path) -> Result<Self, ConnectorError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConnectorError> {
        Ok(toml::from_str(text)?)
    }

    pub fn open_page(&self) -> HeadlessPage {
        let map = HeadlessMap::new(
            DEFAULT_CENTER,
            INITIAL_LEVEL,
            Size::new(self.width, self.height),
        );
        PathPage::new(map, SvgCanvas::default(), self.device_pixel_ratio)
    }

    /// Search and confirm both pins, then replay every stroke.
    pub async fn draw<G: Geocoder>(
        &self,
        page: &mut HeadlessPage,
        geocoder: &G,
    ) -> Result<(), ConnectorError> {
        let places = StaticGeocoder::new(self.places.clone());
        for (pin, query) in [
            (Pin::Starting, &self.starting),
            (Pin::Destination, &self.destination),
        ] {
            let found = match places.resolve(query) {
                Some(coords) => Some(coords),
                None => geocoder.lookup(query).await?,
            };
            page.geocode_result(found)?;
            if page.notice() == Some(Notice::NotFound(pin)) {
                return Err(ConnectorError::NotFound(query.clone()));
            }
            page.confirm()?;
        }
        page.confirm()?;
        info!(
            level = page.overlay().map().level(),
            "pins confirmed, drawing"
        );

        for stroke in &self.strokes {
            replay(page, stroke)?;
        }
        Ok(())
    }
}

fn replay(page: &mut HeadlessPage, stroke: &Stroke) -> Result<(), ConnectorError> {
    match stroke {
        Stroke::Undo { undo } => {
            for _ in 0..*undo {
                page.undo()?;
            }
        }
        Stroke::Points { points } => {
            page.pointer_down();
            for [x, y] in points {
                drag(page, Point::new(*x, *y));
            }
            page.pointer_up();
        }
        Stroke::Toward { toward, steps } => {
            let target = if toward == DESTINATION {
                page.destination()
                    .ok_or_else(|| ConnectorError::Script("no destination pin".into()))?
            } else {
                toward
                    .parse::<LatLng>()
                    .map_err(|err| ConnectorError::Script(format!("{err}")))?
            };
            let from = page
                .my_path()
                .map(DrawnPath::last)
                .ok_or_else(|| ConnectorError::Script("strokes need a drawing page".into()))?;
            if !page.pointer_down() {
                return Err(ConnectorError::Script(
                    "drawing surface is not accepting input".into(),
                ));
            }
            let steps = (*steps).max(1);
            for i in 1..=steps {
                let t = f64::from(i) / f64::from(steps);
                let coords = LatLng::new(
                    from.lat + (target.lat - from.lat) * t,
                    from.lng + (target.lng - from.lng) * t,
                );
                let at = page
                    .overlay()
                    .map()
                    .projection()
                    .container_point_from_coords(coords);
                drag(page, at);
            }
            page.pointer_up();
        }
    }
    Ok(())
}

/// A drag that hits the edge pans the map; keep the finger down afterwards.
fn drag(page: &mut HeadlessPage, at: Point) {
    if let MoveOutcome::Panned(center) = page.pointer_move(at) {
        debug!(%center, "panned while drawing");
        page.pointer_down();
    }
}

/// Load everyone's paths onto the page. A failure only raises a notice.
pub async fn refresh_others(page: &mut HeadlessPage, store: &PathStore) {
    match store.fetch_others().await {
        Ok(others) => page.set_others(others),
        Err(err) => {
            warn!(error = %err, "could not load others' paths");
            page.others_unavailable();
        }
    }
}

/// Upload the finished path, remember its id on this device and reload the
/// shared paths so the new one shows up among them.
pub async fn upload_walk(
    page: &mut HeadlessPage,
    store: &PathStore,
    ids: &LocalIds,
) -> Result<PathRecord, ConnectorError> {
    let record = page.arrive()?;
    if let Err(err) = store.upload(&record).await {
        page.upload_failed()?;
        return Err(err);
    }
    page.upload_succeeded()?;
    ids.record(&record.id)?;
    refresh_others(page, store).await;
    Ok(record)
}

/// The drawing surface with both pins on top.
pub fn page_svg(page: &HeadlessPage) -> String {
    let map = page.overlay().map();
    let projection = map.projection();
    let pins: Vec<String> = [Pin::Starting, Pin::Destination]
        .into_iter()
        .filter_map(|pin| page.marker(pin))
        .filter_map(|marker| Some((map.marker_position(marker)?, map.marker_icon(marker)?)))
        .map(|(position, icon)| {
            let at = projection.container_point_from_coords(position);
            svg::image(icon.asset(), MarkerIcon::origin(at), MarkerIcon::SIZE)
        })
        .collect();
    page.overlay().canvas().to_svg_with(&pins)
}

/// Draw `paths` on a map of `size`. Without a center the map frames them all.
pub fn render_paths(
    paths: Vec<PathRecord>,
    size: Size,
    center: Option<LatLng>,
    level: Option<u8>,
) -> String {
    let map = HeadlessMap::new(
        center.unwrap_or(DEFAULT_CENTER),
        level.unwrap_or(INITIAL_LEVEL),
        size,
    );
    let mut overlay = SyncedOverlay::new(map, SvgCanvas::default());
    overlay.attach(1.0);
    if center.is_none()
        && let Some(bounds) = Bounds::from_points(paths.iter().flat_map(|p| p.coords.iter().copied()))
    {
        overlay.frame(bounds);
    }
    if let Some(level) = level {
        overlay.set_level(level);
    }
    overlay.set_others(paths);
    overlay.canvas().to_svg()
}
