use path_protocol::PathRecord;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::geo::{Bounds, LatLng};
use crate::link;
use crate::map::{MapEvent, MapWidget, MarkerIcon, MarkerId, MarkerOptions, Point};
use crate::overlay::SyncedOverlay;
use crate::path::DrawnPath;
use crate::phase::{Phase, PhaseEvent, Pin};
use crate::surface::{Canvas, MoveOutcome};

/// Level the map zooms to when a pin is first shown.
pub const PIN_LEVEL: u8 = 4;
/// Level of the map before anything was searched.
pub const INITIAL_LEVEL: u8 = 9;
pub const DEFAULT_CENTER: LatLng = LatLng::new(37.4918782, 127.0324566);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The address lookup for this pin found nothing.
    NotFound(Pin),
    /// Others' paths could not be fetched; the page works without them.
    OthersUnavailable,
    /// The upload failed; finishing again retries it.
    UploadFailed,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PageError {
    #[error("{action} is not available in the {phase:?} phase")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("the {0:?} pin has not been placed")]
    MissingPin(Pin),
    #[error("the drawn path does not reach the destination yet")]
    NotArrived,
    #[error("path {0} is already being uploaded")]
    UploadInFlight(String),
    #[error("no upload is in flight")]
    NoUpload,
}

#[derive(Debug, Clone, PartialEq)]
enum Upload {
    Idle,
    InFlight(PathRecord),
    Failed(String),
    Done(PathRecord),
}

/// The path page: pins, phase and the map overlay.
///
/// Everything is driven by host events (searches resolved, clicks, pointer
/// and map gestures) and network outcomes reported back by the caller; the
/// page itself never performs IO.
pub struct PathPage<M: MapWidget, C: Canvas> {
    phase: Phase,
    overlay: SyncedOverlay<M, C>,
    starting: Option<LatLng>,
    destination: Option<LatLng>,
    destination_preset: bool,
    starting_marker: Option<MarkerId>,
    destination_marker: Option<MarkerId>,
    notice: Option<Notice>,
    upload: Upload,
}

impl<M: MapWidget, C: Canvas> PathPage<M, C> {
    pub fn new(map: M, canvas: C, device_pixel_ratio: f64) -> Self {
        let mut overlay = SyncedOverlay::new(map, canvas);
        if !overlay.attach(device_pixel_ratio) {
            warn!("drawing surface could not be attached to the map container");
        }
        Self {
            phase: Phase::default(),
            overlay,
            starting: None,
            destination: None,
            destination_preset: false,
            starting_marker: None,
            destination_marker: None,
            notice: None,
            upload: Upload::Idle,
        }
    }

    /// Open the page from its URL; a shared destination is preset.
    pub fn open(map: M, canvas: C, device_pixel_ratio: f64, href: &str) -> Self {
        let mut page = Self::new(map, canvas, device_pixel_ratio);
        if let Some(destination) = link::shared_destination(href) {
            page.preset_destination(destination);
        }
        page
    }

    pub fn preset_destination(&mut self, destination: LatLng) {
        info!(%destination, "destination preset by shared link");
        self.destination = Some(destination);
        self.destination_preset = true;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn starting(&self) -> Option<LatLng> {
        self.starting
    }

    pub fn destination(&self) -> Option<LatLng> {
        self.destination
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn overlay(&self) -> &SyncedOverlay<M, C> {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut SyncedOverlay<M, C> {
        &mut self.overlay
    }

    pub fn my_path(&self) -> Option<&DrawnPath> {
        self.overlay.my_path()
    }

    /// The path uploaded from this page, once the upload succeeded.
    pub fn uploaded(&self) -> Option<&PathRecord> {
        match &self.upload {
            Upload::Done(record) => Some(record),
            _ => None,
        }
    }

    pub fn marker(&self, pin: Pin) -> Option<MarkerId> {
        match pin {
            Pin::Starting => self.starting_marker,
            Pin::Destination => self.destination_marker,
        }
    }

    fn apply(&mut self, event: PhaseEvent) -> bool {
        let Some(next) = self.phase.transition(event) else {
            debug!(phase = ?self.phase, ?event, "event ignored in this phase");
            return false;
        };
        info!(from = ?self.phase, to = ?next, "phase changed");
        self.phase = next;
        true
    }

    fn wrong_phase(&self, action: &'static str) -> PageError {
        PageError::WrongPhase {
            action,
            phase: self.phase,
        }
    }

    // -----------------------------------------------------------------------
    // Pins
    // -----------------------------------------------------------------------

    /// Report the outcome of the address search for the current search box.
    pub fn geocode_result(&mut self, found: Option<LatLng>) -> Result<Phase, PageError> {
        let pin = self
            .phase
            .search_target()
            .ok_or_else(|| self.wrong_phase("address search"))?;

        let Some(coords) = found else {
            info!(?pin, "address not found");
            self.notice = Some(Notice::NotFound(pin));
            return Ok(self.phase);
        };

        self.notice = None;
        match pin {
            Pin::Starting => self.starting = Some(coords),
            Pin::Destination => self.destination = Some(coords),
        }
        self.show_pin(pin, coords, true);
        self.apply(PhaseEvent::GeocodeFound);
        Ok(self.phase)
    }

    fn show_pin(&mut self, pin: Pin, coords: LatLng, recenter: bool) {
        let (slot, icon) = match pin {
            Pin::Starting => (&mut self.starting_marker, MarkerIcon::Starting),
            Pin::Destination => (&mut self.destination_marker, MarkerIcon::Destination),
        };
        let map = self.overlay.map_mut();
        let first = match *slot {
            Some(marker) => {
                map.move_marker(marker, coords);
                false
            }
            None => {
                *slot = Some(map.place_marker(MarkerOptions {
                    position: coords,
                    draggable: true,
                    icon,
                }));
                true
            }
        };
        if recenter {
            if first {
                map.set_level(PIN_LEVEL);
            }
            map.set_center(coords);
        }
        self.overlay.sync();
    }

    /// The visitor focused a search box again to redo its lookup.
    pub fn focus_search(&mut self, pin: Pin) -> bool {
        if self.phase.confirm_target() != Some(pin) {
            return false;
        }
        self.apply(PhaseEvent::SearchFocused)
    }

    pub fn marker_drag_started(&mut self, marker: MarkerId) {
        self.overlay.map_mut().marker_drag_started(marker);
    }

    /// A pin was dropped. The coordinate follows the marker. The view only
    /// moves when both pins are on screen, to keep them framed.
    pub fn marker_drag_ended(&mut self, marker: MarkerId, position: LatLng) -> Option<Pin> {
        let pin = if Some(marker) == self.starting_marker {
            Pin::Starting
        } else if Some(marker) == self.destination_marker {
            Pin::Destination
        } else {
            return None;
        };

        if !self.phase.pins_editable() {
            // Put the marker back where the pin is.
            let current = match pin {
                Pin::Starting => self.starting,
                Pin::Destination => self.destination,
            }?;
            self.overlay.map_mut().marker_drag_ended(marker, current);
            self.overlay.map_mut().move_marker(marker, current);
            return None;
        }

        self.overlay.map_mut().marker_drag_ended(marker, position)?;
        debug!(?pin, %position, "pin moved");
        match pin {
            Pin::Starting => self.starting = Some(position),
            Pin::Destination => self.destination = Some(position),
        }
        if self.phase == Phase::ConfirmBoth {
            let _ = self.frame_pins();
        }
        Some(pin)
    }

    pub fn confirm(&mut self) -> Result<Phase, PageError> {
        match self.phase {
            Phase::ConfirmStarting => {
                self.starting.ok_or(PageError::MissingPin(Pin::Starting))?;
            }
            Phase::ConfirmDestination => {
                self.destination
                    .ok_or(PageError::MissingPin(Pin::Destination))?;
            }
            Phase::ConfirmBoth => {
                self.both_pins()?;
            }
            _ => return Err(self.wrong_phase("confirm")),
        }

        self.apply(PhaseEvent::Confirm {
            destination_preset: self.destination_preset && self.destination.is_some(),
        });

        match self.phase {
            Phase::ConfirmBoth => self.enter_confirm_both()?,
            Phase::Draw => self.enter_draw()?,
            _ => {}
        }
        Ok(self.phase)
    }

    fn both_pins(&self) -> Result<(LatLng, LatLng), PageError> {
        let starting = self.starting.ok_or(PageError::MissingPin(Pin::Starting))?;
        let destination = self
            .destination
            .ok_or(PageError::MissingPin(Pin::Destination))?;
        Ok((starting, destination))
    }

    fn frame_pins(&mut self) -> Result<(LatLng, LatLng), PageError> {
        let (starting, destination) = self.both_pins()?;
        if let Some(bounds) = Bounds::from_points([starting, destination]) {
            self.overlay.frame(bounds);
        }
        Ok((starting, destination))
    }

    fn enter_confirm_both(&mut self) -> Result<(), PageError> {
        if self.destination_marker.is_none()
            && let Some(destination) = self.destination
        {
            self.show_pin(Pin::Destination, destination, false);
        }
        self.frame_pins()?;
        Ok(())
    }

    fn enter_draw(&mut self) -> Result<(), PageError> {
        let (starting, destination) = self.frame_pins()?;
        self.overlay
            .start_drawing(DrawnPath::new(starting, destination));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    /// The path is frozen while its record is being uploaded.
    fn accepts_strokes(&self) -> bool {
        self.phase.captures_pointer() && !matches!(self.upload, Upload::InFlight(_))
    }

    pub fn pointer_down(&mut self) -> bool {
        self.accepts_strokes() && self.overlay.pointer_down()
    }

    pub fn pointer_move(&mut self, at: Point) -> MoveOutcome {
        if !self.accepts_strokes() {
            return MoveOutcome::Idle;
        }
        self.overlay.pointer_move(at)
    }

    /// Returns whether the "arrived" action is now available.
    pub fn pointer_up(&mut self) -> bool {
        if !self.phase.captures_pointer() {
            return false;
        }
        let arrived = self.overlay.pointer_up();
        if arrived {
            info!("path reached the destination");
        }
        self.can_finish()
    }

    pub fn undo(&mut self) -> Result<usize, PageError> {
        if self.phase != Phase::Draw {
            return Err(self.wrong_phase("undo"));
        }
        if let Upload::InFlight(record) = &self.upload {
            return Err(PageError::UploadInFlight(record.id.clone()));
        }
        Ok(self.overlay.undo())
    }

    pub fn can_finish(&self) -> bool {
        self.phase == Phase::Draw
            && !matches!(self.upload, Upload::InFlight(_))
            && self.my_path().is_some_and(DrawnPath::has_arrived)
    }

    /// The "arrived" action: hand out the finished path for upload.
    ///
    /// Hands out each path once; after a failed upload the same id is handed
    /// out again with the current points.
    pub fn arrive(&mut self) -> Result<PathRecord, PageError> {
        if self.phase != Phase::Draw {
            return Err(self.wrong_phase("arrive"));
        }
        let id = match &self.upload {
            Upload::InFlight(record) => return Err(PageError::UploadInFlight(record.id.clone())),
            Upload::Failed(id) => id.clone(),
            Upload::Idle | Upload::Done(_) => Uuid::new_v4().to_string(),
        };
        let path = self
            .my_path()
            .filter(|p| p.has_arrived())
            .ok_or(PageError::NotArrived)?;

        let record = path.to_record(id);
        self.overlay.pointer_up();
        info!(id = %record.id, points = record.coords.len(), "path finished");
        self.upload = Upload::InFlight(record.clone());
        Ok(record)
    }

    pub fn upload_succeeded(&mut self) -> Result<Phase, PageError> {
        let Upload::InFlight(record) = std::mem::replace(&mut self.upload, Upload::Idle) else {
            return Err(PageError::NoUpload);
        };
        self.notice = None;
        self.overlay.finish_drawing();
        self.apply(PhaseEvent::UploadSucceeded);
        self.upload = Upload::Done(record);
        Ok(self.phase)
    }

    pub fn upload_failed(&mut self) -> Result<(), PageError> {
        let Upload::InFlight(record) = std::mem::replace(&mut self.upload, Upload::Idle) else {
            return Err(PageError::NoUpload);
        };
        warn!(id = %record.id, "path upload failed");
        self.upload = Upload::Failed(record.id);
        self.notice = Some(Notice::UploadFailed);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Others' paths, sharing, revisiting
    // -----------------------------------------------------------------------

    pub fn set_others(&mut self, others: Vec<PathRecord>) {
        if self.notice == Some(Notice::OthersUnavailable) {
            self.notice = None;
        }
        debug!(count = others.len(), "showing others' paths");
        self.overlay.set_others(others);
    }

    pub fn others_unavailable(&mut self) {
        self.notice = Some(Notice::OthersUnavailable);
    }

    pub fn map_event(&mut self, event: MapEvent) {
        self.overlay.handle_map_event(event);
    }

    /// Link that lets someone else walk to the same destination.
    pub fn share_link(&self, href: &str) -> Option<String> {
        self.destination
            .map(|destination| link::share_url(href, destination))
    }

    pub fn view_path(&mut self, record: PathRecord) -> Result<(), PageError> {
        if !self.apply(PhaseEvent::ViewPath) {
            return Err(self.wrong_phase("view path"));
        }
        self.overlay.recenter(record.destination);
        self.overlay.set_highlight(Some(record));
        Ok(())
    }

    pub fn close_view(&mut self) -> Result<(), PageError> {
        if !self.apply(PhaseEvent::CloseView) {
            return Err(self.wrong_phase("close view"));
        }
        self.overlay.set_highlight(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::measure;
    use crate::map::{HeadlessMap, Projection, Size};
    use crate::path::ARRIVAL_THRESHOLD_M;
    use crate::surface::RecordingCanvas;

    const A: LatLng = LatLng::new(37.4918782, 127.0324566);
    const B: LatLng = LatLng::new(37.4979, 127.0276);

    fn page() -> PathPage<HeadlessMap, RecordingCanvas> {
        let map = HeadlessMap::new(DEFAULT_CENTER, INITIAL_LEVEL, Size::new(800.0, 600.0));
        PathPage::new(map, RecordingCanvas::default(), 1.0)
    }

    fn to_draw(page: &mut PathPage<HeadlessMap, RecordingCanvas>) {
        assert_eq!(page.geocode_result(Some(A)), Ok(Phase::ConfirmStarting));
        assert_eq!(page.confirm(), Ok(Phase::SearchDestination));
        assert_eq!(page.geocode_result(Some(B)), Ok(Phase::ConfirmDestination));
        assert_eq!(page.confirm(), Ok(Phase::ConfirmBoth));
        assert_eq!(page.confirm(), Ok(Phase::Draw));
    }

    /// Drag from the starting pin to the destination pin in 100 small steps.
    fn draw_to_destination(page: &mut PathPage<HeadlessMap, RecordingCanvas>) -> bool {
        let projection = page.overlay().map().projection();
        let from = projection.container_point_from_coords(A);
        let to = projection.container_point_from_coords(B);
        assert!(page.pointer_down());
        for i in 1..=100 {
            let t = f64::from(i) / 100.0;
            let at = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            assert!(!matches!(page.pointer_move(at), MoveOutcome::Panned(_)));
        }
        page.pointer_up()
    }

    #[test]
    fn walks_from_search_to_done() {
        let mut page = page();
        to_draw(&mut page);

        // Both pins are framed inside the container.
        let projection = page.overlay().map().projection();
        for coords in [A, B] {
            let p = projection.container_point_from_coords(coords);
            assert!((0.0..=800.0).contains(&p.x) && (0.0..=600.0).contains(&p.y));
        }

        assert!(!page.can_finish());
        assert!(draw_to_destination(&mut page));
        assert!(page.can_finish());

        let record = page.arrive().unwrap();
        assert_eq!(record.starting, A);
        assert_eq!(record.destination, B);
        assert_eq!(record.coords.len(), 21);
        assert_eq!(record.coords[0], A);
        assert!(measure(*record.coords.last().unwrap(), B) < ARRIVAL_THRESHOLD_M);

        // Handed out exactly once.
        assert_eq!(
            page.arrive(),
            Err(PageError::UploadInFlight(record.id.clone()))
        );
        assert!(!page.can_finish());

        assert_eq!(page.upload_succeeded(), Ok(Phase::Done));
        assert_eq!(page.uploaded(), Some(&record));
        assert!(!page.pointer_down());
    }

    #[test]
    fn failed_lookup_keeps_phase_and_shows_not_found() {
        let mut page = page();
        assert_eq!(page.geocode_result(None), Ok(Phase::SearchStarting));
        assert_eq!(page.notice(), Some(Notice::NotFound(Pin::Starting)));

        assert_eq!(page.geocode_result(Some(A)), Ok(Phase::ConfirmStarting));
        assert_eq!(page.notice(), None);
        assert_eq!(page.overlay().map().center(), A);
        assert_eq!(page.overlay().map().level(), PIN_LEVEL);
    }

    #[test]
    fn lookups_outside_search_phases_are_rejected() {
        let mut page = page();
        page.geocode_result(Some(A)).unwrap();
        assert!(matches!(
            page.geocode_result(Some(B)),
            Err(PageError::WrongPhase { .. })
        ));
    }

    #[test]
    fn refocusing_search_regresses_and_reuses_the_marker() {
        let mut page = page();
        page.geocode_result(Some(A)).unwrap();
        let marker = page.marker(Pin::Starting).unwrap();

        assert!(!page.focus_search(Pin::Destination));
        assert!(page.focus_search(Pin::Starting));
        assert_eq!(page.phase(), Phase::SearchStarting);

        let again = LatLng::new(37.5, 127.02);
        page.geocode_result(Some(again)).unwrap();
        assert_eq!(page.marker(Pin::Starting), Some(marker));
        assert_eq!(page.overlay().map().marker_position(marker), Some(again));
        assert_eq!(page.overlay().map().widget().markers().len(), 1);
    }

    #[test]
    fn dragging_a_pin_updates_it_without_recentering() {
        let mut page = page();
        page.geocode_result(Some(A)).unwrap();
        let marker = page.marker(Pin::Starting).unwrap();
        let center = page.overlay().map().center();

        page.marker_drag_started(marker);
        assert_eq!(
            page.overlay().map().marker_icon(marker),
            Some(MarkerIcon::StartingDrag)
        );
        let dropped = LatLng::new(37.493, 127.031);
        assert_eq!(page.marker_drag_ended(marker, dropped), Some(Pin::Starting));
        assert_eq!(page.starting(), Some(dropped));
        assert_eq!(page.overlay().map().center(), center);
        assert_eq!(page.phase(), Phase::ConfirmStarting);
    }

    #[test]
    fn dragging_a_pin_with_both_shown_reframes_them() {
        let mut page = page();
        page.geocode_result(Some(A)).unwrap();
        page.confirm().unwrap();
        page.geocode_result(Some(B)).unwrap();
        page.confirm().unwrap();
        assert_eq!(page.phase(), Phase::ConfirmBoth);

        let marker = page.marker(Pin::Destination).unwrap();
        let dropped = LatLng::new(37.52, 127.06);
        page.marker_drag_started(marker);
        assert_eq!(page.marker_drag_ended(marker, dropped), Some(Pin::Destination));
        assert_eq!(page.destination(), Some(dropped));

        let framed = Bounds::from_points([A, dropped]).unwrap().center();
        assert_eq!(page.overlay().map().center(), framed);
        let projection = page.overlay().map().projection();
        for coords in [A, dropped] {
            let p = projection.container_point_from_coords(coords);
            assert!((0.0..=800.0).contains(&p.x) && (0.0..=600.0).contains(&p.y));
        }
    }

    #[test]
    fn pins_are_locked_while_drawing() {
        let mut page = page();
        to_draw(&mut page);
        let marker = page.marker(Pin::Starting).unwrap();
        assert_eq!(page.marker_drag_ended(marker, B), None);
        assert_eq!(page.starting(), Some(A));
        assert_eq!(page.overlay().map().marker_position(marker), Some(A));
    }

    #[test]
    fn shared_destination_skips_the_destination_search() {
        let map = HeadlessMap::new(DEFAULT_CENTER, INITIAL_LEVEL, Size::new(800.0, 600.0));
        let href = format!("https://walk.example/path?dest={B}");
        let mut page = PathPage::open(map, RecordingCanvas::default(), 2.0, &href);
        assert_eq!(page.destination(), Some(B));

        page.geocode_result(Some(A)).unwrap();
        assert_eq!(page.confirm(), Ok(Phase::ConfirmBoth));
        assert!(page.marker(Pin::Destination).is_some());
        assert_eq!(page.confirm(), Ok(Phase::Draw));
    }

    #[test]
    fn finishing_before_arrival_is_refused() {
        let mut page = page();
        to_draw(&mut page);
        assert_eq!(page.arrive(), Err(PageError::NotArrived));
        assert!(matches!(page.undo(), Ok(0)));
    }

    #[test]
    fn failed_upload_stays_in_draw_and_retries_with_the_same_id() {
        let mut page = page();
        to_draw(&mut page);
        assert!(draw_to_destination(&mut page));

        let first = page.arrive().unwrap();
        page.upload_failed().unwrap();
        assert_eq!(page.phase(), Phase::Draw);
        assert_eq!(page.notice(), Some(Notice::UploadFailed));
        assert!(page.can_finish());

        let retry = page.arrive().unwrap();
        assert_eq!(retry.id, first.id);
        assert_eq!(page.upload_succeeded(), Ok(Phase::Done));
        assert_eq!(page.notice(), None);
        assert_eq!(page.upload_failed(), Err(PageError::NoUpload));
    }

    #[test]
    fn path_is_frozen_while_its_upload_is_in_flight() {
        let mut page = page();
        to_draw(&mut page);
        assert!(draw_to_destination(&mut page));
        let record = page.arrive().unwrap();

        assert!(!page.pointer_down());
        assert_eq!(page.pointer_move(Point::new(400.0, 300.0)), MoveOutcome::Idle);
        assert_eq!(
            page.undo(),
            Err(PageError::UploadInFlight(record.id.clone()))
        );
        assert_eq!(page.my_path().unwrap().coords(), record.coords.as_slice());

        page.upload_failed().unwrap();
        assert!(page.pointer_down());
        page.pointer_up();
        assert_eq!(page.undo(), Ok(8));
    }

    #[test]
    fn undo_while_drawing_trims_the_path() {
        let mut page = page();
        to_draw(&mut page);
        draw_to_destination(&mut page);
        assert_eq!(page.undo(), Ok(8));
        assert_eq!(page.my_path().unwrap().len(), 13);
        assert_eq!(page.undo(), Ok(8));
        assert_eq!(page.my_path().unwrap().len(), 5);
        assert!(!page.can_finish());
        assert_eq!(page.arrive(), Err(PageError::NotArrived));
    }

    #[test]
    fn done_page_can_revisit_a_path_and_share() {
        let mut page = page();
        to_draw(&mut page);
        draw_to_destination(&mut page);
        let record = page.arrive().unwrap();
        page.upload_succeeded().unwrap();

        assert_eq!(
            page.share_link("https://walk.example/path").as_deref(),
            Some("https://walk.example?dest=37.4979,127.0276")
        );

        page.view_path(record.clone()).unwrap();
        assert_eq!(page.phase(), Phase::ViewPath);
        assert_eq!(page.overlay().highlight(), Some(&record));
        assert!(!page.pointer_down());

        page.close_view().unwrap();
        assert_eq!(page.phase(), Phase::Done);
        assert!(page.close_view().is_err());
    }

    #[test]
    fn others_failure_is_a_recoverable_notice() {
        let mut page = page();
        page.others_unavailable();
        assert_eq!(page.notice(), Some(Notice::OthersUnavailable));
        page.set_others(vec![DrawnPath::new(A, B).to_record("x")]);
        assert_eq!(page.notice(), None);
        assert_eq!(page.overlay().others().len(), 1);
    }

    #[test]
    fn detached_map_never_draws() {
        let map = HeadlessMap::detached(DEFAULT_CENTER, INITIAL_LEVEL);
        let mut page = PathPage::new(map, RecordingCanvas::default(), 1.0);
        page.geocode_result(Some(A)).unwrap();
        page.confirm().unwrap();
        page.geocode_result(Some(B)).unwrap();
        page.confirm().unwrap();
        page.confirm().unwrap();
        assert_eq!(page.phase(), Phase::Draw);
        assert!(!page.pointer_down());
        assert!(page.overlay().canvas().ops().is_empty());
    }
}
