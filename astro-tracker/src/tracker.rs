//! Single-owner context driving the store, the map and the polling timer.
//!
//! Every mutation of tracker state happens inside [`Tracker::handle_event`].
//! Fetch batches run as detached tasks and report back through the same event
//! channel, so selection changes, toggles and batch completions never
//! interleave.

use astro_common::{NOT_AVAILABLE, SatelliteId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;

use crate::error::TrackerError;
use crate::fetcher::{PositionFetcher, SnapshotSource};
use crate::map::{MapProjector, MapView};
use crate::model::{Batch, InitialState, PositionRecord, UNKNOWN_SATELLITE_NAME};
use crate::scheduler::TrackingScheduler;
use crate::selection::SelectionController;
use crate::store::PositionStore;

#[derive(Debug)]
pub enum TrackerEvent {
    /// Flip tracking; replies with the new active flag
    Toggle {
        reply: oneshot::Sender<Result<bool, TrackerError>>,
    },
    Select {
        id: SatelliteId,
        reply: oneshot::Sender<Result<(), TrackerError>>,
    },
    /// Timer tick from the scheduler
    Tick,
    BatchCompleted(Batch),
    Status {
        reply: oneshot::Sender<TrackerStatus>,
    },
    Shutdown,
}

pub struct Tracker {
    ids: Vec<SatelliteId>,
    global_error: Option<String>,
    store: PositionStore,
    fetcher: Arc<PositionFetcher>,
    projector: MapProjector,
    selection: SelectionController,
    scheduler: TrackingScheduler,
    events_tx: UnboundedSender<TrackerEvent>,
    events_rx: UnboundedReceiver<TrackerEvent>,
    /// Sequence handed to the next dispatched batch
    next_sequence: u64,
}

impl Tracker {
    /// Build the context and bind the default satellite to the map.
    pub fn new(
        initial: InitialState,
        source: Arc<dyn SnapshotSource>,
        projector: MapProjector,
        period: Duration,
    ) -> Result<(Self, TrackerHandle), TrackerError> {
        let default_id = initial.default_selection().ok_or(TrackerError::NoSatellites)?;

        let (events_tx, events_rx) = unbounded_channel();
        let fetcher = Arc::new(PositionFetcher::from_initial(source, &initial));
        let store = PositionStore::from_initial(&initial);

        let mut tracker = Self {
            ids: initial.ids(),
            global_error: initial.global_error.clone(),
            store,
            fetcher,
            projector,
            selection: SelectionController::new(default_id),
            scheduler: TrackingScheduler::new(period, events_tx.clone()),
            events_tx: events_tx.clone(),
            events_rx,
            next_sequence: 1,
        };

        match &tracker.global_error {
            Some(error) => {
                tracing::error!("Tracker starting in global error state: {}", error);
                tracker.projector.reset_to_unknown();
            }
            None => {
                tracing::info!(
                    "Tracker ready with {} satellites, default selection ID {}",
                    tracker.ids.len(),
                    default_id
                );
                tracker.selection.reconcile(&tracker.store, &mut tracker.projector);
            }
        }

        Ok((tracker, TrackerHandle { events: events_tx }))
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn view(&self) -> &MapView {
        self.projector.view()
    }

    pub fn selected(&self) -> SatelliteId {
        self.selection.selected()
    }

    pub fn is_tracking(&self) -> bool {
        self.scheduler.is_active()
    }

    fn ensure_feed(&self) -> Result<(), TrackerError> {
        match &self.global_error {
            Some(error) => Err(TrackerError::FeedUnavailable(error.clone())),
            None => Ok(()),
        }
    }

    /// Paused -> Active issues one batch right away; Active -> Paused stops
    /// the timer. In-flight batches are never cancelled.
    pub fn toggle_tracking(&mut self) -> Result<bool, TrackerError> {
        self.ensure_feed()?;

        let active = self.scheduler.toggle();
        if active {
            self.dispatch_batch();
        }
        Ok(active)
    }

    pub fn select_satellite(&mut self, id: SatelliteId) -> Result<(), TrackerError> {
        self.ensure_feed()?;

        if !self.ids.contains(&id) {
            tracing::warn!("Selection of untracked satellite ID {} ignored", id);
            return Err(TrackerError::UnknownSatellite(id));
        }

        self.selection.select(id, &self.store, &mut self.projector);
        Ok(())
    }

    /// Spawn one `fetch_all` over every tracked id. Returns its sequence.
    pub fn dispatch_batch(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let fetcher = self.fetcher.clone();
        let ids = self.ids.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let batch = fetcher.fetch_all(&ids, sequence).await;
            if events.send(TrackerEvent::BatchCompleted(batch)).is_err() {
                tracing::debug!("Tracker gone before batch {} completed", sequence);
            }
        });

        sequence
    }

    /// Store every outcome, then update the map according to the tracking
    /// state at completion time.
    pub fn apply_batch(&mut self, batch: Batch) {
        let active = self.scheduler.is_active();

        for outcome in &batch.outcomes {
            let record = outcome.to_record(self.fetcher.known_name(outcome.id));
            let position = record.position().cloned();

            if !self.store.apply(outcome.id, record, batch.sequence) {
                continue;
            }

            if active && self.selection.is_selected(outcome.id) {
                if let Some(position) = position {
                    self.projector.move_marker_and_recenter(
                        position.latitude(),
                        position.longitude(),
                        Some(position.name()),
                    );
                }
            }
        }

        if !active {
            if let Some(PositionRecord::Valid(position)) = self.store.get(self.selection.selected()) {
                self.projector
                    .move_marker(position.latitude(), position.longitude(), Some(position.name()));
            }
        }
    }

    pub fn status(&self) -> TrackerStatus {
        let satellites = self
            .ids
            .iter()
            .map(|&id| {
                let stored = self.store.get(id);
                let name = stored
                    .and_then(|r| r.name())
                    .or_else(|| self.fetcher.known_name(id))
                    .unwrap_or(UNKNOWN_SATELLITE_NAME)
                    .to_string();
                // Per-id data is not trusted while the feed is down
                let record = match &self.global_error {
                    Some(_) => Some(PositionRecord::error(Some(name.clone()))),
                    None => stored.cloned(),
                };
                SatelliteStatus { id, name, record }
            })
            .collect();

        TrackerStatus {
            tracking: self.scheduler.is_active(),
            selected: self.selection.selected(),
            global_error: self.global_error.clone(),
            view: self.projector.view().clone(),
            satellites,
        }
    }

    /// Stop the timer if it is running.
    pub fn teardown(&mut self) {
        if self.scheduler.is_active() {
            self.scheduler.stop();
        }
        tracing::info!("Tracker shut down");
    }

    /// Returns `false` once the loop should end.
    pub fn handle_event(&mut self, event: TrackerEvent) -> bool {
        match event {
            TrackerEvent::Toggle { reply } => {
                let _ = reply.send(self.toggle_tracking());
            }
            TrackerEvent::Select { id, reply } => {
                let _ = reply.send(self.select_satellite(id));
            }
            TrackerEvent::Tick => {
                // A tick queued before a pause is dropped
                if self.scheduler.is_active() {
                    self.dispatch_batch();
                }
            }
            TrackerEvent::BatchCompleted(batch) => self.apply_batch(batch),
            TrackerEvent::Status { reply } => {
                let _ = reply.send(self.status());
            }
            TrackerEvent::Shutdown => return false,
        }
        true
    }

    /// Handle the next event. Returns `false` once the loop should end.
    pub async fn step(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.handle_event(event),
            None => false,
        }
    }

    pub async fn run(mut self) {
        while self.step().await {}
        self.teardown();
    }
}

/// Cloneable entry point for the surrounding UI
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    events: UnboundedSender<TrackerEvent>,
}

impl TrackerHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> TrackerEvent) -> Result<T, TrackerError> {
        let (reply, response) = oneshot::channel();
        self.events.send(build(reply)).map_err(|_| TrackerError::Stopped)?;
        response.await.map_err(|_| TrackerError::Stopped)
    }

    pub async fn toggle_tracking(&self) -> Result<bool, TrackerError> {
        self.request(|reply| TrackerEvent::Toggle { reply }).await?
    }

    pub async fn select_satellite(&self, id: SatelliteId) -> Result<(), TrackerError> {
        self.request(|reply| TrackerEvent::Select { id, reply }).await?
    }

    pub async fn status(&self) -> Result<TrackerStatus, TrackerError> {
        self.request(|reply| TrackerEvent::Status { reply }).await
    }

    pub fn shutdown(&self) {
        let _ = self.events.send(TrackerEvent::Shutdown);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteStatus {
    pub id: SatelliteId,
    pub name: String,
    pub record: Option<PositionRecord>,
}

impl fmt::Display for SatelliteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): ", self.name, self.id)?;
        match self.record.as_ref().and_then(PositionRecord::position) {
            Some(position) => {
                write!(f, "lat {:.4}, lon {:.4}, alt ", position.latitude(), position.longitude())?;
                match position.altitude() {
                    Some(altitude) => write!(f, "{:.2} km", altitude),
                    None => write!(f, "{}", NOT_AVAILABLE),
                }
            }
            None => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerStatus {
    pub tracking: bool,
    pub selected: SatelliteId,
    pub global_error: Option<String>,
    pub view: MapView,
    pub satellites: Vec<SatelliteStatus>,
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tracking: {}",
            if self.tracking { "active" } else { "paused" }
        )?;
        writeln!(f, "Selected: {}", self.selected)?;
        if let Some(error) = &self.global_error {
            writeln!(f, "Global error: {}", error)?;
        }
        writeln!(f, "Map: {}", self.view)?;
        for satellite in &self.satellites {
            writeln!(f, "  {}", satellite)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetcher::tests::{ScriptedSource, snapshot};
    use crate::map::tests::{MapCall, RecordingSurface};
    use crate::map::{LatLon, UNKNOWN_POSITION_LABEL, WORLD_ZOOM};
    use crate::model::{FetchOutcome, Position};
    use crate::scheduler::DEFAULT_TICK_PERIOD;
    use astro_common::{Coordinate, InitialSatellite};

    fn iss() -> SatelliteId {
        SatelliteId::new(25544).unwrap()
    }

    fn hubble() -> SatelliteId {
        SatelliteId::new(20580).unwrap()
    }

    fn satellite(id: SatelliteId, name: &str, position: Option<(f64, f64)>) -> InitialSatellite {
        match position {
            Some((latitude, longitude)) => InitialSatellite {
                id,
                name: name.to_string(),
                latitude: Coordinate::Number(latitude),
                longitude: Coordinate::Number(longitude),
                altitude: Coordinate::Number(420.0),
                timestamp: 1_700_000_000,
            },
            None => InitialSatellite::unavailable(id, name.to_string(), 1_700_000_000),
        }
    }

    fn both_valid() -> InitialState {
        InitialState::new(vec![
            satellite(iss(), "ISS", Some((51.6, -0.12))),
            satellite(hubble(), "Hubble", Some((28.5, -80.6))),
        ])
    }

    fn hubble_unknown() -> InitialState {
        InitialState::new(vec![
            satellite(iss(), "ISS", Some((51.6, -0.12))),
            satellite(hubble(), "Hubble", None),
        ])
    }

    fn tracker(initial: InitialState, source: Arc<ScriptedSource>) -> (Tracker, TrackerHandle, RecordingSurface) {
        let surface = RecordingSurface::default();
        let projector = MapProjector::with_surface(Box::new(surface.clone()));
        let (tracker, handle) = Tracker::new(initial, source, projector, DEFAULT_TICK_PERIOD).unwrap();
        (tracker, handle, surface)
    }

    fn pans(calls: &[MapCall]) -> usize {
        calls.iter().filter(|c| matches!(c, MapCall::PanTo(_))).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_recenters_on_default() {
        let (tracker, _handle, surface) = tracker(both_valid(), Arc::new(ScriptedSource::default()));

        let at = LatLon::new(51.6, -0.12);
        assert_eq!(tracker.selected(), iss());
        assert_eq!(surface.take().last(), Some(&MapCall::PanTo(at)));
        assert_eq!(tracker.view().marker, at);
        assert_eq!(tracker.view().label, "ISS");
        assert!(!tracker.is_tracking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_batch_recenters_on_selected_only() {
        let source = Arc::new(ScriptedSource::default());
        source.respond(iss(), Ok(snapshot(iss(), 10.0, 20.0)));
        let (mut tracker, _handle, surface) = tracker(both_valid(), source.clone());
        surface.take();

        assert_eq!(tracker.toggle_tracking(), Ok(true));
        assert!(tracker.step().await);

        match tracker.store().get(iss()) {
            Some(PositionRecord::Valid(position)) => {
                assert_eq!(position.latitude(), 10.0);
                assert_eq!(position.longitude(), 20.0);
            }
            other => panic!("unexpected ISS record: {:?}", other),
        }
        assert_eq!(
            tracker.store().get(hubble()),
            Some(&PositionRecord::error(Some("Hubble".to_string())))
        );

        let at = LatLon::new(10.0, 20.0);
        let calls = surface.take();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], MapCall::SetMarker(marker, _) if *marker == at));
        assert_eq!(calls[1], MapCall::PanTo(at));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_batch_while_paused_moves_marker_only() {
        let source = Arc::new(ScriptedSource::default());
        source.respond(iss(), Ok(snapshot(iss(), 5.0, 6.0)));
        let (mut tracker, _handle, surface) = tracker(both_valid(), source);

        assert_eq!(tracker.toggle_tracking(), Ok(true));
        assert_eq!(tracker.toggle_tracking(), Ok(false));
        surface.take();

        // The batch started by the first toggle lands after the pause
        assert!(tracker.step().await);

        let at = LatLon::new(5.0, 6.0);
        let calls = surface.take();
        assert_eq!(pans(&calls), 0);
        assert!(matches!(calls.last(), Some(MapCall::SetMarker(marker, _)) if *marker == at));
        assert_eq!(tracker.view().marker, at);
        assert_eq!(tracker.view().center, LatLon::new(51.6, -0.12));
        assert!(tracker.store().get(iss()).unwrap().is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_without_valid_record_shows_world() {
        let (mut tracker, _handle, surface) = tracker(hubble_unknown(), Arc::new(ScriptedSource::default()));
        surface.take();

        assert_eq!(tracker.select_satellite(hubble()), Ok(()));

        assert_eq!(surface.take().last(), Some(&MapCall::SetView(LatLon::ORIGIN, WORLD_ZOOM)));
        assert_eq!(tracker.view().zoom, WORLD_ZOOM);
        assert_eq!(tracker.view().label, UNKNOWN_POSITION_LABEL);
        assert_eq!(tracker.selected(), hubble());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_never_fetches() {
        let source = Arc::new(ScriptedSource::default());
        let (mut tracker, _handle, _surface) = tracker(both_valid(), source.clone());

        tracker.select_satellite(hubble()).unwrap();
        tracker.select_satellite(iss()).unwrap();
        tokio::task::yield_now().await;

        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_untracked_is_rejected() {
        let (mut tracker, _handle, _surface) = tracker(both_valid(), Arc::new(ScriptedSource::default()));
        let stranger = SatelliteId::new(43013).unwrap();

        assert_eq!(tracker.select_satellite(stranger), Err(TrackerError::UnknownSatellite(stranger)));
        assert_eq!(tracker.selected(), iss());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_batch_is_ignored() {
        let (mut tracker, _handle, surface) = tracker(both_valid(), Arc::new(ScriptedSource::default()));
        surface.take();

        let outcome = |latitude: f64| FetchOutcome {
            id: iss(),
            result: Ok(Position::new(latitude, 0.0, None, 0, "ISS").unwrap()),
        };
        tracker.apply_batch(Batch { sequence: 2, outcomes: vec![outcome(2.0)] });
        surface.take();
        tracker.apply_batch(Batch { sequence: 1, outcomes: vec![outcome(1.0)] });

        let latitude = tracker.store().get(iss()).and_then(|r| r.position()).map(|p| p.latitude());
        assert_eq!(latitude, Some(2.0));
        // Paused rule re-draws the stored record, never the stale one
        assert_eq!(tracker.view().marker, LatLon::new(2.0, 0.0));
        assert_eq!(pans(&surface.take()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_coordinates_become_error() {
        let (mut tracker, _handle, _surface) = tracker(both_valid(), Arc::new(ScriptedSource::default()));

        tracker.apply_batch(Batch {
            sequence: 1,
            outcomes: vec![FetchOutcome {
                id: hubble(),
                result: Err(FetchError::InvalidCoordinates {
                    name: "HST".to_string(),
                    latitude: "N/A".to_string(),
                    longitude: "N/A".to_string(),
                }),
            }],
        });

        assert_eq!(tracker.store().get(hubble()), Some(&PositionRecord::error(Some("HST".to_string()))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_dispatch_batches_while_active() {
        let source = Arc::new(ScriptedSource::default());
        source.respond(iss(), Ok(snapshot(iss(), 10.0, 20.0)));
        source.respond(hubble(), Ok(snapshot(hubble(), 1.0, 2.0)));
        let (mut tracker, _handle, _surface) = tracker(both_valid(), source.clone());

        tracker.toggle_tracking().unwrap();
        // immediate batch, then tick, then the tick's batch
        for _ in 0..3 {
            assert!(tracker.step().await);
        }
        assert_eq!(source.call_count(), 4);

        tracker.toggle_tracking().unwrap();
        tracker.handle_event(TrackerEvent::Tick);
        tokio::task::yield_now().await;
        assert_eq!(source.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_error_refuses_commands() {
        let mut initial = both_valid();
        initial.global_error = Some("N2YO API key is missing on the server".to_string());
        let (mut tracker, _handle, _surface) = tracker(initial, Arc::new(ScriptedSource::default()));

        assert!(matches!(tracker.toggle_tracking(), Err(TrackerError::FeedUnavailable(_))));
        assert!(matches!(tracker.select_satellite(hubble()), Err(TrackerError::FeedUnavailable(_))));
        assert!(!tracker.is_tracking());
        assert_eq!(tracker.view().label, UNKNOWN_POSITION_LABEL);
        assert!(tracker.status().global_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_error_status_hides_injected_positions() {
        let mut initial = both_valid();
        initial.global_error = Some("N2YO API key is missing on the server".to_string());
        let (tracker, _handle, _surface) = tracker(initial, Arc::new(ScriptedSource::default()));

        let status = tracker.status();

        assert!(status.satellites.iter().all(|s| s.record.as_ref().is_some_and(|r| !r.is_valid())));
        assert_eq!(status.satellites[0].to_string(), "ISS (25544): Error");
        assert!(status.to_string().contains("Global error: N2YO API key is missing"));
    }

    #[test]
    fn test_empty_initial_state_is_rejected() {
        let result = Tracker::new(
            InitialState::new(Vec::new()),
            Arc::new(ScriptedSource::default()),
            MapProjector::new(),
            DEFAULT_TICK_PERIOD,
        );
        assert!(matches!(result, Err(TrackerError::NoSatellites)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_drives_running_loop() {
        let source = Arc::new(ScriptedSource::default());
        source.respond(iss(), Ok(snapshot(iss(), 10.0, 20.0)));
        let (tracker, handle, _surface) = tracker(hubble_unknown(), source);
        let task = tokio::spawn(tracker.run());

        assert_eq!(handle.toggle_tracking().await, Ok(true));
        assert_eq!(handle.toggle_tracking().await, Ok(false));
        assert_eq!(handle.select_satellite(hubble()).await, Ok(()));

        let status = handle.status().await.unwrap();
        assert!(!status.tracking);
        assert_eq!(status.selected, hubble());
        assert_eq!(status.satellites.len(), 2);
        assert_eq!(status.satellites[1].name, "Hubble");
        assert!(status.to_string().contains("Hubble (20580): Error"));

        handle.shutdown();
        task.await.unwrap();
        assert_eq!(handle.status().await, Err(TrackerError::Stopped));
    }

    #[test]
    fn test_satellite_status_display() {
        let valid = SatelliteStatus {
            id: iss(),
            name: "ISS".to_string(),
            record: Some(PositionRecord::Valid(Position::new(10.0, 20.0, Some(420.5), 0, "ISS").unwrap())),
        };
        assert_eq!(valid.to_string(), "ISS (25544): lat 10.0000, lon 20.0000, alt 420.50 km");

        let missing = SatelliteStatus {
            id: hubble(),
            name: "Hubble".to_string(),
            record: None,
        };
        assert_eq!(missing.to_string(), "Hubble (20580): Error");
    }
}
