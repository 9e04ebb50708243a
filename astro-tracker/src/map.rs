//! The single satellite marker and the camera looking at it.

use std::fmt;

/// Zoom used for the initial view and for the unknown-position view
pub const WORLD_ZOOM: u8 = 2;

/// Label shown when the selected satellite has no usable position
pub const UNKNOWN_POSITION_LABEL: &str = "Unknown position";

/// Popup title used when a position has no name
const DEFAULT_POPUP_TITLE: &str = "Satellite Position";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub const ORIGIN: LatLon = LatLon {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Rendering backend for the marker and camera.
///
/// Implementations only draw; all bookkeeping stays in [`MapProjector`].
pub trait MapSurface: Send {
    fn set_marker(&mut self, at: LatLon, popup: &str);
    fn pan_to(&mut self, center: LatLon);
    fn set_view(&mut self, center: LatLon, zoom: u8);
}

/// What the map currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub marker: LatLon,
    pub label: String,
    pub center: LatLon,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            marker: LatLon::ORIGIN,
            label: String::new(),
            center: LatLon::ORIGIN,
            zoom: WORLD_ZOOM,
        }
    }
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.label.is_empty() { "-" } else { self.label.as_str() };
        write!(
            f,
            "marker {} [{}], center {}, zoom {}",
            self.marker, label, self.center, self.zoom
        )
    }
}

/// Owns the marker and camera state.
///
/// Every operation is a no-op until a surface is attached.
#[derive(Default)]
pub struct MapProjector {
    surface: Option<Box<dyn MapSurface>>,
    view: MapView,
}

impl MapProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(surface: Box<dyn MapSurface>) -> Self {
        let mut projector = Self::new();
        projector.attach(surface);
        projector
    }

    /// Bind the surface and draw the initial world view on it.
    pub fn attach(&mut self, mut surface: Box<dyn MapSurface>) {
        surface.set_view(self.view.center, self.view.zoom);
        surface.set_marker(self.view.marker, &self.view.label);
        self.surface = Some(surface);
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Relocate the marker and refresh its popup; the camera stays put.
    pub fn move_marker(&mut self, latitude: f64, longitude: f64, label: Option<&str>) {
        let Some(surface) = self.surface.as_mut() else {
            tracing::warn!("move_marker: map surface not initialized");
            return;
        };

        let at = LatLon::new(latitude, longitude);
        let popup = popup_text(label, at);
        surface.set_marker(at, &popup);

        self.view.marker = at;
        self.view.label = label.unwrap_or(DEFAULT_POPUP_TITLE).to_string();
    }

    /// [`move_marker`](Self::move_marker), then pan to the marker at the
    /// current zoom.
    pub fn move_marker_and_recenter(&mut self, latitude: f64, longitude: f64, label: Option<&str>) {
        if !self.is_ready() {
            tracing::warn!("move_marker_and_recenter: map surface not initialized");
            return;
        }

        self.move_marker(latitude, longitude, label);

        let center = LatLon::new(latitude, longitude);
        if let Some(surface) = self.surface.as_mut() {
            surface.pan_to(center);
        }
        self.view.center = center;
    }

    /// Marker at the origin, camera back to the world view.
    pub fn reset_to_unknown(&mut self) {
        if !self.is_ready() {
            tracing::warn!("reset_to_unknown: map surface not initialized");
            return;
        }

        self.move_marker_and_recenter(0.0, 0.0, Some(UNKNOWN_POSITION_LABEL));

        if let Some(surface) = self.surface.as_mut() {
            surface.set_view(LatLon::ORIGIN, WORLD_ZOOM);
        }
        self.view.center = LatLon::ORIGIN;
        self.view.zoom = WORLD_ZOOM;
    }
}

fn popup_text(label: Option<&str>, at: LatLon) -> String {
    format!(
        "{}\nLat: {}\nLon: {}",
        label.unwrap_or(DEFAULT_POPUP_TITLE),
        at.latitude,
        at.longitude
    )
}

/// Surface that renders every draw call as a log line
#[derive(Debug, Default)]
pub struct LoggingMapSurface;

impl MapSurface for LoggingMapSurface {
    fn set_marker(&mut self, at: LatLon, popup: &str) {
        tracing::info!("Marker moved to {}: {}", at, popup.replace('\n', " | "));
    }

    fn pan_to(&mut self, center: LatLon) {
        tracing::info!("Map centered on {}", center);
    }

    fn set_view(&mut self, center: LatLon, zoom: u8) {
        tracing::info!("Map view reset to {} at zoom {}", center, zoom);
    }
}
