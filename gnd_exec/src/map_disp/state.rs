//! Implementations for the MapDisp state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Duration, Utc};
use log::{debug, trace, warn};
use nalgebra::{Point2, Vector2};
use serde::Serialize;

// Internal
use super::*;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
    time::{seconds_to_duration, IntervalTimer},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Map display module state
#[derive(Default)]
pub struct MapDisp {
    pub(crate) params: Params,

    retention: Duration,
    prune_timer: Option<IntervalTimer>,

    position: PositionState,
    trail: Trail,

    rotation_angle_deg: f64,
    compass_angle_deg: f64,

    /// Centre the view is at, or moving towards if a pan is running. In world pixels at the
    /// display zoom.
    view_centre_px: Option<Point2<f64>>,
    pan: Option<PanAnimation>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Input data to the map display.
#[derive(Debug, Clone)]
pub struct InputData {
    /// Rover positions received this cycle as `[lat, lon]` in degrees, in arrival order.
    /// Repeated positions are still updates.
    pub rover_positions: Vec<[f64; 2]>,

    /// Time of this cycle
    pub now: DateTime<Utc>,
}

/// Status report for MapDisp processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Number of positions received this cycle and appended to the trail
    pub num_appended: usize,

    /// Number of positions received this cycle and rejected
    pub num_rejected: usize,

    /// True if the prune timer fired this cycle
    pub prune_fired: bool,

    /// Number of trail points pruned this cycle
    pub num_pruned: usize,

    pub trail_len: usize,

    /// True if the heading was recomputed this cycle
    pub heading_updated: bool,

    pub panning: bool,
}

/// Flat archive record, one per frame.
#[derive(Serialize)]
struct ArchRecord {
    time_s: f64,
    lat_deg: Option<f64>,
    lon_deg: Option<f64>,
    num_appended: usize,
    num_rejected: usize,
    num_pruned: usize,
    trail_len: usize,
    rotation_angle_deg: f64,
    compass_angle_deg: f64,
    panning: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What is known about the rover's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    NoData,
    Invalid(PositionError),
    Valid(LatLon),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PositionState {
    fn default() -> Self {
        PositionState::NoData
    }
}

impl State for MapDisp {
    const NAME: &'static str = "MapDisp";

    type InitData = &'static str;
    type InitError = MapDispError;

    type InputData = InputData;
    type OutputData = MapView;
    type StatusReport = StatusReport;
    type ProcError = MapDispError;

    /// Initialise the MapDisp module.
    ///
    /// Expected init data is the path to the parameter file. The prune timer starts now.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(MapDispError::ParamLoadError)?;

        *self = Self::new(params, Utc::now())?;

        self.arch_report = Archiver::from_path(session, "map_disp/status_report.csv")
            .map_err(MapDispError::ArchiveError)?;

        Ok(())
    }

    /// Apply this cycle's transitions and build the view.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let now = input_data.now;

        // Polled up front, the result is applied after the append
        let prune_fired = self
            .prune_timer
            .as_mut()
            .ok_or(MapDispError::NotInitialised)?
            .poll(now);

        self.report = StatusReport::default();

        let mut trail_changed = false;
        let mut new_position = None;

        // ---- TRAIL APPEND ----

        for pair in input_data.rover_positions.iter() {
            match LatLon::from_pair(*pair) {
                Ok(pos) => {
                    self.trail.push(pos, now);
                    trail_changed = true;
                    new_position = Some(pos);
                    self.position = PositionState::Valid(pos);
                    self.report.num_appended += 1;
                }
                Err(e) => {
                    warn!("Rejected rover position: {}", e);
                    self.position = PositionState::Invalid(e);
                    self.report.num_rejected += 1;

                    // The map is dropped, and recreated on the next valid position
                    new_position = None;
                    self.view_centre_px = None;
                    self.pan = None;
                }
            }
        }

        // ---- TRAIL PRUNING ----

        if prune_fired {
            self.report.prune_fired = true;
            self.report.num_pruned = self.trail.prune(now, self.retention);
            trail_changed = true;

            if self.report.num_pruned > 0 {
                debug!(
                    "Pruned {} trail points, {} remain",
                    self.report.num_pruned,
                    self.trail.len()
                );
            }
        }

        // ---- HEADING ----

        if trail_changed {
            if let Some(heading) = self.trail.heading_deg() {
                self.rotation_angle_deg = heading;
                self.compass_angle_deg = heading;
                self.report.heading_updated = true;

                trace!("Rover heading {:.1} deg", heading);
            }
        }

        // ---- RECENTRE ----

        if let Some(pos) = new_position {
            let target = self.project(pos);

            match self.centre_at(now) {
                // A new map starts centred on the rover
                None => self.pan = None,
                Some(current) => {
                    self.pan = Some(PanAnimation::new(
                        current,
                        target,
                        now,
                        self.params.pan.duration_s,
                        self.params.pan.ease_linearity,
                    ))
                }
            }

            self.view_centre_px = Some(target);
        }

        if let Some(true) = self.pan.map(|p| p.is_finished(now)) {
            self.pan = None;
        }

        self.report.trail_len = self.trail.len();
        self.report.panning = self.pan.is_some();

        Ok((self.view(now), self.report))
    }

    /// Cancel the prune timer. The trail is left as it is.
    fn teardown(&mut self) {
        if let Some(ref mut t) = self.prune_timer {
            t.cancel();
            debug!("MapDisp prune timer cancelled");
        }
    }
}

impl Archived for MapDisp {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let pos = match self.position {
            PositionState::Valid(p) => Some(p),
            _ => None,
        };

        self.arch_report.serialise(ArchRecord {
            time_s: session::get_elapsed_seconds(),
            lat_deg: pos.map(|p| p.lat_deg),
            lon_deg: pos.map(|p| p.lon_deg),
            num_appended: self.report.num_appended,
            num_rejected: self.report.num_rejected,
            num_pruned: self.report.num_pruned,
            trail_len: self.report.trail_len,
            rotation_angle_deg: self.rotation_angle_deg,
            compass_angle_deg: self.compass_angle_deg,
            panning: self.report.panning,
        })
    }
}

impl MapDisp {
    /// Create a new display from parameters, with the prune timer started at `now`.
    pub fn new(params: Params, now: DateTime<Utc>) -> Result<Self, MapDispError> {
        params.validate()?;

        let prune_period = seconds_to_duration(params.prune_period_s);
        if prune_period <= Duration::zero() {
            return Err(MapDispError::InvalidParam(
                "prune_period_s",
                format!("{} s is below the timer resolution", params.prune_period_s),
            ));
        }

        Ok(Self {
            retention: seconds_to_duration(params.trail_retention_s),
            prune_timer: Some(IntervalTimer::start(prune_period, now)),
            params,
            ..Default::default()
        })
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn position(&self) -> PositionState {
        self.position
    }

    pub fn rotation_angle_deg(&self) -> f64 {
        self.rotation_angle_deg
    }

    pub fn compass_angle_deg(&self) -> f64 {
        self.compass_angle_deg
    }

    pub fn is_prune_timer_active(&self) -> bool {
        self.prune_timer
            .as_ref()
            .map(|t| t.is_active())
            .unwrap_or(false)
    }

    /// Build the view at `now` from the current state.
    pub fn view(&self, now: DateTime<Utc>) -> MapView {
        let content = match (self.position, self.centre_at(now)) {
            (PositionState::Valid(pos), Some(centre_px)) => {
                MapContent::Live(self.live_map(pos, centre_px))
            }
            (PositionState::Invalid(_), _) => MapContent::Degraded {
                message: INVALID_DATA_MESSAGE,
            },
            _ => MapContent::NoData {
                message: NO_DATA_MESSAGE,
            },
        };

        MapView::new(&self.params, content)
    }

    fn live_map(&self, pos: LatLon, centre_px: Point2<f64>) -> LiveMap {
        let container = Vector2::new(
            self.params.style.diameter_px as f64,
            self.params.container_height_px as f64,
        );

        let to_screen = |p: LatLon| {
            let s = self.project(p) - centre_px + container / 2.0;
            [s.x, s.y]
        };

        let layer = &self.params.tile_layer;
        let marker = &self.params.marker;
        let polyline = &self.params.polyline;

        let rover_px = to_screen(pos);
        let points: Vec<LatLon> = self.trail.points().iter().map(|p| p.position).collect();

        LiveMap {
            centre: unproject(centre_px, self.params.zoom, layer.tile_size_px),
            zoom: self.params.zoom,
            panning: self.pan.is_some(),
            tiles: tiles_covering(centre_px, self.params.zoom, container, layer),
            attribution: layer.attribution.clone(),
            trail: Polyline {
                screen_px: points.iter().map(|p| to_screen(*p)).collect(),
                points,
                colour: polyline.colour,
                weight_px: polyline.weight_px,
                opacity: polyline.opacity,
            },
            marker: Marker {
                position: pos,
                screen_px: [
                    rover_px[0] - marker.icon_anchor_px[0] as f64,
                    rover_px[1] - marker.icon_anchor_px[1] as f64,
                ],
                icon_url: marker.icon_url.clone(),
                icon_size_px: marker.icon_size_px,
                rotation_deg: self.rotation_angle_deg,
            },
            compass_angle_deg: self.compass_angle_deg,
            interaction: self.params.interaction,
        }
    }

    /// Centre of the view at `now`, following the pan if one is running.
    fn centre_at(&self, now: DateTime<Utc>) -> Option<Point2<f64>> {
        match self.pan {
            Some(ref p) => Some(p.position_at(now)),
            None => self.view_centre_px,
        }
    }

    fn project(&self, pos: LatLon) -> Point2<f64> {
        project(pos, self.params.zoom, self.params.tile_layer.tile_size_px)
    }
}
