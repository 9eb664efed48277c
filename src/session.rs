//! A route planning session.
//!
//! The session owns the candidate pool, the selection and the latest route
//! batch. Network operations are split into a `begin_*` half that hands out
//! a [`RequestToken`] and a `complete_*` half that applies the response, so
//! the round trip can happen outside the session. Completions carrying a
//! token that is no longer current are ignored.

use std::collections::{HashMap, HashSet};

use jiff::civil::Date;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{DateRangeError, SessionError, TransportError};
use crate::model::{DeliveryCandidate, OrderId, RouteId, RouteResult};
use crate::order_validator::screen_candidates;
use crate::resolver::{resolve_batch, ResolvedPath};
use crate::route_validator::screen_routes;
use crate::selection::SelectionSet;
use crate::traits::{DeliveryBackend, MapSurface, Marker, MarkerKind};

const WIRE_DATE_FORMAT: &str = "%Y/%m/%d";

/// Inclusive range of delivery dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: Date) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// `YYYY/MM/DD`, as the delivery service expects it.
    pub fn start_param(&self) -> String {
        self.start.strftime(WIRE_DATE_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.strftime(WIRE_DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    LoadingCandidates,
    CandidatesReady,
    GeneratingRoutes,
    RoutesReady,
    Error { message: String },
}

impl SessionState {
    fn is_loading(&self) -> bool {
        matches!(
            self,
            SessionState::LoadingCandidates | SessionState::GeneratingRoutes
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// What to submit to the routing service for one generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub token: RequestToken,
    pub selection: Vec<DeliveryCandidate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Non-fatal degradation observed by the latest operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanningReport {
    pub dropped_candidates: usize,
    pub dropped_routes: usize,
    pub unmapped_routes: Vec<RouteId>,
}

#[derive(Debug)]
pub struct PlanningSession {
    state: SessionState,
    candidates: Vec<DeliveryCandidate>,
    candidates_by_id: HashMap<OrderId, DeliveryCandidate>,
    selection: SelectionSet,
    routes: Vec<RouteResult>,
    paths: Vec<ResolvedPath>,
    report: PlanningReport,
    last_token: u64,
    candidates_token: Option<RequestToken>,
    routes_token: Option<RequestToken>,
}

impl Default for PlanningSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanningSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            candidates: Vec::new(),
            candidates_by_id: HashMap::new(),
            selection: SelectionSet::new(),
            routes: Vec::new(),
            paths: Vec::new(),
            report: PlanningReport::default(),
            last_token: 0,
            candidates_token: None,
            routes_token: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The user-visible message of the current error, if any.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[DeliveryCandidate] {
        &self.candidates
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn routes(&self) -> &[RouteResult] {
        &self.routes
    }

    pub fn paths(&self) -> &[ResolvedPath] {
        &self.paths
    }

    pub fn report(&self) -> &PlanningReport {
        &self.report
    }

    /// Starts a candidate fetch, superseding any fetch still in flight.
    ///
    /// The pool, selection and routes are cleared right away.
    pub fn begin_candidates(&mut self, range: DateRange) -> Result<RequestToken, SessionError> {
        if self.state == SessionState::GeneratingRoutes {
            return Err(self.busy());
        }

        let token = self.next_token();
        if let Some(previous) = self.candidates_token.replace(token) {
            debug!(?previous, ?token, "superseding in-flight candidate fetch");
        }
        debug!(start = %range.start_param(), end = %range.end_param(), "loading candidates");

        self.candidates.clear();
        self.candidates_by_id.clear();
        self.selection.clear();
        self.clear_route_state();
        self.report = PlanningReport::default();
        self.state = SessionState::LoadingCandidates;

        Ok(token)
    }

    pub fn complete_candidates(
        &mut self,
        token: RequestToken,
        result: Result<Vec<Value>, TransportError>,
    ) -> Completion {
        if self.candidates_token != Some(token) {
            debug!(?token, "ignoring stale candidate response");
            return Completion::Stale;
        }
        self.candidates_token = None;

        match result {
            Ok(batch) => {
                let screened = screen_candidates(batch);
                if screened.dropped > 0 {
                    warn!(
                        dropped = screened.dropped,
                        kept = screened.accepted.len(),
                        "dropped structurally invalid delivery candidates"
                    );
                }
                info!(candidates = screened.accepted.len(), "candidates ready");

                self.candidates_by_id = screened
                    .accepted
                    .iter()
                    .map(|candidate| (candidate.order_id().clone(), candidate.clone()))
                    .collect();
                self.candidates = screened.accepted;
                self.report.dropped_candidates = screened.dropped;
                self.selection.clear();
                self.clear_route_state();
                self.state = SessionState::CandidatesReady;
            }
            Err(err) => {
                warn!(error = %err, "candidate fetch failed");
                self.state = SessionState::Error {
                    message: err.to_string(),
                };
            }
        }

        Completion::Applied
    }

    /// Fetches candidates through `backend` and applies the response.
    pub fn request_candidates<B>(&mut self, backend: &B, range: DateRange) -> Result<(), SessionError>
    where
        B: DeliveryBackend + ?Sized,
    {
        let token = self.begin_candidates(range)?;
        let result = backend.fetch_candidates(&range);
        self.complete_candidates(token, result);
        Ok(())
    }

    /// Selects or deselects a candidate of the pool. Returns whether it is
    /// selected afterwards.
    pub fn toggle_selection(&mut self, order_id: &OrderId) -> Result<bool, SessionError> {
        if self.state.is_loading() {
            return Err(self.busy());
        }
        let candidate = self
            .candidates_by_id
            .get(order_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownCandidate(order_id.clone()))?;

        Ok(self.selection.toggle(candidate))
    }

    /// Starts route generation for the current selection.
    ///
    /// Returns `Ok(None)` without touching any state when nothing is
    /// selected.
    pub fn begin_route_generation(&mut self) -> Result<Option<RouteRequest>, SessionError> {
        if self.state.is_loading() {
            return Err(self.busy());
        }
        if self.selection.is_empty() {
            debug!("no candidates selected, skipping route generation");
            return Ok(None);
        }

        let token = self.next_token();
        self.routes_token = Some(token);
        self.clear_route_state();
        self.state = SessionState::GeneratingRoutes;
        debug!(orders = self.selection.len(), "generating routes");

        Ok(Some(RouteRequest {
            token,
            selection: self.selection.candidates().to_vec(),
        }))
    }

    /// Applies the routing service response. The selection is cleared
    /// whatever the outcome.
    pub fn complete_route_generation(
        &mut self,
        token: RequestToken,
        result: Result<Vec<Value>, TransportError>,
    ) -> Completion {
        if self.routes_token != Some(token) {
            debug!(?token, "ignoring stale route response");
            return Completion::Stale;
        }
        self.routes_token = None;
        self.selection.clear();

        let batch = match result {
            Ok(batch) if batch.is_empty() => {
                self.fail("the routing service returned no routes".to_string());
                return Completion::Applied;
            }
            Ok(batch) => batch,
            Err(err) => {
                self.fail(err.to_string());
                return Completion::Applied;
            }
        };

        let received = batch.len();
        let screened = screen_routes(batch);
        self.report.dropped_routes = screened.dropped;
        if screened.accepted.is_empty() {
            self.fail(format!(
                "none of the {received} routes returned by the routing service were usable"
            ));
            return Completion::Applied;
        }
        if screened.dropped > 0 {
            warn!(
                dropped = screened.dropped,
                kept = screened.accepted.len(),
                "dropped malformed route results"
            );
        }

        let resolved = resolve_batch(&screened.accepted, &self.candidates_by_id);
        if !resolved.unmapped.is_empty() {
            warn!(
                unmapped = ?resolved.unmapped,
                "routes generated but not all of them can be drawn"
            );
        }
        info!(
            routes = screened.accepted.len(),
            paths = resolved.paths.len(),
            "routes ready"
        );

        self.routes = screened.accepted;
        self.paths = resolved.paths;
        self.report.unmapped_routes = resolved.unmapped;
        self.state = SessionState::RoutesReady;

        Completion::Applied
    }

    /// Generates routes through `backend` and applies the response. Does
    /// nothing when the selection is empty.
    pub fn generate_routes<B>(&mut self, backend: &B) -> Result<(), SessionError>
    where
        B: DeliveryBackend + ?Sized,
    {
        let Some(request) = self.begin_route_generation()? else {
            return Ok(());
        };
        let result = backend.generate_routes(&request.selection);
        self.complete_route_generation(request.token, result);
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), SessionError> {
        if self.state.is_loading() {
            return Err(self.busy());
        }
        self.selection.clear();
        Ok(())
    }

    pub fn clear_routes(&mut self) -> Result<(), SessionError> {
        if self.state.is_loading() {
            return Err(self.busy());
        }
        self.clear_route_state();
        if self.state == SessionState::RoutesReady {
            self.state = SessionState::CandidatesReady;
        }
        Ok(())
    }

    /// Leaves the error state. Returns false when there was no error.
    pub fn dismiss_error(&mut self) -> bool {
        if !matches!(self.state, SessionState::Error { .. }) {
            return false;
        }
        self.state = if self.candidates.is_empty() {
            SessionState::Idle
        } else {
            SessionState::CandidatesReady
        };
        true
    }

    /// Vehicle, warehouse and client markers of the candidates covered by
    /// the current routes, or of the whole pool when there are no routes.
    pub fn markers(&self) -> Vec<Marker> {
        let covered: Vec<&DeliveryCandidate> = if self.routes.is_empty() {
            self.candidates.iter().collect()
        } else {
            let mut seen = HashSet::new();
            self.routes
                .iter()
                .flat_map(|route| &route.order_ids)
                .filter(|id| seen.insert(*id))
                .filter_map(|id| self.candidates_by_id.get(id))
                .collect()
        };

        let mut seen = HashSet::new();
        let mut markers = Vec::new();
        for candidate in covered {
            let vehicle = &candidate.assigned_vehicle;
            let client = &candidate.order.client;

            let mut push = |marker: Marker| {
                if seen.insert((marker.kind, marker.id.clone())) {
                    markers.push(marker);
                }
            };

            push(Marker {
                kind: MarkerKind::Vehicle,
                id: vehicle.id.to_string(),
                label: vehicle.plate.clone(),
                position: vehicle.current_location,
            });
            for warehouse in &candidate.order.origin_warehouses {
                push(Marker {
                    kind: MarkerKind::Warehouse,
                    id: warehouse.id.to_string(),
                    label: warehouse
                        .name
                        .clone()
                        .unwrap_or_else(|| warehouse.id.to_string()),
                    position: warehouse.location,
                });
            }
            push(Marker {
                kind: MarkerKind::Client,
                id: client.id.to_string(),
                label: client.name.clone(),
                position: client.location,
            });
        }
        markers
    }

    /// Hands the current paths and markers to the map.
    pub fn render<S>(&self, surface: &mut S)
    where
        S: MapSurface + ?Sized,
    {
        surface.render(&self.paths, &self.markers());
    }

    fn next_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }

    fn busy(&self) -> SessionError {
        SessionError::Busy {
            state: self.state.clone(),
        }
    }

    fn fail(&mut self, message: String) {
        warn!(error = %message, "route generation failed");
        self.state = SessionState::Error { message };
    }

    fn clear_route_state(&mut self) {
        self.routes.clear();
        self.paths.clear();
        self.report.dropped_routes = 0;
        self.report.unmapped_routes.clear();
    }
}
