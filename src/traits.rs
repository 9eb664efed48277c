//! Seams to the collaborators of a planning session.
//!
//! The session never talks HTTP or draws anything itself: a backend fetches
//! candidates and asks for routes, a map surface renders the result.

use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;
use crate::model::{DeliveryCandidate, GeoPoint};
use crate::resolver::ResolvedPath;
use crate::session::DateRange;

/// The delivery service.
///
/// Both calls return the raw `result` batch; screening it is the
/// session's job.
pub trait DeliveryBackend {
    /// Orders pending delivery in the date range, with their vehicles.
    fn fetch_candidates(&self, range: &DateRange) -> Result<Vec<Value>, TransportError>;

    /// Optimized routes covering the given candidates.
    fn generate_routes(&self, selection: &[DeliveryCandidate]) -> Result<Vec<Value>, TransportError>;
}

/// Whatever draws paths and markers on a map.
pub trait MapSurface {
    fn render(&mut self, paths: &[ResolvedPath], markers: &[Marker]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Vehicle,
    Warehouse,
    Client,
}

/// A point of interest drawn next to the paths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub id: String,
    pub label: String,
    pub position: GeoPoint,
}
