//! Turns route results into drawable paths.
//!
//! Each route goes through the road geometry tiers in order (legs, steps,
//! the route-level polyline) and every tier contributes whatever it can
//! decode. Only when none of them produced a path is the straight-line
//! fallback built from the order's locations.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::haversine::path_length_meters;
use crate::model::{DeliveryCandidate, GeoPoint, OrderId, RouteId, RouteResult, VehicleId};
use crate::polyline::Polyline;

/// Route-level polylines this short are placeholders, not geometry.
const ROUTE_POLYLINE_MIN_LEN: usize = 10;

/// Where a resolved path's geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTier {
    Leg,
    Step,
    RoutePolyline,
    FallbackDirect,
}

impl SourceTier {
    pub fn render_weight(self) -> u32 {
        match self {
            SourceTier::Leg | SourceTier::RoutePolyline => 4,
            SourceTier::Step | SourceTier::FallbackDirect => 3,
        }
    }

    pub fn render_opacity(self) -> f64 {
        match self {
            SourceTier::Leg => 0.8,
            SourceTier::Step => 0.6,
            SourceTier::RoutePolyline => 0.9,
            SourceTier::FallbackDirect => 0.5,
        }
    }

    /// Straight segments should be drawn along great circles, not as roads.
    pub fn geodesic(self) -> bool {
        self == SourceTier::FallbackDirect
    }
}

/// A decoded point sequence plus rendering hints for the map surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPath {
    pub route_id: RouteId,
    pub vehicle_id: VehicleId,
    pub points: Vec<GeoPoint>,
    pub source_tier: SourceTier,
    pub render_weight: u32,
    pub render_opacity: f64,
    pub geodesic: bool,
    pub length_meters: f64,
}

impl ResolvedPath {
    fn new(route: &RouteResult, points: Vec<GeoPoint>, source_tier: SourceTier) -> Self {
        Self {
            route_id: route.id.clone(),
            vehicle_id: route.vehicle_id.clone(),
            length_meters: path_length_meters(&points),
            points,
            source_tier,
            render_weight: source_tier.render_weight(),
            render_opacity: source_tier.render_opacity(),
            geodesic: source_tier.geodesic(),
        }
    }
}

/// Paths for a whole batch, and the routes nothing could be drawn for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedBatch {
    pub paths: Vec<ResolvedPath>,
    pub unmapped: Vec<RouteId>,
}

type RoadTier = fn(&RouteResult) -> Vec<ResolvedPath>;

const ROAD_TIERS: [RoadTier; 3] = [leg_paths, step_paths, route_polyline_paths];

/// Resolves every drawable path of one route.
pub fn resolve(
    route: &RouteResult,
    candidates: &HashMap<OrderId, DeliveryCandidate>,
) -> Vec<ResolvedPath> {
    let paths = ROAD_TIERS
        .iter()
        .flat_map(|tier| tier(route))
        .collect::<Vec<_>>();

    if paths.is_empty() {
        fallback_paths(route, candidates)
    } else {
        paths
    }
}

/// Resolves a batch of routes in parallel, keeping route order.
pub fn resolve_batch(
    routes: &[RouteResult],
    candidates: &HashMap<OrderId, DeliveryCandidate>,
) -> ResolvedBatch {
    let per_route = routes
        .par_iter()
        .map(|route| (route.id.clone(), resolve(route, candidates)))
        .collect::<Vec<_>>();

    let mut batch = ResolvedBatch::default();
    for (route_id, paths) in per_route {
        if paths.is_empty() {
            batch.unmapped.push(route_id);
        }
        batch.paths.extend(paths);
    }
    batch
}

fn leg_paths(route: &RouteResult) -> Vec<ResolvedPath> {
    route
        .legs
        .iter()
        .filter_map(|leg| decoded(leg.encoded_polyline.as_deref()))
        .map(|points| ResolvedPath::new(route, points, SourceTier::Leg))
        .collect()
}

fn step_paths(route: &RouteResult) -> Vec<ResolvedPath> {
    route
        .legs
        .iter()
        .flat_map(|leg| &leg.steps)
        .filter_map(|step| decoded(step.encoded_polyline.as_deref()))
        .map(|points| ResolvedPath::new(route, points, SourceTier::Step))
        .collect()
}

fn route_polyline_paths(route: &RouteResult) -> Vec<ResolvedPath> {
    route
        .encoded_polyline
        .as_deref()
        .filter(|encoded| encoded.len() > ROUTE_POLYLINE_MIN_LEN)
        .and_then(|encoded| decoded(Some(encoded)))
        .map(|points| ResolvedPath::new(route, points, SourceTier::RoutePolyline))
        .into_iter()
        .collect()
}

/// Vehicle, first origin warehouse and client of the first order of the
/// route that is in `candidates`.
fn fallback_paths(
    route: &RouteResult,
    candidates: &HashMap<OrderId, DeliveryCandidate>,
) -> Vec<ResolvedPath> {
    let Some(candidate) = route.order_ids.iter().find_map(|id| candidates.get(id)) else {
        return Vec::new();
    };

    let points = [
        Some(candidate.assigned_vehicle.current_location),
        candidate.order.first_warehouse().map(|w| w.location),
        Some(candidate.order.client.location),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    if points.len() < 2 {
        return Vec::new();
    }
    vec![ResolvedPath::new(route, points, SourceTier::FallbackDirect)]
}

/// Decoded points when there are enough to draw a line.
fn decoded(encoded: Option<&str>) -> Option<Vec<GeoPoint>> {
    let polyline = Polyline::from_encoded(encoded);
    (polyline.len() >= 2).then(|| polyline.into_points())
}
