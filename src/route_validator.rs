//! Structural screening of routing service results.
//!
//! The routing service is loose about shapes: polylines come as strings or
//! `{ points }` objects, quantities as numbers or `{ value }` objects, and
//! field names differ between its endpoints. Only `vehicleId` and a usable
//! `orderIds` array are mandatory; everything else degrades to defaults.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::{OrderId, RouteId, RouteLeg, RouteLegStep, RouteResult, Screened, VehicleId};
use crate::wire::{encoded_polyline, field, id_from_value, location, quantity};

const POLYLINE_KEYS: &[&str] = &["encodedPolyline", "polyline", "overviewPolyline"];

/// Why a route result was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteDefect {
    #[error("route result is not an object")]
    NotAnObject,
    #[error("route result has no vehicle id")]
    MissingVehicleId,
    #[error("route result has no order id array")]
    MissingOrderIds,
    #[error("route result order id array has no usable ids")]
    EmptyOrderIds,
}

/// Maps one raw route result into a [`RouteResult`].
///
/// `position` is the result's index among the routes accepted so far and
/// names the route when the payload carries no id of its own.
pub fn parse_route(raw: &Value, position: usize) -> Result<RouteResult, RouteDefect> {
    if !raw.is_object() {
        return Err(RouteDefect::NotAnObject);
    }

    let vehicle_id = field(raw, &["vehicleId"])
        .and_then(id_from_value)
        .ok_or(RouteDefect::MissingVehicleId)?;

    let order_ids = match field(raw, &["orderIds"]) {
        Some(Value::Array(ids)) => ids
            .iter()
            .filter_map(id_from_value)
            .map(OrderId::new)
            .collect::<Vec<_>>(),
        _ => return Err(RouteDefect::MissingOrderIds),
    };
    if order_ids.is_empty() {
        return Err(RouteDefect::EmptyOrderIds);
    }

    let id = field(raw, &["id", "routeId"])
        .and_then(id_from_value)
        .unwrap_or_else(|| format!("route-{position}"));

    let legs = match field(raw, &["legs"]) {
        Some(Value::Array(legs)) => legs.iter().filter_map(parse_leg).collect(),
        _ => Vec::new(),
    };

    Ok(RouteResult {
        id: RouteId::new(id),
        vehicle_id: VehicleId::new(vehicle_id),
        order_ids,
        total_distance_meters: number(raw, &["totalDistanceMeters", "totalDistance"]),
        total_duration_secs: number(raw, &["totalDuration", "totalDurationSeconds"]),
        encoded_polyline: field(raw, POLYLINE_KEYS).and_then(encoded_polyline),
        legs,
    })
}

/// Filters a batch of raw route results down to the structurally valid ones.
pub fn screen_routes(batch: Vec<Value>) -> Screened<RouteResult> {
    let mut screened = Screened::default();

    for (index, raw) in batch.iter().enumerate() {
        match parse_route(raw, screened.accepted.len()) {
            Ok(route) => screened.accepted.push(route),
            Err(defect) => {
                debug!(index, %defect, "dropping route result");
                screened.dropped += 1;
            }
        }
    }

    screened
}

fn parse_leg(raw: &Value) -> Option<RouteLeg> {
    if !raw.is_object() {
        return None;
    }

    let steps = match field(raw, &["steps"]) {
        Some(Value::Array(steps)) => steps.iter().filter_map(parse_step).collect(),
        _ => Vec::new(),
    };

    Some(RouteLeg {
        distance_meters: number(raw, &["distanceMeters", "distance"]),
        duration_secs: number(raw, &["duration", "durationSeconds"]),
        steps,
        encoded_polyline: field(raw, POLYLINE_KEYS).and_then(encoded_polyline),
    })
}

fn parse_step(raw: &Value) -> Option<RouteLegStep> {
    if !raw.is_object() {
        return None;
    }

    Some(RouteLegStep {
        distance_meters: number(raw, &["distanceMeters", "distance"]),
        duration_secs: number(raw, &["duration", "durationSeconds"]),
        start_location: field(raw, &["startLocation"]).and_then(location),
        end_location: field(raw, &["endLocation"]).and_then(location),
        maneuver: field(raw, &["maneuver"])
            .and_then(Value::as_str)
            .map(str::to_string),
        instruction_text: field(raw, &["instructionText", "instructions", "htmlInstructions"])
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        encoded_polyline: field(raw, POLYLINE_KEYS).and_then(encoded_polyline),
    })
}

fn number(raw: &Value, keys: &[&str]) -> f64 {
    field(raw, keys).and_then(quantity).unwrap_or(0.0)
}
