//! Structural screening of delivery candidates before they can be selected.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::{
    Client, ClientId, DeliveryCandidate, GeoPoint, Order, OrderId, OrderStatus, Screened,
    Vehicle, VehicleId, Warehouse, WarehouseId,
};
use crate::wire::{id_from_value, text, RawCandidate, RawClient, RawLocation, RawVehicle, RawWarehouse};

/// Why a raw candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateDefect {
    #[error("record is not a candidate object")]
    NotAnObject,
    #[error("candidate has no order")]
    MissingOrder,
    #[error("order has no id")]
    MissingOrderId,
    #[error("order has no status")]
    MissingStatus,
    #[error("order has no client")]
    MissingClient,
    #[error("client has no id")]
    MissingClientId,
    #[error("client location is missing or not numeric")]
    InvalidClientLocation,
    #[error("order has no origin warehouses")]
    NoOriginWarehouses,
    #[error("origin warehouse #{index} has no id")]
    MissingWarehouseId { index: usize },
    #[error("origin warehouse #{index} location is missing or not numeric")]
    InvalidWarehouseLocation { index: usize },
    #[error("candidate has no assigned vehicle")]
    MissingVehicle,
    #[error("vehicle has no id")]
    MissingVehicleId,
    #[error("vehicle has no plate")]
    MissingPlate,
    #[error("vehicle location is missing or not numeric")]
    InvalidVehicleLocation,
    #[error("order {0} already appeared earlier in the batch")]
    DuplicateOrder(OrderId),
}

/// Maps a raw candidate into a validated [`DeliveryCandidate`].
pub fn parse_candidate(raw: &RawCandidate) -> Result<DeliveryCandidate, CandidateDefect> {
    let order = raw.order.as_ref().ok_or(CandidateDefect::MissingOrder)?;

    let id = order
        .id
        .as_ref()
        .and_then(id_from_value)
        .ok_or(CandidateDefect::MissingOrderId)?;
    let status = order
        .status
        .as_deref()
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .ok_or(CandidateDefect::MissingStatus)?;
    let client = parse_client(order.client.as_ref().ok_or(CandidateDefect::MissingClient)?)?;

    let raw_warehouses = order
        .origin_warehouses
        .as_deref()
        .filter(|warehouses| !warehouses.is_empty())
        .ok_or(CandidateDefect::NoOriginWarehouses)?;
    let origin_warehouses = raw_warehouses
        .iter()
        .enumerate()
        .map(|(index, warehouse)| parse_warehouse(index, warehouse))
        .collect::<Result<Vec<_>, _>>()?;

    let assigned_vehicle =
        parse_vehicle(raw.vehicle.as_ref().ok_or(CandidateDefect::MissingVehicle)?)?;

    Ok(DeliveryCandidate {
        order: Order {
            id: OrderId::new(id),
            status: OrderStatus::from(status),
            client,
            origin_warehouses,
        },
        assigned_vehicle,
    })
}

/// True when the raw candidate carries everything route planning needs.
pub fn is_structurally_valid(raw: &RawCandidate) -> bool {
    parse_candidate(raw).is_ok()
}

/// Filters a fetched batch down to its structurally valid candidates.
///
/// Order ids are unique in the result: the first valid record for an order
/// is kept and later ones count as dropped.
pub fn screen_candidates(batch: Vec<Value>) -> Screened<DeliveryCandidate> {
    let mut screened = Screened::default();
    let mut seen = HashSet::new();

    for (position, value) in batch.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawCandidate>(value)
            .map_err(|_| CandidateDefect::NotAnObject)
            .and_then(|raw| parse_candidate(&raw))
            .and_then(|candidate| {
                if seen.insert(candidate.order.id.clone()) {
                    Ok(candidate)
                } else {
                    Err(CandidateDefect::DuplicateOrder(candidate.order.id))
                }
            });

        match parsed {
            Ok(candidate) => screened.accepted.push(candidate),
            Err(defect) => {
                debug!(position, %defect, "dropping delivery candidate");
                screened.dropped += 1;
            }
        }
    }

    screened
}

fn parse_client(raw: &RawClient) -> Result<Client, CandidateDefect> {
    let id = raw
        .id
        .as_ref()
        .and_then(id_from_value)
        .ok_or(CandidateDefect::MissingClientId)?;
    let location =
        point(raw.location.as_ref()).ok_or(CandidateDefect::InvalidClientLocation)?;

    Ok(Client {
        id: ClientId::new(id),
        name: text(raw.name.as_ref()).unwrap_or_default(),
        location,
    })
}

fn parse_warehouse(index: usize, raw: &RawWarehouse) -> Result<Warehouse, CandidateDefect> {
    let id = raw
        .id
        .as_ref()
        .and_then(id_from_value)
        .ok_or(CandidateDefect::MissingWarehouseId { index })?;
    let location =
        point(raw.location.as_ref()).ok_or(CandidateDefect::InvalidWarehouseLocation { index })?;

    Ok(Warehouse {
        id: WarehouseId::new(id),
        name: text(raw.name.as_ref()),
        location,
    })
}

fn parse_vehicle(raw: &RawVehicle) -> Result<Vehicle, CandidateDefect> {
    let id = raw
        .id
        .as_ref()
        .and_then(id_from_value)
        .ok_or(CandidateDefect::MissingVehicleId)?;
    let plate = raw
        .plate
        .as_deref()
        .map(str::trim)
        .filter(|plate| !plate.is_empty())
        .ok_or(CandidateDefect::MissingPlate)?;
    let current_location =
        point(raw.current_location.as_ref()).ok_or(CandidateDefect::InvalidVehicleLocation)?;

    Ok(Vehicle {
        id: VehicleId::new(id),
        plate: plate.to_string(),
        model: text(raw.model.as_ref()),
        current_location,
    })
}

fn point(location: Option<&RawLocation>) -> Option<GeoPoint> {
    location.and_then(RawLocation::to_point)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn candidate_json() -> Value {
        json!({
            "orden": {
                "id": "o1",
                "estado": "RECEIVED",
                "cliente": { "id": "c1", "nombre": "X", "ubicacion": { "lat": 4.6, "lng": -74.08 } },
                "almacenesOrigen": [ { "id": "w1", "ubicacion": { "lat": 4.6, "lng": -74.0 } } ]
            },
            "vehiculoAsignado": {
                "id": "v1",
                "placa": "ABC123",
                "modelo": "NPR",
                "ubicacionActual": { "lat": 4.7, "lng": -74.05 }
            }
        })
    }

    fn raw(value: Value) -> RawCandidate {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_complete_candidate() {
        let candidate = parse_candidate(&raw(candidate_json())).unwrap();
        assert_eq!(candidate.order.id, OrderId::from("o1"));
        assert_eq!(candidate.order.status, OrderStatus::Received);
        assert_eq!(candidate.order.client.location, GeoPoint::new(4.6, -74.08));
        assert_eq!(candidate.assigned_vehicle.plate, "ABC123");
    }

    #[test]
    fn accepts_english_field_names() {
        let value = json!({
            "order": {
                "id": 7,
                "status": "PENDING",
                "client": { "id": 3, "name": "Y", "location": { "lat": 1.0, "lng": 2.0 } },
                "originWarehouses": [ { "id": 9, "location": { "lat": 1.5, "lng": 2.5 } } ]
            },
            "assignedVehicle": { "id": 4, "plate": "XYZ", "currentLocation": { "lat": 0.5, "lng": 0.5 } }
        });
        let candidate = parse_candidate(&raw(value)).unwrap();
        assert_eq!(candidate.order.id.as_str(), "7");
        assert_eq!(candidate.assigned_vehicle.model, None);
    }

    #[test]
    fn rejects_client_without_longitude() {
        let mut value = candidate_json();
        value["orden"]["cliente"]["ubicacion"]["lng"] = Value::Null;
        assert!(!is_structurally_valid(&raw(value.clone())));
        assert_eq!(
            parse_candidate(&raw(value)),
            Err(CandidateDefect::InvalidClientLocation)
        );
        assert!(is_structurally_valid(&raw(candidate_json())));
    }

    #[test]
    fn rejects_empty_origin_warehouses() {
        let mut value = candidate_json();
        value["orden"]["almacenesOrigen"] = json!([]);
        assert_eq!(
            parse_candidate(&raw(value)),
            Err(CandidateDefect::NoOriginWarehouses)
        );
    }

    #[test]
    fn rejects_second_warehouse_without_location() {
        let mut value = candidate_json();
        value["orden"]["almacenesOrigen"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "id": "w2" }));
        assert_eq!(
            parse_candidate(&raw(value)),
            Err(CandidateDefect::InvalidWarehouseLocation { index: 1 })
        );
    }

    #[test]
    fn rejects_incomplete_vehicle() {
        let mut value = candidate_json();
        value["vehiculoAsignado"]["placa"] = json!("");
        assert_eq!(parse_candidate(&raw(value)), Err(CandidateDefect::MissingPlate));

        let mut value = candidate_json();
        value["vehiculoAsignado"]["ubicacionActual"]["lat"] = json!("4.7");
        assert_eq!(
            parse_candidate(&raw(value)),
            Err(CandidateDefect::InvalidVehicleLocation)
        );

        let mut value = candidate_json();
        value.as_object_mut().unwrap().remove("vehiculoAsignado");
        assert_eq!(parse_candidate(&raw(value)), Err(CandidateDefect::MissingVehicle));
    }

    #[test]
    fn rejects_missing_status() {
        let mut value = candidate_json();
        value["orden"].as_object_mut().unwrap().remove("estado");
        assert_eq!(parse_candidate(&raw(value)), Err(CandidateDefect::MissingStatus));
    }

    #[test]
    fn screening_counts_drops() {
        let mut broken = candidate_json();
        broken["orden"]["id"] = Value::Null;

        let screened = screen_candidates(vec![
            candidate_json(),
            broken,
            json!("not a candidate"),
            json!({ "orden": { "estado": 5 } }),
        ]);

        assert_eq!(screened.accepted.len(), 1);
        assert_eq!(screened.dropped, 3);
    }

    #[test]
    fn screening_keeps_first_record_per_order() {
        let mut repeat = candidate_json();
        repeat["vehiculoAsignado"]["placa"] = json!("ZZZ999");

        let screened = screen_candidates(vec![candidate_json(), repeat]);

        assert_eq!(screened.accepted.len(), 1);
        assert_eq!(screened.dropped, 1);
        assert_eq!(screened.accepted[0].assigned_vehicle.plate, "ABC123");
    }

    #[test]
    fn non_string_names_are_ignored_not_fatal() {
        let mut value = candidate_json();
        value["orden"]["cliente"]["nombre"] = json!(42);
        value["orden"]["almacenesOrigen"][0]["nombre"] = json!(false);
        value["vehiculoAsignado"]["modelo"] = json!(2019);

        let screened = screen_candidates(vec![value]);

        assert_eq!(screened.dropped, 0);
        let candidate = &screened.accepted[0];
        assert_eq!(candidate.order.client.name, "");
        assert_eq!(candidate.order.origin_warehouses[0].name, None);
        assert_eq!(candidate.assigned_vehicle.model, None);
    }
}
