//! Domain types for delivery route planning.
//!
//! Values of these types are only built by the validators from raw wire
//! records, so anything holding one can rely on its structural invariants.
//! They serialize back into the delivery service's field names.

use std::fmt;

use serde::Serialize;

/// A WGS-84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a delivery order.
    OrderId
);
string_id!(ClientId);
string_id!(WarehouseId);
string_id!(VehicleId);
string_id!(
    /// Identifier of one route inside a generated batch.
    RouteId
);

/// Lifecycle status of an order. Unknown statuses are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum OrderStatus {
    Received,
    InProgress,
    Pending,
    Completed,
    Other(String),
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value {
            "RECEIVED" => OrderStatus::Received,
            "IN_PROGRESS" => OrderStatus::InProgress,
            "PENDING" => OrderStatus::Pending,
            "COMPLETED" => OrderStatus::Completed,
            other => OrderStatus::Other(other.to_string()),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Received => "RECEIVED".to_string(),
            OrderStatus::InProgress => "IN_PROGRESS".to_string(),
            OrderStatus::Pending => "PENDING".to_string(),
            OrderStatus::Completed => "COMPLETED".to_string(),
            OrderStatus::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: ClientId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ubicacion")]
    pub location: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "ubicacion")]
    pub location: GeoPoint,
}

/// A delivery order. `origin_warehouses` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "estado")]
    pub status: OrderStatus,
    #[serde(rename = "cliente")]
    pub client: Client,
    #[serde(rename = "almacenesOrigen")]
    pub origin_warehouses: Vec<Warehouse>,
}

impl Order {
    pub fn first_warehouse(&self) -> Option<&Warehouse> {
        self.origin_warehouses.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "modelo", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "ubicacionActual")]
    pub current_location: GeoPoint,
}

/// A pending order paired with the vehicle pre-assigned to deliver it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryCandidate {
    #[serde(rename = "orden")]
    pub order: Order,
    #[serde(rename = "vehiculoAsignado")]
    pub assigned_vehicle: Vehicle,
}

impl DeliveryCandidate {
    pub fn order_id(&self) -> &OrderId {
        &self.order.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteLegStep {
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub start_location: Option<GeoPoint>,
    pub end_location: Option<GeoPoint>,
    pub maneuver: Option<String>,
    pub instruction_text: String,
    pub encoded_polyline: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_secs: f64,
    pub steps: Vec<RouteLegStep>,
    pub encoded_polyline: Option<String>,
}

/// One optimized route returned by the routing service.
///
/// `order_ids` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub id: RouteId,
    pub vehicle_id: VehicleId,
    pub order_ids: Vec<OrderId>,
    pub total_distance_meters: f64,
    pub total_duration_secs: f64,
    pub encoded_polyline: Option<String>,
    pub legs: Vec<RouteLeg>,
}

/// Output of a structural filter: the records that passed and how many
/// were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Screened<T> {
    pub accepted: Vec<T>,
    pub dropped: usize,
}

impl<T> Default for Screened<T> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            dropped: 0,
        }
    }
}
