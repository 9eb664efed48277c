//! Transport DTOs for the delivery service.
//!
//! Every field is optional and numeric fields stay as raw JSON values: the
//! service is not trusted to send complete records, so the validators map
//! these into domain types in one pass and drop whatever does not fit.

use serde::Deserialize;
use serde_json::Value;

use crate::error::TransportError;
use crate::model::GeoPoint;

/// The `{ success, result }` wrapper around every service response.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    /// Unwraps the batch carried in `result`.
    pub fn into_batch(self) -> Result<Vec<Value>, TransportError> {
        if !self.success {
            return Err(TransportError::Rejected(
                self.message
                    .unwrap_or_else(|| "the delivery service rejected the request".to_string()),
            ));
        }

        match self.result {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(TransportError::MalformedResponse(format!(
                "expected an array in `result`, got {}",
                json_kind(&other)
            ))),
            None => Err(TransportError::MalformedResponse(
                "response has no `result`".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidate {
    #[serde(default, rename = "orden", alias = "order")]
    pub order: Option<RawOrder>,
    #[serde(default, rename = "vehiculoAsignado", alias = "assignedVehicle")]
    pub vehicle: Option<RawVehicle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrder {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "estado", alias = "status")]
    pub status: Option<String>,
    #[serde(default, rename = "cliente", alias = "client")]
    pub client: Option<RawClient>,
    #[serde(default, rename = "almacenesOrigen", alias = "originWarehouses")]
    pub origin_warehouses: Option<Vec<RawWarehouse>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClient {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "nombre", alias = "name")]
    pub name: Option<Value>,
    #[serde(default, rename = "ubicacion", alias = "location")]
    pub location: Option<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWarehouse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "nombre", alias = "name")]
    pub name: Option<Value>,
    #[serde(default, rename = "ubicacion", alias = "location")]
    pub location: Option<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVehicle {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "placa", alias = "plate")]
    pub plate: Option<String>,
    #[serde(default, rename = "modelo", alias = "model")]
    pub model: Option<Value>,
    #[serde(default, rename = "ubicacionActual", alias = "currentLocation")]
    pub current_location: Option<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lng: Option<Value>,
}

impl RawLocation {
    /// Both coordinates as finite numbers, or nothing.
    pub fn to_point(&self) -> Option<GeoPoint> {
        let lat = finite_number(self.lat.as_ref()?)?;
        let lng = finite_number(self.lng.as_ref()?)?;
        Some(GeoPoint::new(lat, lng))
    }
}

/// Accepts non-empty strings and integers as identifiers.
pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

/// Optional descriptive text. Anything but a non-empty string is ignored.
pub fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

/// A quantity sent either as a bare number or as `{ "value": number }`.
pub fn quantity(value: &Value) -> Option<f64> {
    match value {
        Value::Object(map) => map.get("value").and_then(finite_number),
        other => finite_number(other),
    }
}

/// An encoded polyline sent either as a string or as `{ "points": "..." }`.
pub fn encoded_polyline(value: &Value) -> Option<String> {
    let encoded = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("points")?.as_str()?,
        _ => return None,
    };
    if encoded.is_empty() {
        None
    } else {
        Some(encoded.to_string())
    }
}

/// First key of `keys` present and non-null in `object`.
pub fn field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

pub fn location(value: &Value) -> Option<GeoPoint> {
    let lat = finite_number(value.get("lat")?)?;
    let lng = finite_number(value.get("lng")?)?;
    Some(GeoPoint::new(lat, lng))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
