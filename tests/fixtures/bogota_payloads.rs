//! Delivery service payloads built around Bogotá locations.

use serde_json::{json, Value};

/// A named location (lat, lng).
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64) -> Self {
        Self { id, name, lat, lng }
    }

    pub fn json(&self) -> Value {
        json!({ "lat": self.lat, "lng": self.lng })
    }
}

pub const BODEGA_FONTIBON: Location = Location::new("bod-fontibon", "Bodega Fontibón", 4.67838, -74.14162);
pub const BODEGA_MONTEVIDEO: Location = Location::new("bod-montevideo", "Bodega Montevideo", 4.64624, -74.11296);

pub const CLIENTE_CHAPINERO: Location = Location::new("cli-chapinero", "Tienda Chapinero", 4.64867, -74.06284);
pub const CLIENTE_USAQUEN: Location = Location::new("cli-usaquen", "Tienda Usaquén", 4.69502, -74.03093);
pub const CLIENTE_KENNEDY: Location = Location::new("cli-kennedy", "Tienda Kennedy", 4.62805, -74.15743);

pub const CAMION_CALLE_80: Location = Location::new("veh-calle80", "Calle 80", 4.69154, -74.08235);
pub const CAMION_AUTOPISTA_SUR: Location = Location::new("veh-sur", "Autopista Sur", 4.59541, -74.13871);

/// (4.69154, -74.08235) -> (4.64867, -74.06284) -> (4.69502, -74.03093)
pub const LEG_POLYLINE: &str = "cis[tedcM|jG}xBu`HmfE";

/// (4.69154, -74.08235) -> (4.64867, -74.06284)
pub const STEP_POLYLINE: &str = "cis[tedcM|jG}xB";

pub fn candidate(order_id: &str, client: Location, warehouse: Location, vehicle: Location) -> Value {
    json!({
        "orden": {
            "id": order_id,
            "estado": "RECEIVED",
            "cliente": {
                "id": client.id,
                "nombre": client.name,
                "ubicacion": client.json()
            },
            "almacenesOrigen": [
                { "id": warehouse.id, "nombre": warehouse.name, "ubicacion": warehouse.json() }
            ]
        },
        "vehiculoAsignado": {
            "id": vehicle.id,
            "placa": vehicle.id.trim_start_matches("veh-").to_uppercase(),
            "modelo": "NHR",
            "ubicacionActual": vehicle.json()
        }
    })
}

/// Same as [`candidate`] but the client location has no longitude.
pub fn candidate_without_client_lng(order_id: &str) -> Value {
    let mut value = candidate(order_id, CLIENTE_KENNEDY, BODEGA_FONTIBON, CAMION_AUTOPISTA_SUR);
    value["orden"]["cliente"]["ubicacion"]
        .as_object_mut()
        .expect("ubicacion is an object")
        .remove("lng");
    value
}

pub fn envelope(result: Value) -> Value {
    json!({ "success": true, "result": result })
}

pub fn route_with_leg(vehicle_id: &str, order_ids: &[&str]) -> Value {
    json!({
        "vehicleId": vehicle_id,
        "orderIds": order_ids,
        "totalDistanceMeters": 14250.0,
        "totalDuration": 2460,
        "legs": [
            {
                "distanceMeters": 14250.0,
                "duration": 2460,
                "encodedPolyline": LEG_POLYLINE,
                "steps": []
            }
        ]
    })
}

pub fn route_with_leg_and_step(vehicle_id: &str, order_ids: &[&str]) -> Value {
    let mut route = route_with_leg(vehicle_id, order_ids);
    route["legs"][0]["steps"] = json!([
        {
            "distanceMeters": 5200.0,
            "duration": 780,
            "startLocation": CAMION_CALLE_80.json(),
            "endLocation": CLIENTE_CHAPINERO.json(),
            "maneuver": "TURN_RIGHT",
            "instructionText": "Gire a la derecha en la Carrera 7",
            "encodedPolyline": STEP_POLYLINE
        }
    ]);
    route
}

pub fn route_without_geometry(vehicle_id: &str, order_ids: &[&str]) -> Value {
    json!({
        "vehicleId": vehicle_id,
        "orderIds": order_ids,
        "totalDistanceMeters": 0,
        "totalDuration": 0,
        "encodedPolyline": "",
        "legs": []
    })
}
