use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untrusted body of `POST /rides`. Fields stay loosely typed so that a
/// wrong-typed value fails validation with its own message instead of
/// rejecting the whole body.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateRideParams {
    pub start_lat: Option<Value>,
    pub start_long: Option<Value>,
    pub end_lat: Option<Value>,
    pub end_long: Option<Value>,
    pub rider_name: Option<Value>,
    pub driver_name: Option<Value>,
    pub driver_vehicle: Option<Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ListRidesParams {
    pub page: Option<String>,
    pub size: Option<String>,
}
