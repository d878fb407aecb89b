use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    #[serde(rename = "rideID")]
    pub id: i64,
    #[serde(rename = "startLat")]
    pub start_lat: f64,
    #[serde(rename = "startLong")]
    pub start_long: f64,
    #[serde(rename = "endLat")]
    pub end_lat: f64,
    #[serde(rename = "endLong")]
    pub end_long: f64,
    #[serde(rename = "riderName")]
    pub rider_name: String,
    #[serde(rename = "driverName")]
    pub driver_name: String,
    #[serde(rename = "driverVehicle")]
    pub driver_vehicle: String,
    #[serde(with = "timestamp")]
    pub created: NaiveDateTime,
}

/// A validated ride that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRide {
    pub start: Coordinates,
    pub end: Coordinates,
    pub rider_name: String,
    pub driver_name: String,
    pub driver_vehicle: String,
}

impl Ride {
    pub fn new(id: i64, ride: NewRide, created: NaiveDateTime) -> Self {
        Self {
            id,
            start_lat: ride.start.latitude,
            start_long: ride.start.longitude,
            end_lat: ride.end.latitude,
            end_long: ride.end.longitude,
            rider_name: ride.rider_name,
            driver_name: ride.driver_name,
            driver_vehicle: ride.driver_vehicle,
            created,
        }
    }
}

// same rendering as sqlite's CURRENT_TIMESTAMP
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[test]
fn ride_serializes_with_column_names() {
    use chrono::NaiveDate;
    use serde_json::json;

    let created = NaiveDate::from_ymd_opt(2019, 8, 8)
        .unwrap()
        .and_hms_opt(3, 21, 9)
        .unwrap();
    let ride = Ride::new(
        1,
        NewRide {
            start: Coordinates::new(-6.188225, 106.698526),
            end: Coordinates::new(-6.188153, 106.738628),
            rider_name: "Mychael".into(),
            driver_name: "Go".into(),
            driver_vehicle: "Honda Beat".into(),
        },
        created,
    );

    let value = serde_json::to_value(&ride).unwrap();

    assert_eq!(
        value,
        json!({
            "rideID": 1,
            "startLat": -6.188225,
            "startLong": 106.698526,
            "endLat": -6.188153,
            "endLong": 106.738628,
            "riderName": "Mychael",
            "driverName": "Go",
            "driverVehicle": "Honda Beat",
            "created": "2019-08-08 03:21:09",
        })
    );

    let parsed: Ride = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, ride);
}
