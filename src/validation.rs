//! Checks on untrusted request input. Everything here runs before the store
//! is touched and has no side effects.

use serde_json::Value;

use crate::api::{CreateRideParams, ListRidesParams};
use crate::entities::{Coordinates, NewRide, Page};
use crate::error::{validation_error, Error};

pub const START_COORDINATES_MESSAGE: &str =
    "Start latitude and longitude must be between -90 - 90 and -180 to 180 degrees respectively";
pub const END_COORDINATES_MESSAGE: &str =
    "End latitude and longitude must be between -90 - 90 and -180 to 180 degrees respectively";
pub const RIDER_NAME_MESSAGE: &str = "Rider name must be a non empty string";
pub const DRIVER_NAME_MESSAGE: &str = "Driver name must be a non empty string";
pub const DRIVER_VEHICLE_MESSAGE: &str = "Driver vehicle must be a non empty string";
pub const PAGE_MESSAGE: &str = "Page must be an integer and greater than or equal to 1";
pub const SIZE_MESSAGE: &str = "Size must be an integer and greater than or equal to 1";
pub const ID_MESSAGE: &str = "ID must be an integer";

/// Runs the create-ride rules in order and stops at the first failure.
pub fn validate_create_ride(params: &CreateRideParams) -> Result<NewRide, Error> {
    let start = Coordinates::new(
        coerce_number(params.start_lat.as_ref()),
        coerce_number(params.start_long.as_ref()),
    );
    if !start.is_valid() {
        return Err(validation_error(START_COORDINATES_MESSAGE));
    }

    let end = Coordinates::new(
        coerce_number(params.end_lat.as_ref()),
        coerce_number(params.end_long.as_ref()),
    );
    if !end.is_valid() {
        return Err(validation_error(END_COORDINATES_MESSAGE));
    }

    let rider_name = non_empty_string(params.rider_name.as_ref(), RIDER_NAME_MESSAGE)?;
    let driver_name = non_empty_string(params.driver_name.as_ref(), DRIVER_NAME_MESSAGE)?;
    let driver_vehicle = non_empty_string(params.driver_vehicle.as_ref(), DRIVER_VEHICLE_MESSAGE)?;

    Ok(NewRide {
        start,
        end,
        rider_name,
        driver_name,
        driver_vehicle,
    })
}

/// Numbers and numeric strings are accepted, anything else becomes NaN.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn non_empty_string(value: Option<&Value>, message: &str) -> Result<String, Error> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        _ => Err(validation_error(message)),
    }
}

/// `page` and `size` come together or not at all; page is checked first.
pub fn validate_page(params: &ListRidesParams) -> Result<Page, Error> {
    if params.page.is_none() && params.size.is_none() {
        return Ok(Page::default());
    }

    let number = positive_integer(params.page.as_deref()).ok_or_else(|| validation_error(PAGE_MESSAGE))?;
    let size = positive_integer(params.size.as_deref()).ok_or_else(|| validation_error(SIZE_MESSAGE))?;

    Ok(Page::new(number, size))
}

fn positive_integer(value: Option<&str>) -> Option<i64> {
    value?.parse::<i64>().ok().filter(|n| *n >= 1)
}

/// `None` is a whole number too large for any stored id.
pub fn validate_ride_id(id: &str) -> Result<Option<i64>, Error> {
    let digits = id.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(id);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(validation_error(ID_MESSAGE));
    }

    Ok(id.parse::<i64>().ok())
}

#[cfg(test)]
fn valid_params() -> CreateRideParams {
    use serde_json::json;

    CreateRideParams {
        start_lat: Some(json!(-6.188225)),
        start_long: Some(json!(106.698526)),
        end_lat: Some(json!(-6.188153)),
        end_long: Some(json!(106.738628)),
        rider_name: Some(json!("Mychael")),
        driver_name: Some(json!("Go")),
        driver_vehicle: Some(json!("Honda Beat")),
    }
}

#[test]
fn valid_ride_passes() {
    let ride = validate_create_ride(&valid_params()).unwrap();

    assert_eq!(ride.start, Coordinates::new(-6.188225, 106.698526));
    assert_eq!(ride.end, Coordinates::new(-6.188153, 106.738628));
    assert_eq!(ride.rider_name, "Mychael");
    assert_eq!(ride.driver_name, "Go");
    assert_eq!(ride.driver_vehicle, "Honda Beat");
}

#[cfg(test)]
fn params_with(field: &str, value: Value) -> CreateRideParams {
    let mut body = serde_json::to_value(valid_params()).unwrap();
    body[field] = value;
    serde_json::from_value(body).unwrap()
}

#[test]
fn out_of_range_coordinates_fail_with_their_message() {
    use serde_json::json;

    let cases = [
        ("start_lat", json!(1000), START_COORDINATES_MESSAGE),
        ("start_lat", json!(-90.5), START_COORDINATES_MESSAGE),
        ("start_long", json!(1000), START_COORDINATES_MESSAGE),
        ("start_long", json!(-181), START_COORDINATES_MESSAGE),
        ("end_lat", json!(1000), END_COORDINATES_MESSAGE),
        ("end_lat", json!(-91), END_COORDINATES_MESSAGE),
        ("end_long", json!(1000), END_COORDINATES_MESSAGE),
        ("end_long", json!(180.01), END_COORDINATES_MESSAGE),
    ];

    for (field, value, message) in cases {
        let err = validate_create_ride(&params_with(field, value)).unwrap_err();
        assert_eq!(err, validation_error(message), "{}", field);
    }
}

#[test]
fn non_numeric_coordinates_fail_range_check() {
    use serde_json::json;

    let mut params = valid_params();
    params.start_lat = None;
    assert_eq!(validate_create_ride(&params).unwrap_err().message, START_COORDINATES_MESSAGE);

    let mut params = valid_params();
    params.end_long = Some(json!("east"));
    assert_eq!(validate_create_ride(&params).unwrap_err().message, END_COORDINATES_MESSAGE);

    let mut params = valid_params();
    params.end_lat = Some(json!(true));
    assert_eq!(validate_create_ride(&params).unwrap_err().message, END_COORDINATES_MESSAGE);
}

#[test]
fn numeric_strings_are_coerced() {
    use serde_json::json;

    assert_eq!(coerce_number(Some(&json!("-6.5"))), -6.5);
    assert_eq!(coerce_number(Some(&json!(" 12 "))), 12.0);
    assert!(coerce_number(Some(&json!("12abc"))).is_nan());
    assert!(coerce_number(Some(&json!(null))).is_nan());
    assert!(coerce_number(None).is_nan());
}

#[test]
fn names_must_be_non_empty_strings() {
    use serde_json::json;

    let mut params = valid_params();
    params.rider_name = None;
    assert_eq!(validate_create_ride(&params).unwrap_err().message, RIDER_NAME_MESSAGE);

    let mut params = valid_params();
    params.driver_name = Some(json!(""));
    assert_eq!(validate_create_ride(&params).unwrap_err().message, DRIVER_NAME_MESSAGE);

    let mut params = valid_params();
    params.driver_vehicle = Some(json!(42));
    assert_eq!(validate_create_ride(&params).unwrap_err().message, DRIVER_VEHICLE_MESSAGE);
}

#[test]
fn first_failure_wins() {
    let params = CreateRideParams::default();
    assert_eq!(validate_create_ride(&params).unwrap_err().message, START_COORDINATES_MESSAGE);

    let mut params = valid_params();
    params.rider_name = None;
    params.driver_name = None;
    params.driver_vehicle = None;
    assert_eq!(validate_create_ride(&params).unwrap_err().message, RIDER_NAME_MESSAGE);
}

#[test]
fn page_defaults_when_absent() {
    assert_eq!(validate_page(&ListRidesParams::default()).unwrap(), Page::default());
}

#[test]
fn page_and_size_must_be_positive_integers() {
    let params = |page: Option<&str>, size: Option<&str>| ListRidesParams {
        page: page.map(String::from),
        size: size.map(String::from),
    };

    assert_eq!(validate_page(&params(Some("2"), Some("5"))).unwrap(), Page::new(2, 5));

    assert_eq!(validate_page(&params(Some("0"), Some("10"))).unwrap_err().message, PAGE_MESSAGE);
    assert_eq!(validate_page(&params(Some("1"), Some("0"))).unwrap_err().message, SIZE_MESSAGE);
    assert_eq!(validate_page(&params(Some("1.5"), Some("10"))).unwrap_err().message, PAGE_MESSAGE);
    assert_eq!(validate_page(&params(Some("1"), Some("abc"))).unwrap_err().message, SIZE_MESSAGE);
    assert_eq!(validate_page(&params(Some("-1"), Some("-1"))).unwrap_err().message, PAGE_MESSAGE);
    assert_eq!(validate_page(&params(None, Some("10"))).unwrap_err().message, PAGE_MESSAGE);
    assert_eq!(validate_page(&params(Some("1"), None)).unwrap_err().message, SIZE_MESSAGE);
}

#[test]
fn ride_id_must_be_an_integer() {
    assert_eq!(validate_ride_id("42").unwrap(), Some(42));
    assert_eq!(validate_ride_id("-7").unwrap(), Some(-7));
    assert_eq!(validate_ride_id("3' OR '3=3").unwrap_err(), validation_error(ID_MESSAGE));
    assert_eq!(validate_ride_id("1.0").unwrap_err().message, ID_MESSAGE);
    assert_eq!(validate_ride_id("").unwrap_err().message, ID_MESSAGE);
    assert_eq!(validate_ride_id("-").unwrap_err().message, ID_MESSAGE);
    assert_eq!(validate_ride_id(" 1").unwrap_err().message, ID_MESSAGE);
}

#[test]
fn oversized_ride_id_is_still_an_integer() {
    assert_eq!(validate_ride_id("99999999999999999999").unwrap(), None);
    assert_eq!(validate_ride_id("-99999999999999999999").unwrap(), None);
}
