use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query};
use serde_json::Value;

use crate::api::{CreateRideParams, DynAPI, ListRidesParams};
use crate::entities::Ride;
use crate::error::{validation_error, Error};
use crate::validation::{ID_MESSAGE, PAGE_MESSAGE, SIZE_MESSAGE};

pub const BODY_MESSAGE: &str = "Request body must be a JSON object";

pub async fn create(
    Extension(api): Extension<DynAPI>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<Ride>>, Error> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected ride body");
        validation_error(BODY_MESSAGE)
    })?;

    // a derived struct would also accept a positional array
    if !body.is_object() {
        return Err(validation_error(BODY_MESSAGE));
    }

    let params: CreateRideParams =
        serde_json::from_value(body).map_err(|_| validation_error(BODY_MESSAGE))?;

    let rides = api.create_ride(params).await?;

    Ok(rides.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    params: Result<Query<ListRidesParams>, QueryRejection>,
) -> Result<Json<Vec<Ride>>, Error> {
    let Query(params) = params.map_err(query_error)?;

    let rides = api.list_rides(params).await?;

    Ok(rides.into())
}

/// Blames `size` only when the rejection names it, otherwise `page`, which
/// is checked first.
fn query_error(rejection: QueryRejection) -> Error {
    tracing::debug!(%rejection, "rejected ride query");

    if rejection.to_string().contains("`size`") {
        validation_error(SIZE_MESSAGE)
    } else {
        validation_error(PAGE_MESSAGE)
    }
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Ride>>, Error> {
    let Path(id) = id.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected ride id");
        validation_error(ID_MESSAGE)
    })?;

    let rides = api.find_ride(&id).await?;

    Ok(rides.into())
}
