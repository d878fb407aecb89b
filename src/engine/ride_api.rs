use super::Engine;

use async_trait::async_trait;

use crate::{
    api::{CreateRideParams, ListRidesParams, RideAPI},
    entities::Ride,
    error::{rides_not_found_error, Error},
    validation::{validate_create_ride, validate_page, validate_ride_id},
};

#[async_trait]
impl RideAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_ride(&self, params: CreateRideParams) -> Result<Vec<Ride>, Error> {
        let ride = validate_create_ride(&params)?;

        let id = self.store.insert_ride(&ride).await?;
        tracing::info!(id, "ride created");

        self.store.fetch_ride(id).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_rides(&self, params: ListRidesParams) -> Result<Vec<Ride>, Error> {
        let page = validate_page(&params)?;

        let rides = self.store.fetch_rides(page).await?;
        if rides.is_empty() {
            return Err(rides_not_found_error());
        }

        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn find_ride(&self, id: &str) -> Result<Vec<Ride>, Error> {
        let id = validate_ride_id(id)?.ok_or_else(rides_not_found_error)?;

        let rides = self.store.fetch_ride(id).await?;
        if rides.is_empty() {
            return Err(rides_not_found_error());
        }

        Ok(rides)
    }
}

#[cfg(test)]
mod fixtures {
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::api::CreateRideParams;
    use crate::db::{MemoryStore, RideStore};
    use crate::engine::Engine;
    use crate::entities::{NewRide, Page, Ride};
    use crate::error::{server_error, Error};

    /// Counts store calls and fails every one of them.
    #[derive(Default)]
    pub struct BrokenStore {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl RideStore for BrokenStore {
        async fn insert_ride(&self, _: &NewRide) -> Result<i64, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(server_error())
        }

        async fn fetch_ride(&self, _: i64) -> Result<Vec<Ride>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(server_error())
        }

        async fn fetch_rides(&self, _: Page) -> Result<Vec<Ride>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(server_error())
        }
    }

    pub fn memory_engine() -> (Engine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Engine::new(store.clone()), store)
    }

    pub fn broken_engine() -> (Engine, Arc<BrokenStore>) {
        let store = Arc::new(BrokenStore::default());
        (Engine::new(store.clone()), store)
    }

    pub fn ride_params(rider_name: &str) -> CreateRideParams {
        CreateRideParams {
            start_lat: Some(json!(-6.188225)),
            start_long: Some(json!(106.698526)),
            end_lat: Some(json!(-6.188153)),
            end_long: Some(json!(106.738628)),
            rider_name: Some(json!(rider_name)),
            driver_name: Some(json!("Go")),
            driver_vehicle: Some(json!("Honda Beat")),
        }
    }

    pub fn list_params(page: &str, size: &str) -> crate::api::ListRidesParams {
        crate::api::ListRidesParams {
            page: Some(page.into()),
            size: Some(size.into()),
        }
    }
}

#[test]
fn created_ride_round_trips() {
    use fixtures::{memory_engine, ride_params};
    use tokio_test::block_on;

    let (engine, _) = memory_engine();

    let created = block_on(engine.create_ride(ride_params("Mychael"))).unwrap();
    assert_eq!(created.len(), 1);

    let ride = &created[0];
    assert_eq!(ride.start_lat, -6.188225);
    assert_eq!(ride.start_long, 106.698526);
    assert_eq!(ride.end_lat, -6.188153);
    assert_eq!(ride.end_long, 106.738628);
    assert_eq!(ride.rider_name, "Mychael");
    assert_eq!(ride.driver_name, "Go");
    assert_eq!(ride.driver_vehicle, "Honda Beat");

    let found = block_on(engine.find_ride(&ride.id.to_string())).unwrap();
    assert_eq!(found, created);
}

#[test]
fn invalid_ride_is_never_stored() {
    use crate::error::ErrorCode;
    use crate::validation::{END_COORDINATES_MESSAGE, RIDER_NAME_MESSAGE};
    use fixtures::{broken_engine, ride_params};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use tokio_test::block_on;

    let (engine, store) = broken_engine();

    let mut params = ride_params("Mychael");
    params.end_long = Some(json!(1000));
    let err = block_on(engine.create_ride(params)).unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, END_COORDINATES_MESSAGE);

    let err = block_on(engine.create_ride(ride_params(""))).unwrap_err();
    assert_eq!(err.message, RIDER_NAME_MESSAGE);

    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn store_failures_become_server_errors() {
    use crate::error::{server_error, ErrorCode};
    use fixtures::{broken_engine, ride_params};
    use tokio_test::block_on;

    let (engine, _) = broken_engine();

    let err = block_on(engine.create_ride(ride_params("Mychael"))).unwrap_err();
    assert_eq!(err, server_error());

    let err = block_on(engine.list_rides(ListRidesParams::default())).unwrap_err();
    assert_eq!(err.code, ErrorCode::Server);

    let err = block_on(engine.find_ride("1")).unwrap_err();
    assert_eq!(err.message, "Unknown error");
}

#[test]
fn listing_without_rides_is_not_found() {
    use crate::error::ErrorCode;
    use fixtures::memory_engine;
    use tokio_test::block_on;

    let (engine, _) = memory_engine();

    let err = block_on(engine.list_rides(ListRidesParams::default())).unwrap_err();
    assert_eq!(err.code, ErrorCode::RidesNotFound);
    assert_eq!(err.message, "Could not find any rides");
}

#[test]
fn listing_pages_through_rides_in_id_order() {
    use crate::error::ErrorCode;
    use fixtures::{list_params, memory_engine, ride_params};
    use tokio_test::{assert_ok, block_on};

    let (engine, _) = memory_engine();

    for n in 0..12 {
        assert_ok!(block_on(engine.create_ride(ride_params(&format!("rider {}", n)))));
    }

    let ids = |rides: Vec<Ride>| rides.into_iter().map(|r| r.id).collect::<Vec<_>>();

    let default_page = block_on(engine.list_rides(ListRidesParams::default())).unwrap();
    assert_eq!(ids(default_page), (1..=10).collect::<Vec<_>>());

    let first = block_on(engine.list_rides(list_params("1", "5"))).unwrap();
    assert_eq!(ids(first), vec![1, 2, 3, 4, 5]);

    let second = block_on(engine.list_rides(list_params("2", "5"))).unwrap();
    assert_eq!(ids(second), vec![6, 7, 8, 9, 10]);

    let last = block_on(engine.list_rides(list_params("3", "5"))).unwrap();
    assert_eq!(ids(last), vec![11, 12]);

    let err = block_on(engine.list_rides(list_params("4", "5"))).unwrap_err();
    assert_eq!(err.code, ErrorCode::RidesNotFound);
}

#[test]
fn invalid_pagination_is_rejected_before_the_store() {
    use crate::validation::{PAGE_MESSAGE, SIZE_MESSAGE};
    use fixtures::{broken_engine, list_params};
    use std::sync::atomic::Ordering;
    use tokio_test::{assert_err, block_on};

    let (engine, store) = broken_engine();

    let err = block_on(engine.list_rides(list_params("0", "10"))).unwrap_err();
    assert_eq!(err.message, PAGE_MESSAGE);

    let err = block_on(engine.list_rides(list_params("1", "0"))).unwrap_err();
    assert_eq!(err.message, SIZE_MESSAGE);

    let err = block_on(engine.list_rides(list_params("0", "0"))).unwrap_err();
    assert_eq!(err.message, PAGE_MESSAGE);

    assert_err!(block_on(engine.list_rides(list_params("one", "10"))));
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn finding_rides_by_id() {
    use crate::error::ErrorCode;
    use crate::validation::ID_MESSAGE;
    use fixtures::{memory_engine, ride_params};
    use tokio_test::block_on;

    let (engine, _) = memory_engine();
    block_on(engine.create_ride(ride_params("Mychael"))).unwrap();

    let err = block_on(engine.find_ride("999999")).unwrap_err();
    assert_eq!(err.code, ErrorCode::RidesNotFound);

    let err = block_on(engine.find_ride("3' OR '3=3")).unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, ID_MESSAGE);

    let rides = block_on(engine.find_ride("1")).unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].id, 1);
}

#[test]
fn oversized_id_is_not_found_without_the_store() {
    use crate::error::ErrorCode;
    use fixtures::broken_engine;
    use std::sync::atomic::Ordering;
    use tokio_test::block_on;

    let (engine, store) = broken_engine();

    let err = block_on(engine.find_ride("99999999999999999999")).unwrap_err();
    assert_eq!(err.code, ErrorCode::RidesNotFound);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn malformed_id_never_reaches_the_store() {
    use fixtures::broken_engine;
    use std::sync::atomic::Ordering;
    use tokio_test::block_on;

    let (engine, store) = broken_engine();

    for id in ["3' OR '3=3", "1; DROP TABLE Rides", "1.5", "", "abc"] {
        let err = block_on(engine.find_ride(id)).unwrap_err();
        assert_eq!(err.message, "ID must be an integer");
    }

    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}
