use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::Mutex;

use super::RideStore;
use crate::entities::{NewRide, Page, Ride};
use crate::error::Error;

/// Keeps rides in process memory. Rides are appended in id order, so the
/// backing vector is always sorted by id.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Rows>,
}

#[derive(Default)]
struct Rows {
    last_id: i64,
    rides: Vec<Ride>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RideStore for MemoryStore {
    #[tracing::instrument(skip(self))]
    async fn insert_ride(&self, ride: &NewRide) -> Result<i64, Error> {
        let mut rows = self.rows.lock().await;

        rows.last_id += 1;
        let id = rows.last_id;
        let created = Utc::now().naive_utc().trunc_subsecs(0);
        rows.rides.push(Ride::new(id, ride.clone(), created));

        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_ride(&self, id: i64) -> Result<Vec<Ride>, Error> {
        let rows = self.rows.lock().await;

        let rides = rows.rides.iter().filter(|r| r.id == id).cloned().collect();
        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_rides(&self, page: Page) -> Result<Vec<Ride>, Error> {
        let rows = self.rows.lock().await;

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        let rides = rows.rides.iter().skip(offset).take(limit).cloned().collect();
        Ok(rides)
    }
}

#[test]
fn ids_increase_from_one() {
    use crate::entities::Coordinates;
    use chrono::Timelike;
    use tokio_test::block_on;

    let store = MemoryStore::new();
    let ride = NewRide {
        start: Coordinates::new(0.0, 0.0),
        end: Coordinates::new(1.0, 1.0),
        rider_name: "Mychael".into(),
        driver_name: "Go".into(),
        driver_vehicle: "Honda Beat".into(),
    };

    assert_eq!(block_on(store.insert_ride(&ride)).unwrap(), 1);
    assert_eq!(block_on(store.insert_ride(&ride)).unwrap(), 2);

    let rides = block_on(store.fetch_rides(Page::new(2, 1))).unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].id, 2);
    assert_eq!(rides[0].created.nanosecond(), 0);

    assert!(block_on(store.fetch_ride(3)).unwrap().is_empty());
    assert!(block_on(store.fetch_rides(Page::new(3, 1))).unwrap().is_empty());
}
