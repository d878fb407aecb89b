use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Pool, Row, Sqlite};
use std::str::FromStr;

use super::RideStore;
use crate::entities::{NewRide, Page, Ride};
use crate::error::Error;

const CREATE_RIDES_TABLE: &str = "CREATE TABLE IF NOT EXISTS Rides (
    rideID INTEGER PRIMARY KEY AUTOINCREMENT,
    startLat REAL NOT NULL,
    startLong REAL NOT NULL,
    endLat REAL NOT NULL,
    endLong REAL NOT NULL,
    riderName TEXT NOT NULL,
    driverName TEXT NOT NULL,
    driverVehicle TEXT NOT NULL,
    created DATETIME DEFAULT CURRENT_TIMESTAMP
)";

const RIDE_COLUMNS: &str =
    "rideID, startLat, startLong, endLat, endLong, riderName, driverName, driverVehicle, created";

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    #[tracing::instrument(name = "SqliteStore::new", skip_all)]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(db_uri)?.create_if_missing(true);

        // every connection to an in-memory database opens a fresh one, so keep
        // exactly one alive for the lifetime of the pool
        let pool_options = if is_in_memory(db_uri) {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        pool.execute(CREATE_RIDES_TABLE).await?;

        tracing::info!(db_uri, "rides table ready");

        Ok(Self { pool })
    }
}

fn is_in_memory(db_uri: &str) -> bool {
    db_uri.contains(":memory:") || db_uri.contains("mode=memory")
}

fn ride_from_row(row: &SqliteRow) -> Result<Ride, sqlx::Error> {
    Ok(Ride {
        id: row.try_get("rideID")?,
        start_lat: row.try_get("startLat")?,
        start_long: row.try_get("startLong")?,
        end_lat: row.try_get("endLat")?,
        end_long: row.try_get("endLong")?,
        rider_name: row.try_get("riderName")?,
        driver_name: row.try_get("driverName")?,
        driver_vehicle: row.try_get("driverVehicle")?,
        created: row.try_get("created")?,
    })
}

#[async_trait]
impl RideStore for SqliteStore {
    #[tracing::instrument(skip(self))]
    async fn insert_ride(&self, ride: &NewRide) -> Result<i64, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query(
                    "INSERT INTO Rides (startLat, startLong, endLat, endLong, riderName, driverName, driverVehicle) VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(ride.start.latitude)
                .bind(ride.start.longitude)
                .bind(ride.end.latitude)
                .bind(ride.end.longitude)
                .bind(ride.rider_name.as_str())
                .bind(ride.driver_name.as_str())
                .bind(ride.driver_vehicle.as_str()),
            )
            .await?;

        Ok(result.last_insert_rowid())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_ride(&self, id: i64) -> Result<Vec<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = format!("SELECT {} FROM Rides WHERE rideID = ?", RIDE_COLUMNS);
        let rows = conn.fetch_all(sqlx::query(&query).bind(id)).await?;

        let rides = rows
            .iter()
            .map(ride_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_rides(&self, page: Page) -> Result<Vec<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = format!(
            "SELECT {} FROM Rides ORDER BY rideID ASC LIMIT ? OFFSET ?",
            RIDE_COLUMNS
        );
        let rows = conn
            .fetch_all(sqlx::query(&query).bind(page.limit()).bind(page.offset()))
            .await?;

        let rides = rows
            .iter()
            .map(ride_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(rides)
    }
}

#[cfg(test)]
fn new_ride(rider_name: &str) -> NewRide {
    use crate::entities::Coordinates;

    NewRide {
        start: Coordinates::new(10.0, 10.0),
        end: Coordinates::new(11.0, 11.0),
        rider_name: rider_name.into(),
        driver_name: "Go".into(),
        driver_vehicle: "Honda Beat".into(),
    }
}

#[test]
fn insert_then_fetch_by_id() {
    use tokio_test::block_on;

    block_on(async {
        let store = SqliteStore::new("sqlite::memory:", 5).await.unwrap();

        let first = store.insert_ride(&new_ride("Mychael")).await.unwrap();
        let second = store.insert_ride(&new_ride("Ayu")).await.unwrap();
        assert!(second > first);

        let rides = store.fetch_ride(second).await.unwrap();
        assert_eq!(rides.len(), 1);

        let ride = &rides[0];
        assert_eq!(ride.id, second);
        assert_eq!(ride.start_lat, 10.0);
        assert_eq!(ride.start_long, 10.0);
        assert_eq!(ride.end_lat, 11.0);
        assert_eq!(ride.end_long, 11.0);
        assert_eq!(ride.rider_name, "Ayu");
        assert_eq!(ride.driver_name, "Go");
        assert_eq!(ride.driver_vehicle, "Honda Beat");

        assert!(store.fetch_ride(999999).await.unwrap().is_empty());
    });
}

#[test]
fn fetch_rides_pages_in_id_order() {
    use tokio_test::block_on;

    block_on(async {
        let store = SqliteStore::new("sqlite::memory:", 5).await.unwrap();

        for n in 0..7 {
            store.insert_ride(&new_ride(&format!("rider {}", n))).await.unwrap();
        }

        let first = store.fetch_rides(Page::new(1, 3)).await.unwrap();
        let second = store.fetch_rides(Page::new(2, 3)).await.unwrap();
        let third = store.fetch_rides(Page::new(3, 3)).await.unwrap();
        let fourth = store.fetch_rides(Page::new(4, 3)).await.unwrap();

        let ids = |rides: &[Ride]| rides.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), vec![1, 2, 3]);
        assert_eq!(ids(&second), vec![4, 5, 6]);
        assert_eq!(ids(&third), vec![7]);
        assert!(fourth.is_empty());

        assert_eq!(first[0].rider_name, "rider 0");
    });
}

#[test]
fn injected_sql_is_stored_as_text() {
    use tokio_test::block_on;

    block_on(async {
        let store = SqliteStore::new("sqlite::memory:", 5).await.unwrap();

        let id = store
            .insert_ride(&new_ride("Mychael's OR '1=1"))
            .await
            .unwrap();

        let rides = store.fetch_ride(id).await.unwrap();
        assert_eq!(rides[0].rider_name, "Mychael's OR '1=1");
        assert_eq!(store.fetch_rides(Page::default()).await.unwrap().len(), 1);
    });
}
