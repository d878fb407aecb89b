mod memory;
mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{NewRide, Page, Ride};
use crate::error::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence for rides. Implementations assign `id` and `created` on
/// insert and never update or delete a stored ride.
#[async_trait]
pub trait RideStore {
    /// Stores a ride and returns its generated id.
    async fn insert_ride(&self, ride: &NewRide) -> Result<i64, Error>;

    /// Rides with exactly this id; at most one.
    async fn fetch_ride(&self, id: i64) -> Result<Vec<Ride>, Error>;

    /// One page of rides in ascending id order.
    async fn fetch_rides(&self, page: Page) -> Result<Vec<Ride>, Error>;
}

pub type DynStore = Arc<dyn RideStore + Send + Sync>;
