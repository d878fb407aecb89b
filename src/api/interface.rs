use async_trait::async_trait;
use std::sync::Arc;

use crate::api::{CreateRideParams, ListRidesParams};
use crate::entities::Ride;
use crate::error::Error;

/// Every operation answers with an array of rides, even when at most one
/// ride can match.
#[async_trait]
pub trait RideAPI {
    async fn create_ride(&self, params: CreateRideParams) -> Result<Vec<Ride>, Error>;
    async fn list_rides(&self, params: ListRidesParams) -> Result<Vec<Ride>, Error>;
    async fn find_ride(&self, id: &str) -> Result<Vec<Ride>, Error>;
}

pub trait API: RideAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
