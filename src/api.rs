mod interface;
mod params;

pub use interface::{DynAPI, RideAPI, API};
pub use params::{CreateRideParams, ListRidesParams};
