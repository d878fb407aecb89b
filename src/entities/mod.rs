mod location;
mod page;
mod ride;

pub use location::Coordinates;
pub use page::{Page, DEFAULT_PAGE_SIZE};
pub use ride::{NewRide, Ride};
