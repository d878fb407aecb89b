mod ride_api;

use crate::{api::API, db::DynStore};

pub struct Engine {
    store: DynStore,
}

impl Engine {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }
}

impl API for Engine {}
