//! Shared application state.

use std::sync::Arc;

use related_engine::{Catalog, Config, Engine};

use crate::cache::ReportCache;

pub struct AppState {
  pub engine: Engine,
  pub cache: ReportCache,
}

impl AppState {
  pub fn new(catalog: Catalog, cache_capacity: usize) -> Self {
    Self {
      engine: Engine::new(Config::default(), Arc::new(catalog)),
      cache: ReportCache::new(cache_capacity),
    }
  }
}
