//! Backend registry.
//!
//! Maps backend names to [`BackendFactory`] functions. Constructed at
//! startup and passed by value; no global state.

use std::collections::HashMap;

use tracing::info;
use vservo_common::tracker::config::TrackerConfig;
use vservo_common::vehicle::driver::{Backend, BackendFactory, VehicleError};

/// Registry of available backends.
pub struct DriverRegistry {
    factories: HashMap<&'static str, BackendFactory>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory.
    ///
    /// # Panics
    /// Panics if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: BackendFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    pub fn get_factory(&self, name: &str) -> Option<BackendFactory> {
        self.factories.get(name).copied()
    }

    /// Create the backend named by `config.driver.name`.
    ///
    /// # Errors
    /// `DriverNotFound` for an unknown name, or whatever the factory returns.
    pub fn create_backend(&self, config: &TrackerConfig) -> Result<Backend, VehicleError> {
        let name = &config.driver.name;
        let factory = self
            .get_factory(name)
            .ok_or_else(|| VehicleError::DriverNotFound(name.clone()))?;
        let backend = factory(config)?;
        info!("Created '{name}' backend");
        Ok(backend)
    }

    /// All registered names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
