// Application layer - Use cases and the ports they depend on
pub mod alert_service;
pub mod polling_service;
pub mod ports;
pub mod preferences;
pub mod series_store;

#[cfg(test)]
pub(crate) mod test_support;
