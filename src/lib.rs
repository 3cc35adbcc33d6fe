// Fatigue monitor - Polls fatigue predictions, keeps a bounded history and raises alerts
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;
