// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_store;
pub mod http_prediction_client;
pub mod http_response;
pub mod memory_store;
pub mod ndjson_stream;
pub mod settings_store;
pub mod tokio_scheduler;
pub mod tracing_notifier;
