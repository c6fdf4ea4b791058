// Port Layer - Interfaces for external collaborators

pub mod adapter_controller;
pub mod connectivity_probe;
pub mod event_sink;
pub mod id_provider; // For deterministic testing
pub mod time_provider;

// Re-exports
pub use adapter_controller::{AdapterAction, AdapterController, AdapterError};
pub use connectivity_probe::{ConnectivityProbe, ProbeError};
pub use event_sink::EventSink;
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
