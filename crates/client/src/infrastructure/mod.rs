//! Infrastructure: ports, settings and the in-process adapters.

pub mod cache;
pub mod local_bus;
pub mod memory;
pub mod ports;
pub mod settings;
