//! Quest Log client library.
//!
//! Keeps one client's quest log in step with every other client of a session.
//!
//! ## Structure
//!
//! - `infrastructure/` - Ports, settings and in-process adapters
//! - `use_cases/` - Authority rules, refresh fan-out and outgoing operations
//! - `api/` - Socket dispatcher and inbound handlers
//! - `app` - Per-client context composition
//! - `session` - In-process clients on a local bus

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod session;
pub mod use_cases;

pub use api::{DispatchOutcome, Dispatcher};
pub use app::{SyncContext, SyncPorts};
pub use infrastructure::settings::SyncSettings;
pub use session::LocalClient;
