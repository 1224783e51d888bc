//! Inbound side: the socket dispatcher and one handler per message kind.

pub mod dispatcher;
pub mod handlers;

pub use dispatcher::{DispatchOutcome, Dispatcher};
