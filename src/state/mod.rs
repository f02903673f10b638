//! State management module.
//!
//! Contains the connection registry and the per-side runtime controllers.

mod conn_id;
mod registry;
mod runtime;
mod session;

pub use conn_id::{ConnId, ConnIdGenerator};
pub use registry::ConnectionRegistry;
pub use runtime::{ClientRuntime, ServerRuntime};
pub use session::{Session, SessionState};
