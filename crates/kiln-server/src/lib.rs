//! Kiln training service library.
//!
//! The binary in `main.rs` wires these pieces to a TCP listener; tests
//! drive the router directly.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
