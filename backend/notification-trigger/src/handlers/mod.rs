/// HTTP handlers for the callable endpoint
pub mod callable;

pub use callable::{register_routes, simulate_notification, AppState};
