//! HTTP front end for the game search service.

pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use error::ServerError;
pub use logging::{ACTIVITY_TARGET, init_logging};
pub use routes::build_router;
pub use state::AppState;
