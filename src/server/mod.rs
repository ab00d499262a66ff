pub mod app;
pub mod error;
mod extract;
mod routes;

pub use app::{router, run_server, AppState, PageSize};
pub use error::{ApiError, ApiResponse};
