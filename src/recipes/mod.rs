pub(crate) mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod mem;
pub mod service;
pub mod store;
pub mod types;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::read_router().merge(handlers::write_router())
}
