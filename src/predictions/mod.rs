use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod gateway;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::prediction_routes()
}
