//! Back-office endpoints. Every route here requires an admin.
//!

use axum::{Router, middleware};

use crate::web::{AppState, middlewares};

pub mod assignments;
pub mod attachments;
pub mod courses;
pub mod coupons;
pub mod lectures;
pub mod storage_providers;
pub mod uploads;
pub mod users;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .merge(users::routes())
        .merge(courses::routes())
        .merge(lectures::routes())
        .merge(assignments::routes())
        .merge(coupons::routes())
        .merge(attachments::routes())
        .merge(storage_providers::routes())
        .merge(uploads::routes())
        .route_layer(middleware::from_fn(middlewares::require_admin_fn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}
