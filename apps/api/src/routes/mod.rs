pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::cvs::handlers as cvs;
use crate::documents::extract::MAX_DOCUMENT_BYTES;
use crate::documents::handlers as documents;
use crate::generation::handlers as generation;
use crate::profile::handlers as profile;
use crate::state::AppState;

/// Headroom over the file limit for multipart boundaries and the other fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route("/api/v1/generate-cv", post(generation::handle_generate_cv))
        // Jobs
        .route(
            "/api/v1/cvs",
            post(cvs::handle_create_cv).get(cvs::handle_list_cvs),
        )
        .route(
            "/api/v1/cvs/:id",
            get(cvs::handle_get_cv).delete(cvs::handle_delete_cv),
        )
        // Documents
        .route(
            "/api/v1/documents",
            post(documents::handle_upload_document)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        // Account
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).patch(profile::handle_update_profile),
        )
        .route("/api/v1/dashboard", get(profile::handle_dashboard))
        .with_state(state)
}
