//! Static asset host for every path outside the proxy.
//!
//! # Data Flow
//! ```text
//! non-proxy request
//!     → ServeDir over static_files.root (index.html appended for directories)
//!     → miss: not_found_page with status 404, or a bare 404
//!     → response returned to the caller without modification
//! ```

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::StaticFilesConfig;

#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    root: Option<PathBuf>,
    not_found_page: Option<PathBuf>,
}

impl StaticAssets {
    pub fn from_config(config: &StaticFilesConfig) -> Self {
        Self {
            root: config.root.clone(),
            not_found_page: config.not_found_page.clone(),
        }
    }

    /// Serve `request` from the asset directory.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let Some(root) = &self.root else {
            return StatusCode::NOT_FOUND.into_response();
        };

        let dir = ServeDir::new(root);
        let result = match &self.not_found_page {
            Some(page) => dir
                .not_found_service(ServeFile::new(page))
                .oneshot(request)
                .await
                .map(IntoResponse::into_response),
            None => dir.oneshot(request).await.map(IntoResponse::into_response),
        };

        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Static asset host failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
    }
}
