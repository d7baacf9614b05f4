//! HTTP surface: photo upload to local disk and a pass-through feed post.

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::post::{PostContent, PostManager};

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    posts: Arc<PostManager>,
    upload_dir: Arc<PathBuf>,
    public_url: Arc<String>,
}

impl AppState {
    pub fn new(posts: PostManager, config: &ServerConfig) -> Self {
        Self {
            posts: Arc::new(posts),
            upload_dir: Arc::new(config.upload_dir.clone()),
            public_url: Arc::new(config.public_url.trim_end_matches('/').to_string()),
        }
    }

    /// Public URL for a stored file: base address, upload directory name, filename.
    /// Directories without a final name (`.`, `/`) contribute no segment.
    pub fn photo_url(&self, filename: &str) -> String {
        match self.upload_dir.file_name() {
            Some(dir) => format!("{}/{}/{}", self.public_url, dir.to_string_lossy(), filename),
            None => format!("{}/{}", self.public_url, filename),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRequest {
    pub content: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Multipart(e) => (e.status(), "invalid_multipart"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }
        let body = ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload_photo", post(upload_photo))
        .route("/fb_post", post(create_fb_post))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig, posts: PostManager) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let app = router(AppState::new(posts, &config));

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    let addr = listener.local_addr()?;
    info!(addr = %addr, upload_dir = %config.upload_dir.display(), "starting HTTP server");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Filenames are stored verbatim but must stay inside the upload directory.
fn is_plain_filename(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// POST /upload_photo — store the `file` part and return where it can be fetched.
async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("file part has no filename".to_string()))?;
        if !is_plain_filename(&filename) {
            return Err(ApiError::BadRequest(format!("invalid filename {:?}", filename)));
        }

        let data = field.bytes().await?;
        let path = state.upload_dir.join(&filename);
        tokio::fs::write(&path, &data).await?;

        let photo_url = state.photo_url(&filename);
        info!(path = %path.display(), bytes = data.len(), %photo_url, "photo stored");
        return Ok(Json(UploadResponse { photo_url }));
    }

    Err(ApiError::BadRequest("missing multipart field 'file'".to_string()))
}

/// POST /fb_post — publish `content` to the page feed and echo the request.
async fn create_fb_post(
    State(state): State<AppState>,
    Json(request): Json<PostRequest>,
) -> Json<PostRequest> {
    // TODO: attach photo_url once uploads are hosted somewhere the Graph API can fetch from.
    if let Some(photo_url) = &request.photo_url {
        warn!(%photo_url, "photo_url is not attached to the post");
    }

    let content = PostContent::message(request.content.clone());
    match state.posts.create_post(&content).await {
        Ok(post_id) => info!(%post_id, "feed post published"),
        Err(e) => error!(error = %e, "feed post failed"),
    }

    Json(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphClient;

    fn state(upload_dir: &Path) -> AppState {
        let client = GraphClient::new("http://127.0.0.1:9", "v21.0").unwrap();
        let config = ServerConfig {
            upload_dir: upload_dir.to_path_buf(),
            ..ServerConfig::default()
        };
        AppState::new(PostManager::new(client, "token", "page"), &config)
    }

    #[test]
    fn test_plain_filenames() {
        assert!(is_plain_filename("photo.jpg"));
        assert!(is_plain_filename("my photo (1).png"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename("."));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("../secret"));
        assert!(!is_plain_filename("nested/photo.jpg"));
        assert!(!is_plain_filename("..\\photo.jpg"));
    }

    #[test]
    fn test_photo_url_uses_directory_name() {
        assert_eq!(
            state(Path::new("uploads")).photo_url("photo.jpg"),
            "http://localhost:8000/uploads/photo.jpg"
        );
        assert_eq!(
            state(Path::new("/srv/data/uploads")).photo_url("a.png"),
            "http://localhost:8000/uploads/a.png"
        );
    }

    #[test]
    fn test_photo_url_without_directory_name() {
        assert_eq!(
            state(Path::new(".")).photo_url("photo.jpg"),
            "http://localhost:8000/photo.jpg"
        );
        assert_eq!(
            state(Path::new("/")).photo_url("photo.jpg"),
            "http://localhost:8000/photo.jpg"
        );
    }

    #[test]
    fn test_post_request_defaults_photo_url() {
        let request: PostRequest = serde_json::from_str(r#"{"content":"hello"}"#).unwrap();
        assert_eq!(request.content, "hello");
        assert_eq!(request.photo_url, None);
    }
}
