use crate::config::DashboardConfig;
use crate::loader::{load_cached, LoadError, SalesTable};
use crate::render::{render_page, DashboardQuery, PageView};
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// The dataset currently shown, or why the last upload was rejected.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Empty,
    Loaded {
        file_name: String,
        table: Arc<SalesTable>,
    },
    Failed {
        message: String,
    },
}

pub struct AppState {
    pub config: DashboardConfig,
    session: Mutex<Session>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        AppState {
            config,
            session: Mutex::new(Session::Empty),
        }
    }

    /// Copy of the session; the table itself is shared, not cloned.
    pub fn snapshot(&self) -> Session {
        self.session.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn replace(&self, next: Session) {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Run a file through the cached loader and make it the active dataset.
    pub fn load(&self, file_name: &str, bytes: &[u8]) -> Result<Arc<SalesTable>, LoadError> {
        match load_cached(bytes) {
            Ok(table) => {
                self.replace(Session::Loaded {
                    file_name: file_name.to_string(),
                    table: Arc::clone(&table),
                });
                Ok(table)
            }
            Err(e) => {
                self.replace(Session::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("upload is missing the `file` field")]
    MissingFile,
    #[error("load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        tracing::warn!("rejected upload: {}", self);
        (status, self.to_string()).into_response()
    }
}

pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/upload", post(upload))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / renders the page for the current session and selectors.
async fn dashboard(State(state): State<Arc<AppState>>, Query(query): Query<DashboardQuery>) -> Response {
    let session = state.snapshot();
    let (status, page) = match &session {
        Session::Empty => (StatusCode::OK, PageView::Upload),
        Session::Failed { message } => (StatusCode::UNPROCESSABLE_ENTITY, PageView::Failed { message }),
        Session::Loaded { file_name, table } => (
            StatusCode::OK,
            PageView::Loaded {
                file_name,
                table,
                query,
            },
        ),
    };
    (status, Html(render_page(&state.config, &page).into_string())).into_response()
}

/// POST /upload loads the `file` field and redirects back to the page.
async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Result<Redirect, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field.bytes().await?;
        // Hashing and parsing are CPU-bound; keep them off the async workers.
        let task_state = Arc::clone(&state);
        let task_name = file_name.clone();
        let result = tokio::task::spawn_blocking(move || task_state.load(&task_name, &bytes)).await?;
        match result {
            Ok(table) => tracing::info!(
                file = %file_name,
                digest = &table.digest[..12],
                rows = table.len(),
                "dataset selected"
            ),
            Err(e) => tracing::warn!(file = %file_name, "failed to load upload: {}", e),
        }
        // Selectors reset with each upload.
        return Ok(Redirect::to("/"));
    }
    Err(AppError::MissingFile)
}
