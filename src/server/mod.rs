//! Preview server with on-demand post generation

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::ContentSource;
use crate::generator::Generator;
use crate::Blog;

/// Seconds the fallback page waits before asking again
const FALLBACK_REFRESH_SECS: u64 = 2;

/// How long a uid the source does not know is left alone
const MISSING_TTL: Duration = Duration::from_secs(60);

lazy_static! {
    static ref UID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Server state
struct ServerState {
    generator: Generator,
    /// Uids with a generation running
    pending: Mutex<HashSet<String>>,
    /// Uids the source reported missing, and when
    missing: Mutex<HashMap<String, Instant>>,
    revalidate: Duration,
}

impl ServerState {
    fn is_known_missing(&self, uid: &str) -> bool {
        let mut missing = self.missing.lock().unwrap_or_else(PoisonError::into_inner);
        match missing.get(uid) {
            Some(seen) if seen.elapsed() < MISSING_TTL => true,
            Some(_) => {
                missing.remove(uid);
                false
            }
            None => false,
        }
    }

    fn set_missing(&self, uid: &str, is_missing: bool) {
        let mut missing = self.missing.lock().unwrap_or_else(PoisonError::into_inner);
        if is_missing {
            missing.insert(uid.to_string(), Instant::now());
        } else {
            missing.remove(uid);
        }
    }
}

/// Build the router serving `blog.public_dir`
pub fn router(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Router> {
    let state = Arc::new(ServerState {
        generator: Generator::new(blog, source)?,
        pending: Mutex::new(HashSet::new()),
        missing: Mutex::new(HashMap::new()),
        revalidate: Duration::from_secs(blog.config.revalidate),
    });

    let static_files = ServeDir::new(&blog.public_dir).append_index_html_on_directories(true);

    Ok(Router::new()
        .route("/post/:uid", get(post_handler))
        .route("/post/:uid/", get(post_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the preview server
pub async fn start(
    blog: &Blog,
    source: Arc<dyn ContentSource>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let app = router(blog, source)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a post page, generating it in the background when missing or stale
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
) -> Response {
    if !UID_RE.is_match(&uid) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let path = state.generator.post_output_path(&uid);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => {
            if is_stale(&path, state.revalidate).await && !state.is_known_missing(&uid) {
                tracing::debug!("Post {} is stale, regenerating", uid);
                schedule_generation(&state, &uid);
            }
            Html(html).into_response()
        }
        Err(_) => {
            // A uid the source just denied keeps its fallback without polling
            let refresh = if state.is_known_missing(&uid) {
                None
            } else {
                schedule_generation(&state, &uid);
                Some(FALLBACK_REFRESH_SECS)
            };
            match state.generator.render_fallback(&uid, refresh) {
                Ok(html) => Html(html).into_response(),
                Err(e) => {
                    tracing::error!("Failed to render fallback for {}: {}", uid, e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
                }
            }
        }
    }
}

async fn is_stale(path: &std::path::Path, revalidate: Duration) -> bool {
    let modified = match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|age| age > revalidate)
        .unwrap_or(false)
}

/// Spawn a generation for `uid` unless one is already running
fn schedule_generation(state: &Arc<ServerState>, uid: &str) {
    {
        let mut pending = state.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(uid.to_string()) {
            return;
        }
    }

    let state = Arc::clone(state);
    let uid = uid.to_string();
    tokio::spawn(async move {
        match state.generator.generate_post(&uid).await {
            Ok(Some(path)) => {
                state.set_missing(&uid, false);
                tracing::info!("Generated {:?}", path);
            }
            Ok(None) => {
                state.set_missing(&uid, true);
                tracing::info!("No post {} in the source", uid);
            }
            Err(e) => tracing::error!("Generation of {} failed: {:#}", uid, e),
        }
        state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&uid);
    });
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
