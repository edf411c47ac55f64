use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use site_kit_core::UserConfig;
use site_kit_core::config::load_config;
use site_kit_core::i18n;
use site_kit_generator::page::{RegistryBuilder, SharedRegistry};
use site_kit_generator::render;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

/// Locale set refreshed by the watcher when locale data changes.
struct LocaleState {
    locales: Vec<String>,
    default_locale: String,
}

#[derive(Clone)]
struct AppState {
    config: Arc<UserConfig>,
    registry: Arc<SharedRegistry>,
    locales: Arc<RwLock<LocaleState>>,
    reload_tx: broadcast::Sender<()>,
}

/// Start the dev server: per-request rendering, public files first, SSE
/// live reload, and a file watcher that refreshes locales and swaps the
/// page registry.
pub async fn run(project: &Path, port: Option<u16>, builder: RegistryBuilder) -> Result<()> {
    let mut config = load_config(project).context("Failed to load site.toml")?;
    if let Some(port) = port {
        config.port = port;
    }
    let config = Arc::new(config);

    let locale_infos = i18n::discover_locales(&config);
    let locales: Vec<String> = locale_infos.iter().map(|info| info.code.clone()).collect();
    let default_locale = locale_infos
        .iter()
        .find(|info| info.is_default)
        .map(|info| info.code.clone())
        .unwrap_or_else(|| config.default_locale.clone());

    let registry = Arc::new(SharedRegistry::new(builder));
    println!("🚀 Starting dev server...");
    println!("   Project: {}", project.display());
    println!("   ✓ Registered {} pages", registry.snapshot().len());

    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        config: config.clone(),
        registry,
        locales: Arc::new(RwLock::new(LocaleState {
            locales: locales.clone(),
            default_locale,
        })),
        reload_tx: reload_tx.clone(),
    };

    let app = Router::new()
        .route("/_reload", get(sse_handler))
        .fallback_service(
            ServeDir::new(&config.public_dir)
                .append_index_html_on_directories(true)
                .not_found_service(get(page_handler).with_state(state.clone())),
        )
        .with_state(state.clone());

    let watcher_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_state).await {
            eprintln!("File watcher error: {e}");
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    println!("\n🚀 Dev server ready at: http://localhost:{}", config.port);
    println!("🌐 Available locales: {}", locales.join(", "));
    println!("👀 Watching {} for changes. Press Ctrl+C to stop\n", config.app_dir.display());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Watch the app directory and site.toml; on a relevant change refresh the
/// locale set if needed, swap the page registry, and broadcast a reload.
async fn watch_files(state: AppState) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: std::result::Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&state.config.app_dir, RecursiveMode::Recursive)?;
    if state.config.pages_dir.exists() && !state.config.pages_dir.starts_with(&state.config.app_dir)
    {
        watcher.watch(&state.config.pages_dir, RecursiveMode::Recursive)?;
    }
    let site_toml = state.config.project_root.join("site.toml");
    if site_toml.exists() {
        watcher.watch(&site_toml, RecursiveMode::NonRecursive)?;
    }

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                // Filter out temporary files and hidden files
                let relevant = event.paths.iter().any(|p| {
                    let filename = p.file_name().unwrap_or_default().to_string_lossy();
                    !filename.starts_with('.') && !filename.ends_with('~')
                });
                if !relevant {
                    continue;
                }

                let touches_locales = event
                    .paths
                    .iter()
                    .any(|p| p.starts_with(&state.config.locales_dir) || *p == site_toml);
                if touches_locales {
                    refresh_locales(&state);
                }

                state.registry.swap();
                println!("   📝 File changed, reloading...");
                let _ = state.reload_tx.send(());
            }
            _ => {}
        }
    }

    Ok(())
}

fn refresh_locales(state: &AppState) {
    println!("Locale data updated, re-discovering locales...");
    let infos = i18n::discover_locales(&state.config);
    let locales: Vec<String> = infos.iter().map(|info| info.code.clone()).collect();
    let default_locale = infos
        .iter()
        .find(|info| info.is_default)
        .map(|info| info.code.clone())
        .unwrap_or_else(|| state.config.default_locale.clone());
    println!(
        "Available locales: {}. Default locale: {}",
        locales.join(", "),
        default_locale
    );

    let mut guard = state.locales.write().expect("locale state lock poisoned");
    guard.locales = locales;
    guard.default_locale = default_locale;
}

/// SSE endpoint for live reload. Heartbeats keep idle connections alive; a
/// dropped or lagged subscriber never affects delivery to the others.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(()) => yield Ok(Event::default().data("reload")),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Resolve a request path to a page route and render it. Public files were
/// already tried by the time this runs.
async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let mut request_pathname = uri.path().trim_start_matches('/').to_string();
    if request_pathname.is_empty() || request_pathname.ends_with('/') {
        request_pathname.push_str("index.html");
    }

    if let Some(stripped) = request_pathname.strip_suffix("/index.html") {
        request_pathname = if stripped.is_empty() {
            "index".to_string()
        } else {
            stripped.to_string()
        };
    } else if let Some(stripped) = request_pathname.strip_suffix(".html") {
        request_pathname = stripped.to_string();
    }

    let (locales, default_locale) = {
        let guard = state.locales.read().expect("locale state lock poisoned");
        (guard.locales.clone(), guard.default_locale.clone())
    };

    let mut locale = default_locale;
    if let Some((first, rest)) = split_locale_prefix(&request_pathname)
        && locales.iter().any(|code| code == first)
    {
        let rest = rest.to_string();
        locale = first.to_string();
        request_pathname = if rest.is_empty() {
            "index".to_string()
        } else {
            rest
        };
    }

    let registry = state.registry.snapshot();
    let route = if registry.get(&request_pathname).is_some() {
        request_pathname.clone()
    } else {
        let index_route = format!("{request_pathname}/index");
        if registry.get(&index_route).is_some() {
            index_route
        } else {
            // Fall back to a pre-rendered public page before giving up
            let fallback = state
                .config
                .public_dir
                .join(format!("{request_pathname}.html"));
            if fallback.is_file() {
                return serve_public_file(&fallback).await;
            }
            return (StatusCode::NOT_FOUND, "Page not found").into_response();
        }
    };

    match render::render_page(&state.config, &registry, &route, &locale, true, None) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            eprintln!("Error rendering page: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(error_page(&e))).into_response()
        }
    }
}

fn split_locale_prefix(pathname: &str) -> Option<(&str, &str)> {
    match pathname.split_once('/') {
        Some((first, rest)) => Some((first, rest)),
        None if !pathname.is_empty() => Some((pathname, "")),
        None => None,
    }
}

async fn serve_public_file(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(e) => {
            eprintln!("Failed to read {}: {e}", path.display());
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Styled error page returned for per-request rendering failures. The dev
/// server process itself stays up.
fn error_page(error: &site_kit_core::Error) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Error</title>
    <style>
        body {{ font-family: sans-serif; background-color: #f8d7da; color: #721c24; padding: 20px; }}
        h1 {{ color: #721c24; }}
        pre {{ background-color: #f5c6cb; padding: 15px; border-radius: 5px; white-space: pre-wrap; word-wrap: break-word; }}
    </style>
</head>
<body>
    <h1>Rendering Error</h1>
    <p>An error occurred while rendering the page:</p>
    <pre>{error}

{error:?}</pre>
    <p>Check the server console for more details.</p>
</body>
</html>"#
    )
}
