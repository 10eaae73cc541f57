//! HTTP API over the project service.

pub mod responses;
pub mod routes;

use anyhow::Result;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
    Router,
};
use log::info;
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::CorsLayer;

use crate::context::AppContext;

pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(routes::list_projects))
        .route(
            "/create",
            get(routes::create_form).post(routes::create_project),
        )
        .route(
            "/proj/:proj_id",
            put(routes::rename_project).delete(routes::delete_project),
        )
        .route("/open/:proj_id", get(routes::open_project))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

pub async fn run_server(ctx: AppContext, bind_addr: SocketAddr) -> Result<()> {
    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received CTRL+C, shutting down...");
}
