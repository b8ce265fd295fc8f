// rest/mod.rs — client agent REST API server.
//
// Axum HTTP server exposing the four client operations as POST routes with
// JSON bodies, plus a liveness probe:
//
//   POST /register
//   POST /unregister
//   POST /fetch
//   POST /build
//   GET  /health
//
// A possible conversation follows as an example.
//
//   // 1. Registration of our client, POST to /register
//   // -> {"endpoint_id":"dtn://foo/bar"}
//   // <- {"error":"","uuid":"75be76e2-23fc-da0e-eeb8-4773f84a9d2f"}
//
//   // 2. Fetching bundles for our client, POST to /fetch
//   //    There will be two answers, one with new bundles and one without
//   // -> {"uuid":"75be76e2-23fc-da0e-eeb8-4773f84a9d2f"}
//   // <- {"error":"","bundles":[ ... ]}
//   // <- {"error":"","bundles":[]}
//
//   // 3. Create and dispatch a new bundle, POST to /build
//   // -> {
//   //      "uuid": "75be76e2-23fc-da0e-eeb8-4773f84a9d2f",
//   //      "arguments": {
//   //        "destination": "dtn://dst/",
//   //        "source": "dtn://foo/bar",
//   //        "creation_timestamp_now": 1,
//   //        "lifetime": "24h",
//   //        "payload_block": "hello world"
//   //      }
//   //    }
//   // <- {"error":""}
//
//   // 4. Unregister the client, POST to /unregister
//   // -> {"uuid":"75be76e2-23fc-da0e-eeb8-4773f84a9d2f"}
//   // <- {"error":""}

pub mod messages;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("client agent API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/register", post(routes::agent::register))
        .route("/unregister", post(routes::agent::unregister))
        .route("/fetch", post(routes::agent::fetch))
        .route("/build", post(routes::agent::build))
        .with_state(ctx)
}
