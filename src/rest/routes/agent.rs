// SPDX-License-Identifier: MIT
// rest/routes/agent.rs — the four client agent operations.
//
// Request bodies are decoded by hand from the raw bytes so a malformed
// payload also lands in the response body's `error` field; every handler
// answers 200 with the outcome embedded in the body.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use tracing::{debug, info, warn};

use crate::rest::messages::{
    BuildRequest, BuildResponse, FetchRequest, FetchResponse, RegisterRequest, RegisterResponse,
    UnregisterRequest, UnregisterResponse,
};
use crate::AppContext;

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    body: Bytes,
) -> Json<RegisterResponse> {
    let mut response = RegisterResponse::default();

    match serde_json::from_slice::<RegisterRequest>(&body) {
        Err(err) => {
            warn!(error = %err, "failed to parse register request");
            response.error = err.to_string();
        }
        Ok(request) => match ctx.agent.register(&request.endpoint_id).await {
            Ok(uuid) => {
                info!(endpoint = %request.endpoint_id, "client registered");
                response.uuid = uuid;
            }
            Err(err) => {
                warn!(endpoint = %request.endpoint_id, error = %err, "registration refused");
                response.error = err.to_string();
            }
        },
    }

    Json(response)
}

pub async fn unregister(
    State(ctx): State<Arc<AppContext>>,
    body: Bytes,
) -> Json<UnregisterResponse> {
    let mut response = UnregisterResponse::default();

    match serde_json::from_slice::<UnregisterRequest>(&body) {
        Err(err) => {
            warn!(error = %err, "failed to parse unregister request");
            response.error = err.to_string();
        }
        Ok(request) => {
            // Unknown uuids are not an error.
            info!("client unregistered");
            ctx.agent.unregister(&request.uuid).await;
        }
    }

    Json(response)
}

pub async fn fetch(State(ctx): State<Arc<AppContext>>, body: Bytes) -> Json<FetchResponse> {
    let mut response = FetchResponse::default();

    match serde_json::from_slice::<FetchRequest>(&body) {
        Err(err) => {
            warn!(error = %err, "failed to parse fetch request");
            response.error = err.to_string();
        }
        Ok(request) => {
            response.bundles = ctx.agent.fetch(&request.uuid).await;
            debug!(count = response.bundles.len(), "client fetched its mailbox");
        }
    }

    Json(response)
}

pub async fn build(State(ctx): State<Arc<AppContext>>, body: Bytes) -> Json<BuildResponse> {
    let mut response = BuildResponse::default();

    match serde_json::from_slice::<BuildRequest>(&body) {
        Err(err) => {
            warn!(error = %err, "failed to parse build request");
            response.error = err.to_string();
        }
        Ok(request) => {
            if let Err(err) = ctx.agent.build(&request.uuid, &request.arguments).await {
                warn!(error = %err, "bundle submission refused");
                response.error = err.to_string();
            }
        }
    }

    Json(response)
}
