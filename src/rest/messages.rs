// SPDX-License-Identifier: MIT
//! Request and response bodies of the client agent API.
//!
//! The field names here are the external contract and clients match on
//! them bit-for-bit: `endpoint_id`, `uuid`, `error`, `bundles`,
//! `arguments`. Success is signalled inside the body — an empty `error`
//! string — never through the HTTP status code; existing clients inspect
//! bodies only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bpv7::Bundle;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub endpoint_id: String,
}

#[derive(Debug, Default, Serialize)]
pub struct RegisterResponse {
    pub error: String,
    pub uuid: String,
}

#[derive(Debug, Deserialize)]
pub struct UnregisterRequest {
    pub uuid: String,
}

#[derive(Debug, Default, Serialize)]
pub struct UnregisterResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub uuid: String,
}

#[derive(Debug, Default, Serialize)]
pub struct FetchResponse {
    pub error: String,
    pub bundles: Vec<Bundle>,
}

#[derive(Debug, Deserialize)]
pub struct BuildRequest {
    pub uuid: String,
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Default, Serialize)]
pub struct BuildResponse {
    pub error: String,
}
