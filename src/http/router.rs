//! Request validation and routing.
//!
//! # Responsibilities
//! - Map (path, body) to a typed response for read-style requests
//! - Validate request bodies that claim to carry JSON
//! - Never fail: internal faults map to a 500-class response
//!
//! Method filtering happens before dispatch — the connection rejects
//! non-GET/HEAD requests itself, so the router only ever sees read-style
//! requests.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::{json, Map, Value};

use crate::http::request::Request;
use crate::http::response::Response;
use crate::routes::table::RouteTable;

/// Paths answered with the routing-table payload.
const ROUTES_PATHS: &[&str] = &["/", "/routes"];

/// Dispatches validated requests against the latest published snapshot.
pub struct RequestRouter {
    table: Arc<ArcSwap<RouteTable>>,
}

impl RequestRouter {
    pub fn new(table: Arc<ArcSwap<RouteTable>>) -> Self {
        Self { table }
    }

    /// Produce the response for a read-style request. Infallible by
    /// contract; anything unexpected becomes a 500.
    pub fn dispatch(&self, request: &Request) -> Response {
        let keep_alive = request.keep_alive();

        // A request body, when present, must at least be valid JSON.
        if !request.body.is_empty() && serde_json::from_str::<Value>(&request.body).is_err() {
            return Response::bad_request("bad request", keep_alive);
        }

        let path = request.target.split('?').next().unwrap_or(&request.target);
        if !ROUTES_PATHS.contains(&path) {
            return Response::not_found("invalid path", keep_alive);
        }

        match self.routes_payload() {
            Ok(payload) => Response::ok_json(payload, keep_alive),
            Err(error) => {
                tracing::error!(%error, "failed to serialize routing table");
                Response::internal_error(keep_alive)
            }
        }
    }

    /// JSON object mapping synthetic keys to route objects:
    /// `{"entry_0": {"destination": ..., "mask": ..., "gateway": ...,
    /// "interface": ..., "metric": ...}, ...}`.
    fn routes_payload(&self) -> Result<String, serde_json::Error> {
        let table = self.table.load();
        let mut payload = Map::new();

        for (index, entry) in table.entries().iter().enumerate() {
            payload.insert(
                format!("entry_{index}"),
                json!({
                    "destination": entry.key.destination,
                    "mask": entry.key.mask,
                    "gateway": entry.gateway,
                    "interface": entry.key.interface_index,
                    "metric": entry.metric,
                }),
            );
        }

        serde_json::to_string(&Value::Object(payload))
    }
}
