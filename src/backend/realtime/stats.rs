//! Connection count introspection endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::realtime::dispatcher::Dispatcher;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeStatsResponse {
    pub total_connections: usize,
    /// Present only when a `roomId` was asked for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_connections: Option<usize>,
}

/// GET /api/v1/realtime/stats
pub async fn realtime_stats(
    State(dispatcher): State<Dispatcher>,
    Query(query): Query<StatsQuery>,
) -> Json<RealtimeStatsResponse> {
    Json(RealtimeStatsResponse {
        total_connections: dispatcher.total_connections(),
        room_connections: query
            .room_id
            .as_deref()
            .map(|room_id| dispatcher.room_connection_count(room_id)),
    })
}
