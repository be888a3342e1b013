use axum::{extract::{Query, State}, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

use crate::bidding::engine::process_bid_request;
use crate::bidding::request_builder::get_currency;
use crate::bidding::usersync::{Policies, UsersyncInfo};
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::BidResponse;
use crate::AppState;

/// **处理 OpenRTB 竞价请求**
pub async fn handle_openrtb_request(
    State(state): State<Arc<AppState>>,
    Json(bid_request): Json<BidRequest>,
) -> (StatusCode, Json<BidResponse>) {
    let bid_response = process_bid_request(
        &bid_request,
        &state.config,
        &state.client,
        &state.runtime_logger,
    ).await;

    match bid_response {
        Some(response) => {
            info!(request_id = %response.id, "adg_inquiry_success");
            (StatusCode::OK, Json(response))
        }
        None => {
            // **204 - 无广告可填充**
            info!(request_id = %bid_request.id, "adg_inquiry_no_fill");
            let cur = get_currency(&bid_request, &state.config.default_currency);
            (StatusCode::NO_CONTENT, Json(BidResponse::no_fill(&bid_request.id, &cur)))
        }
    }
}

/// **返回用户同步信息**
pub async fn handle_usersync(
    State(state): State<Arc<AppState>>,
    Query(policies): Query<Policies>,
) -> Json<UsersyncInfo> {
    Json(state.syncer.usersync_info(&policies))
}
