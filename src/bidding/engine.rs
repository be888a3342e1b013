use std::sync::Arc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bidding::request_builder::{get_currency, make_requests};
use crate::bidding::response_mapper::make_bids;
use crate::bidding::vendor_client::VendorClient;
use crate::config::ConfigManager;
use crate::logging::auction_log::{AuctionLog, VendorCallLog};
use crate::logging::runtime_logger::{LogLevel, RuntimeLogger};
use crate::model::adapters::TypedBid;
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::{Bid, BidResponse, SeatBid};

const SEAT: &str = "adgeneration";

/// 处理竞价请求：构造出站请求 → 并发调用 → 映射响应。
/// 没有任何 Bid 时返回 `None`。每次调用写入一条聚合日志。
pub async fn process_bid_request(
    bid_request: &BidRequest,
    config: &ConfigManager,
    client: &VendorClient,
    runtime_logger: &Arc<RuntimeLogger>,
) -> Option<BidResponse> {
    let (response, auction_log) = run_auction(bid_request, config, client).await;
    let level = if auction_log.status == "failure" { LogLevel::Error } else { LogLevel::Info };
    runtime_logger.log_json(level, &auction_log).await;
    response
}

/// 执行一次竞价，返回响应与聚合日志
async fn run_auction(
    bid_request: &BidRequest,
    config: &ConfigManager,
    client: &VendorClient,
) -> (Option<BidResponse>, AuctionLog) {
    let mut auction_log = AuctionLog::new(&bid_request.id, bid_request.imp.len());

    let (requests, errors) = make_requests(bid_request, config);
    for e in &errors {
        warn!(request_id = %bid_request.id, error = %e, "failed to build vendor requests");
        auction_log.add_error(e);
    }

    let timeout_ms = bid_request.tmax.unwrap_or(config.default_timeout_ms);
    let calls = client.execute(&requests, timeout_ms).await;

    let mut typed_bids: Vec<TypedBid> = Vec::new();
    for call in calls {
        let mapped = call.result.and_then(|response| make_bids(bid_request, &response));
        let (bid_count, result, failure_reason) = match mapped {
            Ok(Some(response)) => {
                let count = response.bids.len();
                typed_bids.extend(response.bids);
                (count, "success".to_string(), None)
            }
            Ok(None) => (0, "no_bid".to_string(), None),
            Err(e) => {
                warn!(request_id = %bid_request.id, uri = %call.uri, error = %e, "vendor call failed");
                (0, e.kind().to_string(), Some(e.to_string()))
            }
        };
        auction_log.add_vendor_call(VendorCallLog {
            uri: call.uri,
            elapsed_ms: call.elapsed_ms,
            bid_count,
            result,
            failure_reason,
        });
    }

    auction_log.finish(typed_bids.iter().map(|b| b.bid.price));
    info!(
        request_id = %bid_request.id,
        status = %auction_log.status,
        bid_count = auction_log.bid_count,
        "adg auction finished"
    );

    if typed_bids.is_empty() {
        return (None, auction_log);
    }

    let bids: Vec<Bid> = typed_bids
        .into_iter()
        .map(|typed| Bid {
            ext: Some(json!({ "prebid": { "type": typed.bid_type.as_str() } })),
            ..typed.bid
        })
        .collect();

    let response = BidResponse {
        id: bid_request.id.clone(),
        seatbid: vec![SeatBid {
            bid: bids,
            seat: Some(SEAT.to_string()),
        }],
        bidid: Some(Uuid::new_v4().to_string()),
        cur: Some(get_currency(bid_request, &config.default_currency)),
        nbr: None,
    };
    (Some(response), auction_log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use tokio::net::TcpListener;

    async fn spawn_vendor(body: &'static str, status: u16) -> String {
        let app = Router::new().route(
            "/adsv/v1",
            get(move || async move {
                (axum::http::StatusCode::from_u16(status).unwrap(), body)
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/adsv/v1", addr)
    }

    fn logger() -> Arc<RuntimeLogger> {
        let dir = std::env::temp_dir().join(format!("adg-engine-{}", Uuid::new_v4()));
        RuntimeLogger::new(&dir.to_string_lossy(), "runtime", 16, 100, 60_000)
    }

    fn bid_request() -> BidRequest {
        serde_json::from_str(
            r#"{"id":"r1","tmax":1000,"cur":["JPY"],"imp":[
                {"id":"imp-a","banner":{"format":[{"w":300,"h":250}]},"ext":{"bidder":{"id":"58278"}}}
            ]}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn banner_auction_end_to_end() {
        let endpoint = spawn_vendor(
            r#"{"locationid":"58278","results":[{"ad":"<body>AD</body>","beacon":"<img>","cpm":42.0,"creativeid":"cr","w":300,"h":250}]}"#,
            200,
        )
        .await;
        let config = ConfigManager::new(&endpoint);

        let response = process_bid_request(&bid_request(), &config, &VendorClient::new(), &logger())
            .await
            .unwrap();

        assert_eq!(response.id, "r1");
        assert_eq!(response.cur.as_deref(), Some("JPY"));
        assert!(response.bidid.is_some());
        let seat = &response.seatbid[0];
        assert_eq!(seat.seat.as_deref(), Some(SEAT));
        let bid = &seat.bid[0];
        assert_eq!(bid.impid, "imp-a");
        assert_eq!(bid.adm, "AD<img>");
        assert_eq!(bid.price, 42.0);
        assert_eq!(bid.ext, Some(json!({"prebid": {"type": "banner"}})));
    }

    #[tokio::test]
    async fn no_content_yields_no_response() {
        let endpoint = spawn_vendor("", 204).await;
        let config = ConfigManager::new(&endpoint);
        let response = process_bid_request(&bid_request(), &config, &VendorClient::new(), &logger()).await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn request_errors_skip_transport() {
        let config = ConfigManager::new("http://127.0.0.1:9/never-called");
        let request: BidRequest = serde_json::from_str(r#"{"id":"r2","imp":[]}"#).unwrap();
        let response = process_bid_request(&request, &config, &VendorClient::new(), &logger()).await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn slow_vendor_is_logged_as_timeout() {
        let app = Router::new().route(
            "/adsv/v1",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                r#"{"locationid":"58278","results":[{"ad":"late","cpm":1}]}"#
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let config = ConfigManager::new(&format!("http://{}/adsv/v1", addr));
        let mut request = bid_request();
        request.tmax = Some(50);

        let (response, log) = run_auction(&request, &config, &VendorClient::new()).await;

        assert!(response.is_none());
        assert_eq!(log.vendor_calls.len(), 1);
        assert_eq!(log.vendor_calls[0].result, "timeout");
        assert!(log.vendor_calls[0].failure_reason.as_deref().unwrap().contains("50ms"));
        assert_eq!(log.status, "failure");
    }

    #[tokio::test]
    async fn closed_port_is_logged_as_transport_error() {
        // 绑定后立即释放，得到一个无人监听的端口
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let config = ConfigManager::new(&format!("http://{}/adsv/v1", addr));

        let (response, log) = run_auction(&bid_request(), &config, &VendorClient::new()).await;

        assert!(response.is_none());
        assert_eq!(log.vendor_calls[0].result, "invalid_response");
        assert!(log.vendor_calls[0].failure_reason.is_some());
        assert_eq!(log.status, "failure");
    }

    #[tokio::test]
    async fn bad_status_is_logged_per_call() {
        let endpoint = spawn_vendor("", 500).await;
        let config = ConfigManager::new(&endpoint);

        let (response, log) = run_auction(&bid_request(), &config, &VendorClient::new()).await;

        assert!(response.is_none());
        assert_eq!(log.vendor_calls[0].result, "bad_server_response");
    }
}
