use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use rand::Rng;

/// Ad Generation 出站请求中 mock 关心的参数
#[derive(Deserialize, Debug)]
struct AdgQuery {
    id: String,
    sizes: Option<String>,
    imark: Option<String>,
}

/// 模拟 Ad Generation 的 `json3` 响应
/// 带 `imark` 的请求返回 banner HTML（含 body 包装和 beacon），否则返回原生素材。
async fn handle_adsv(Query(query): Query<AdgQuery>) -> Json<Value> {
    info!(
        "Mock vendor received request: id={}, sizes={:?}, imark={:?}",
        query.id, query.sizes, query.imark
    );

    // 模拟处理延迟（10 ~ 50 毫秒）
    let (delay_ms, cpm) = {
        let mut rng = rand::thread_rng();
        (rng.gen_range(10..50), rng.gen_range(10.0..100.0_f64))
    };
    sleep(Duration::from_millis(delay_ms)).await;

    let beaconurl = format!("https://mock-adg.local/beacon?loc={}", query.id);
    let result = if query.imark.is_some() {
        json!({
            "ad": format!("<!DOCTYPE html><html><head></head><body><div class=\"adg\">Mock Ad {}</div></body></html>", query.id),
            "beacon": format!("<img src=\"{}\" width=\"1\" height=\"1\" style=\"display:none;\">", beaconurl),
            "beaconurl": beaconurl,
            "cpm": cpm,
            "creativeid": "Mock_creative",
            "h": 250,
            "w": 300,
            "ttl": 1000,
            "landing_url": "https://mock-adg.local/landing",
            "scheduleid": "512603",
            "trackers": {"imp": [], "viewable_imp": [], "viewable_measured": []}
        })
    } else {
        json!({
            "ad": "",
            "beacon": "",
            "beaconurl": beaconurl,
            "cpm": cpm,
            "creativeid": "Mock_native",
            "h": 1,
            "w": 1,
            "ttl": 1000,
            "native_ad": {
                "assets": [
                    {"id": 1, "title": {"text": "Mock Native Ad"}},
                    {"id": 2, "img": {"url": "https://mock-adg.local/main.jpg", "w": 1200, "h": 628}},
                    {"id": 3, "img": {"url": "https://mock-adg.local/icon.jpg", "w": 300, "h": 300}},
                    {"id": 4, "data": {"label": "accompanying_text", "value": "Mock Sponsor"}},
                    {"id": 5, "data": {"label": "description", "value": "Mock body text"}},
                    {"id": 6, "data": {"label": "cta", "value": "Learn more"}},
                    {"id": 502, "data": {"label": "", "value": "https://mock-adg.local/privacy"}}
                ],
                "imptrackers": ["https://mock-adg.local/imp"],
                "link": {"clicktrackers": ["https://mock-adg.local/click"], "url": "https://mock-adg.local/landing"}
            },
            "landing_url": "https://mock-adg.local/landing",
            "scheduleid": "512604",
            "trackers": {"imp": [], "viewable_imp": [], "viewable_measured": []}
        })
    };

    Json(json!({ "locationid": query.id, "results": [result] }))
}

/// 启动 Mock Ad Generation 服务，路由为 `/adsv/v1`
pub async fn start_mock_vendor_server(port: u16) {
    let app = Router::new().route("/adsv/v1", get(handle_adsv));

    let addr = format!("0.0.0.0:{}", port);
    info!("Mock vendor running at http://{}", addr);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Mock vendor failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Mock vendor stopped: {}", e);
    }
}
