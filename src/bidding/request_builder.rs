// src/bidding/request_builder.rs

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use tracing::debug;

use crate::config::ConfigManager;
use crate::error::AdapterError;
use crate::model::adapters::RequestData;
use crate::openrtb::request::{BidRequest, Imp};

/// **为每个 imp 构造一个 GET 请求**
///
/// 任意 imp 的 bidder 参数无法解析时整个批次失败。
pub fn make_requests(request: &BidRequest, config: &ConfigManager) -> (Vec<RequestData>, Vec<AdapterError>) {
    if request.imp.is_empty() {
        return (
            Vec::new(),
            vec![AdapterError::BadInput("No impression in the bid request".to_string())],
        );
    }

    let mut requests = Vec::with_capacity(request.imp.len());
    for imp in &request.imp {
        let uri = match get_request_uri(request, imp, config) {
            Ok(uri) => uri,
            Err(e) => return (Vec::new(), vec![e]),
        };
        debug!(request_id = %request.id, imp_id = %imp.id, uri = %uri, "built vendor request");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=utf-8"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        requests.push(RequestData {
            method: Method::GET,
            uri,
            body: None,
            headers,
        });
    }
    (requests, Vec::new())
}

fn get_request_uri(request: &BidRequest, imp: &Imp, config: &ConfigManager) -> Result<String, AdapterError> {
    let ext = imp.get_bidder_ext().map_err(AdapterError::BadInput)?;

    let mut params: Vec<(&str, String)> = vec![
        ("posall", "SSPLOC".to_string()),
        ("id", ext.id.clone()),
        ("sdktype", "0".to_string()),
        ("hb", "true".to_string()),
        ("t", "json3".to_string()),
        ("sizes", get_sizes(imp)),
        ("currency", get_currency(request, &config.default_currency)),
        ("sdkname", "prebidserver".to_string()),
        ("tp", request.site_page().to_string()),
        ("adapterver", config.version.clone()),
    ];
    if imp.native.is_none() {
        params.push(("imark", "1".to_string()));
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Ok(format!("{}?{}", config.endpoint, query))
}

/// banner 尺寸列表，形如 `300×250,320×50`
pub fn get_sizes(imp: &Imp) -> String {
    imp.banner_formats()
        .iter()
        .map(|f| format!("{}×{}", f.w, f.h))
        .collect::<Vec<_>>()
        .join(",")
}

/// 请求未指定币种时使用默认币种；默认币种在列表中时优先；否则取第一个
pub fn get_currency(request: &BidRequest, default_currency: &str) -> String {
    match request.cur.as_deref() {
        None | Some([]) => default_currency.to_string(),
        Some(currencies) => currencies
            .iter()
            .find(|c| c.as_str() == default_currency)
            .unwrap_or(&currencies[0])
            .clone(),
    }
}
