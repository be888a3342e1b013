// src/bidding/vendor_client.rs

use std::time::Instant;
use futures::future::join_all;
use reqwest::Client;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::error::AdapterError;
use crate::model::adapters::{RequestData, ResponseData};

/// 单次出站调用的结果
#[derive(Debug)]
pub struct VendorCall {
    pub uri: String,
    pub elapsed_ms: u128,
    pub result: Result<ResponseData, AdapterError>,
}

#[derive(Clone, Default)]
pub struct VendorClient {
    client: Client,
}

impl VendorClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// 并发执行出站请求，返回顺序与输入一致
    pub async fn execute(&self, requests: &[RequestData], timeout_ms: u64) -> Vec<VendorCall> {
        let tasks: Vec<_> = requests
            .iter()
            .cloned()
            .map(|request| {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let uri = request.uri.clone();
                    let start = Instant::now();
                    let result = match timeout(Duration::from_millis(timeout_ms), send(&client, request)).await {
                        Ok(result) => result,
                        Err(_) => Err(AdapterError::Timeout(timeout_ms)),
                    };
                    let elapsed_ms = start.elapsed().as_millis();
                    debug!(uri = %uri, elapsed_ms = elapsed_ms as u64, ok = result.is_ok(), "vendor call finished");
                    VendorCall { uri, elapsed_ms, result }
                })
            })
            .collect();

        join_all(tasks)
            .await
            .into_iter()
            .zip(requests)
            .map(|(joined, request)| {
                joined.unwrap_or_else(|e| VendorCall {
                    uri: request.uri.clone(),
                    elapsed_ms: 0,
                    result: Err(AdapterError::BadServerResponse(format!("vendor task failed: {}", e))),
                })
            })
            .collect()
    }
}

async fn send(client: &Client, request: RequestData) -> Result<ResponseData, AdapterError> {
    let RequestData { method, uri, body, headers } = request;
    let mut builder = client.request(method, &uri).headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }
    let response = builder.send().await?;
    let status_code = response.status().as_u16();
    let body = response.bytes().await?.to_vec();
    Ok(ResponseData { status_code, body })
}
