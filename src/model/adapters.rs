// src/model/adapters.rs

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Serialize, Deserialize};

use crate::openrtb::response::Bid;

/// 宿主框架识别的广告类型标签
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum BidType {
    Native,
    Banner,
}

impl TryFrom<String> for BidType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "native" => Ok(BidType::Native),
            "banner" => Ok(BidType::Banner),
            _ => Err(format!("Invalid value for BidType: {}", value)),
        }
    }
}

impl From<BidType> for String {
    fn from(bid_type: BidType) -> Self {
        bid_type.as_str().to_string()
    }
}

impl BidType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidType::Native => "native",
            BidType::Banner => "banner",
        }
    }
}

/// 一次发往 Ad Generation 的出站请求
#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: Method,
    pub uri: String,
    pub body: Option<Vec<u8>>,
    pub headers: HeaderMap,
}

/// 出站请求的原始响应
#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status_code: u16,
    pub body: Vec<u8>,
}

/// 带类型标签的 Bid
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TypedBid {
    pub bid: Bid,
    pub bid_type: BidType,
}

/// 单个出站响应映射后的结果
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BidderResponse {
    pub bids: Vec<TypedBid>,
}

impl BidderResponse {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bids: Vec::with_capacity(capacity),
        }
    }
}
