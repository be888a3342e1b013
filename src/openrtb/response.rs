use serde::{Deserialize, Serialize};

/// OpenRTB Bid Response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BidResponse {
    pub id: String,
    pub seatbid: Vec<SeatBid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cur: Option<String>,
    /// 无填充原因（No-Bid Reason）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbr: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SeatBid {
    pub bid: Vec<Bid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bid {
    pub id: String,
    pub impid: String,
    pub price: f64,
    pub adm: String, // Ad markup (HTML or native JSON)
    pub crid: String,
    pub w: u64,
    pub h: u64,
    /// 广告类型："banner" 或 "native"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<serde_json::Value>,
}

impl BidResponse {
    /// 无广告可填充时返回的空响应，`cur` 为本次请求解析出的币种
    pub fn no_fill(id: &str, cur: &str) -> Self {
        Self {
            id: id.to_string(),
            seatbid: vec![],
            bidid: None,
            cur: Some(cur.to_string()),
            nbr: Some(3), // `3` 表示 "无匹配广告（未填充）"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_fill_carries_currency_and_reason() {
        let json = serde_json::to_value(BidResponse::no_fill("r1", "JPY")).unwrap();
        assert_eq!(json, serde_json::json!({"id": "r1", "seatbid": [], "cur": "JPY", "nbr": 3}));
    }
}
