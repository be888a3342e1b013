use serde::{Serialize, Deserialize};
use chrono::Utc;

/// **单次竞价的聚合日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuctionLog {
    pub timestamp: String,
    pub log_type: String,            // 固定为 "adg_auction"
    pub request_id: String,          // OpenRTB `BidRequest.id`
    pub imp_count: usize,
    pub call_attempts: usize,        // 出站请求次数
    pub status: String,              // "success" / "no_bid" / "failure"
    pub bid_count: usize,
    pub best_price: f64,
    pub errors: Vec<String>,         // 请求构造阶段的错误
    pub vendor_calls: Vec<VendorCallLog>,
}

/// **单次出站调用日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VendorCallLog {
    pub uri: String,
    pub elapsed_ms: u128,
    pub bid_count: usize,
    pub result: String,              // "success", "no_bid" 或错误分类
    pub failure_reason: Option<String>,
}

impl AuctionLog {
    pub fn new(request_id: &str, imp_count: usize) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            log_type: "adg_auction".to_string(),
            request_id: request_id.to_string(),
            imp_count,
            call_attempts: 0,
            status: "failure".to_string(),  // 默认失败，后续可更新
            bid_count: 0,
            best_price: 0.0,
            errors: Vec::new(),
            vendor_calls: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: &crate::error::AdapterError) {
        self.errors.push(error.to_string());
    }

    pub fn add_vendor_call(&mut self, call: VendorCallLog) {
        self.bid_count += call.bid_count;
        self.vendor_calls.push(call);
        self.call_attempts += 1;
    }

    /// 根据汇总结果设置最终状态
    pub fn finish(&mut self, prices: impl IntoIterator<Item = f64>) {
        self.best_price = prices.into_iter().fold(0.0, f64::max);
        self.status = if self.bid_count > 0 {
            "success"
        } else if self.vendor_calls.iter().any(|c| c.failure_reason.is_none()) {
            "no_bid"
        } else {
            "failure"
        }
        .to_string();
    }
}
