// src/error.rs

use thiserror::Error;

/// **适配器错误类型**
///
/// 与宿主框架的错误列表约定一致：请求侧与响应侧都返回 `Vec<AdapterError>`，
/// 出错的批次不会产出部分 Bid。
#[derive(Debug, Error)]
pub enum AdapterError {
    /// 请求参数错误（例如缺少 imp、ext 无法解析、上游返回 400）
    #[error("bad input: {0}")]
    BadInput(String),

    /// 上游响应异常（非 200 状态码、响应中的 imp 无法匹配等）
    #[error("bad server response: {0}")]
    BadServerResponse(String),

    /// 原生广告素材缺失对应的数据
    #[error("malformed native asset {id}: missing {field}")]
    MalformedNative { id: u64, field: &'static str },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("vendor call timed out after {0}ms")]
    Timeout(u64),
}

impl AdapterError {
    /// 用于日志中的简短分类
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::BadInput(_) => "bad_input",
            AdapterError::BadServerResponse(_) => "bad_server_response",
            AdapterError::MalformedNative { .. } => "malformed_native",
            AdapterError::Json(_) => "json_parse_error",
            AdapterError::Transport(_) => "invalid_response",
            AdapterError::Timeout(_) => "timeout",
        }
    }
}
