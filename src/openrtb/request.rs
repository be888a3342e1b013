use serde::{Serialize, Deserialize};
use once_cell::sync::OnceCell;
use simd_json::OwnedValue;

/// OpenRTB BidRequest 结构体（统一竞价请求）。
/// 只保留适配器用到的字段，其余对象原样以 OwnedValue 透传。
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BidRequest {
    pub id: String,

    /// 广告展示请求列表
    #[serde(default)]
    pub imp: Vec<Imp>,

    /// 网站信息
    pub site: Option<Site>,

    /// 应用、设备、用户信息，适配器不解析
    pub app: Option<Box<OwnedValue>>,
    pub device: Option<Box<OwnedValue>>,
    pub user: Option<Box<OwnedValue>>,

    pub test: Option<i32>,
    pub tmax: Option<u64>,
    pub cur: Option<Vec<String>>,
}

/// 单个广告展示请求
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Imp {
    pub id: String,
    pub bidfloor: Option<f64>,
    pub banner: Option<Banner>,
    pub video: Option<Box<OwnedValue>>,
    pub native: Option<Native>,

    /// ext 延迟解析：原始 JSON 存为 OwnedValue，首次访问时解析为 bidder 参数并缓存
    pub ext: Option<Box<OwnedValue>>,
    #[serde(skip)]
    pub bidder_ext: OnceCell<ExtImpAdgeneration>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Banner {
    #[serde(default)]
    pub format: Vec<Format>,
    pub w: Option<u64>,
    pub h: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub w: u64,
    pub h: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Native {
    pub request: String,
    pub ver: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Site {
    pub id: Option<String>,
    pub domain: Option<String>,
    pub page: Option<String>,
}

/// `imp.ext` 的外层结构：`{"bidder": {...}}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExtImpBidder {
    pub bidder: ExtImpAdgeneration,
}

/// Ad Generation 的 bidder 参数
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExtImpAdgeneration {
    /// 广告位 ID（对应响应中的 locationid）
    pub id: String,
}

impl Imp {
    /// 获取 bidder 参数，解析失败时返回错误信息
    pub fn get_bidder_ext(&self) -> Result<&ExtImpAdgeneration, String> {
        self.bidder_ext.get_or_try_init(|| {
            let raw = self
                .ext
                .as_ref()
                .ok_or_else(|| format!("imp {} has no ext", self.id))?;
            let s = serde_json::to_string(&**raw).map_err(|e| e.to_string())?;
            let ext: ExtImpBidder = serde_json::from_str(&s).map_err(|e| e.to_string())?;
            Ok(ext.bidder)
        })
    }

    pub fn banner_formats(&self) -> &[Format] {
        self.banner.as_ref().map(|b| b.format.as_slice()).unwrap_or(&[])
    }
}

impl BidRequest {
    pub fn site_page(&self) -> &str {
        self.site
            .as_ref()
            .and_then(|s| s.page.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidder_ext_is_parsed_and_cached() {
        let request: BidRequest = serde_json::from_str(
            r#"{"id":"r1","imp":[{"id":"imp-1","ext":{"bidder":{"id":"58278"}}}]}"#,
        )
        .unwrap();
        let imp = &request.imp[0];
        assert_eq!(imp.get_bidder_ext().unwrap().id, "58278");
        assert!(imp.bidder_ext.get().is_some());
    }

    #[test]
    fn bidder_ext_reports_bad_shape() {
        let request: BidRequest = serde_json::from_str(
            r#"{"id":"r1","imp":[{"id":"imp-1","ext":{"_bidder":{"id":"58278"}}}]}"#,
        )
        .unwrap();
        assert!(request.imp[0].get_bidder_ext().is_err());
    }

    #[test]
    fn missing_ext_is_an_error() {
        let request: BidRequest =
            serde_json::from_str(r#"{"id":"r1","imp":[{"id":"imp-1"}]}"#).unwrap();
        assert!(request.imp[0].get_bidder_ext().unwrap_err().contains("imp-1"));
    }

    #[test]
    fn site_page_defaults_to_empty() {
        let request: BidRequest = serde_json::from_str(r#"{"id":"r1"}"#).unwrap();
        assert_eq!(request.site_page(), "");
        assert!(request.imp.is_empty());
    }
}
