// src/model/vendor.rs

use serde::{Deserialize, Deserializer, Serialize};

/// 显式的 `null` 与缺省字段一样按零值处理（上游会把空列表编码为 `null`）
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// **Ad Generation 服务端响应**
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct VendorResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub locationid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<VendorResultItem>,
}

/// 单条竞价结果，解析后只读，由 ResponseMapper 消费一次
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct VendorResultItem {
    #[serde(deserialize_with = "null_as_default")]
    pub ad: String,              // 原始广告 HTML
    #[serde(deserialize_with = "null_as_default")]
    pub beacon: String,          // 曝光 beacon 片段（HTML）
    #[serde(deserialize_with = "null_as_default")]
    pub beaconurl: String,       // 曝光 beacon URL
    #[serde(deserialize_with = "null_as_default")]
    pub cpm: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub creativeid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub h: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub w: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub ttl: u64,
    pub vastxml: Option<String>,
    pub native_ad: Option<NativeAd>,
    #[serde(deserialize_with = "null_as_default")]
    pub landing_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scheduleid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub trackers: Trackers,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Trackers {
    #[serde(deserialize_with = "null_as_default")]
    pub imp: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub viewable_imp: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub viewable_measured: Vec<String>,
}

/// 原生广告载荷
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NativeAd {
    #[serde(deserialize_with = "null_as_default")]
    pub assets: Vec<NativeAsset>,
    #[serde(deserialize_with = "null_as_default")]
    pub imptrackers: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub link: NativeLink,
    #[serde(deserialize_with = "null_as_default")]
    pub jstracker: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NativeLink {
    #[serde(deserialize_with = "null_as_default")]
    pub clicktrackers: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// 按位置 ID 区分类型的原生素材，`id` 是唯一的类型判别字段
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NativeAsset {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
    pub title: Option<AssetTitle>,
    pub img: Option<AssetImage>,
    pub data: Option<AssetData>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AssetTitle {
    #[serde(alias = "title", deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AssetImage {
    #[serde(deserialize_with = "null_as_default")]
    pub h: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub w: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AssetData {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

impl VendorResultItem {
    /// 非空的 VAST XML
    pub fn vast(&self) -> Option<&str> {
        self.vastxml.as_deref().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_vendor_response() {
        let body = r#"{
            "locationid": "58278",
            "results": [{
                "ad": "<body>ad</body>",
                "beacon": "<img src=\"b\">",
                "beaconurl": "https://b",
                "cpm": 50.5,
                "creativeid": "Dummy_supership.jp",
                "h": 250, "w": 300, "ttl": 1000,
                "landing_url": "https://l",
                "scheduleid": "512603",
                "trackers": {"imp": ["i"], "viewable_imp": [], "viewable_measured": []}
            }]
        }"#;
        let resp: VendorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.locationid, "58278");
        let item = &resp.results[0];
        assert_eq!(item.cpm, 50.5);
        assert_eq!((item.w, item.h), (300, 250));
        assert!(item.native_ad.is_none());
        assert!(item.vast().is_none());
        assert_eq!(item.trackers.imp, vec!["i".to_string()]);
    }

    #[test]
    fn title_accepts_legacy_key() {
        let asset: NativeAsset =
            serde_json::from_str(r#"{"id":1,"title":{"title":"legacy"}}"#).unwrap();
        assert_eq!(asset.title.unwrap().text, "legacy");
    }

    #[test]
    fn null_fields_decode_as_zero_values() {
        let body = r#"{
            "locationid": null,
            "results": [{
                "ad": "<body>AD</body>", "beacon": null, "beaconurl": null, "cpm": 1,
                "creativeid": null, "h": null, "trackers": null,
                "native_ad": {
                    "assets": [{"id": 4, "required": null, "data": {"label": null, "value": "s"}}],
                    "imptrackers": null,
                    "link": {"clicktrackers": null, "url": null},
                    "jstracker": null
                }
            }]
        }"#;
        let resp: VendorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.locationid, "");
        let item = &resp.results[0];
        assert_eq!(item.beacon, "");
        assert_eq!(item.h, 0);
        assert!(item.trackers.imp.is_empty());
        let native = item.native_ad.as_ref().unwrap();
        assert!(native.imptrackers.is_empty());
        assert!(native.link.clicktrackers.is_empty());
        assert_eq!(native.assets[0].data.as_ref().unwrap().value, "s");
    }

    #[test]
    fn null_results_mean_no_results() {
        let resp: VendorResponse = serde_json::from_str(r#"{"locationid":"1","results":null}"#).unwrap();
        assert!(resp.results.is_empty());
    }

    #[test]
    fn empty_vast_is_treated_as_absent() {
        let item = VendorResultItem {
            vastxml: Some(String::new()),
            ..Default::default()
        };
        assert!(item.vast().is_none());
    }
}
