// src/model/native.rs

use serde::{Serialize, Deserialize};

/// **归一化后的原生广告**，序列化后作为 adm 字符串返回
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedNativeAd {
    pub title: String,
    pub image: NativeImage,
    pub icon: NativeImage,
    pub sponsored_by: String,
    pub body: String,
    #[serde(rename = "cta")]
    pub call_to_action: String,
    pub privacy_link: String,
    pub click_url: String,
    pub click_trackers: Vec<String>,
    pub impression_trackers: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeImage {
    pub width: u64,
    pub height: u64,
    pub url: String,
}
