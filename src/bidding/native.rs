// src/bidding/native.rs

use crate::error::AdapterError;
use crate::model::native::{NativeImage, NormalizedNativeAd};
use crate::model::vendor::{AssetImage, NativeAd, NativeAsset, VendorResultItem};

/// 原生素材的位置 ID，位置即类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSlot {
    Title,
    MainImage,
    Icon,
    Sponsor,
    Body,
    CallToAction,
    PrivacyLink,
    /// 未识别的 ID 直接忽略，保持向前兼容
    Unknown(u64),
}

impl From<u64> for AssetSlot {
    fn from(id: u64) -> Self {
        match id {
            1 => AssetSlot::Title,
            2 => AssetSlot::MainImage,
            3 => AssetSlot::Icon,
            4 => AssetSlot::Sponsor,
            5 => AssetSlot::Body,
            6 => AssetSlot::CallToAction,
            502 => AssetSlot::PrivacyLink,
            other => AssetSlot::Unknown(other),
        }
    }
}

/// **生成原生广告 adm（JSON 字符串）**
pub fn create_native_ad(item: &VendorResultItem) -> Result<String, AdapterError> {
    let native = match item.native_ad.as_ref() {
        Some(payload) => map_native_ad(payload, &item.beaconurl)?,
        None => NormalizedNativeAd::default(),
    };
    Ok(serde_json::to_string(&native)?)
}

/// 将按位置排列的素材列表解码为归一化的原生广告。
///
/// 素材按输入顺序处理一次，同一 ID 出现多次时以最后一个为准（LastWins）。
/// 曝光追踪列表 = 原生载荷的 imptrackers + 非空的顶层 beaconurl（始终在最后）。
pub fn map_native_ad(payload: &NativeAd, beaconurl: &str) -> Result<NormalizedNativeAd, AdapterError> {
    let mut native = NormalizedNativeAd::default();
    for asset in &payload.assets {
        apply_asset_last_wins(&mut native, asset)?;
    }

    native.click_url = payload.link.url.clone();
    native.click_trackers = payload.link.clicktrackers.clone();
    native.impression_trackers = payload.imptrackers.clone();
    if !beaconurl.is_empty() {
        native.impression_trackers.push(beaconurl.to_string());
    }
    Ok(native)
}

/// 覆盖写入对应字段，不检查是否已写过
fn apply_asset_last_wins(native: &mut NormalizedNativeAd, asset: &NativeAsset) -> Result<(), AdapterError> {
    let slot = AssetSlot::from(asset.id);
    match slot {
        AssetSlot::Title => {
            let title = asset.title.as_ref().ok_or(AdapterError::MalformedNative {
                id: asset.id,
                field: "title",
            })?;
            native.title = title.text.clone();
        }
        AssetSlot::MainImage => native.image = image_of(asset)?,
        AssetSlot::Icon => native.icon = image_of(asset)?,
        AssetSlot::Sponsor => native.sponsored_by = data_value(asset)?.to_string(),
        AssetSlot::Body => native.body = data_value(asset)?.to_string(),
        AssetSlot::CallToAction => native.call_to_action = data_value(asset)?.to_string(),
        AssetSlot::PrivacyLink => native.privacy_link = path_escape(data_value(asset)?),
        AssetSlot::Unknown(_) => {}
    }
    Ok(())
}

fn image_of(asset: &NativeAsset) -> Result<NativeImage, AdapterError> {
    let AssetImage { h, w, url } = asset.img.as_ref().ok_or(AdapterError::MalformedNative {
        id: asset.id,
        field: "img",
    })?;
    Ok(NativeImage {
        width: *w,
        height: *h,
        url: url.clone(),
    })
}

fn data_value(asset: &NativeAsset) -> Result<&str, AdapterError> {
    asset
        .data
        .as_ref()
        .map(|d| d.value.as_str())
        .ok_or(AdapterError::MalformedNative {
            id: asset.id,
            field: "data",
        })
}

/// 按 URL path segment 规则转义：保留非保留字符与 `$&+:=@`，其余做百分号编码
pub fn path_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        match c {
            '$' | '&' | '+' | ':' | '=' | '@' => escaped.push(c),
            _ => escaped.push_str(&urlencoding::encode(c.encode_utf8(&mut buf))),
        }
    }
    escaped
}
