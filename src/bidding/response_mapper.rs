// src/bidding/response_mapper.rs

use tracing::debug;

use crate::bidding::markup::create_ad;
use crate::bidding::native::create_native_ad;
use crate::error::AdapterError;
use crate::model::adapters::{BidType, BidderResponse, ResponseData, TypedBid};
use crate::model::vendor::{VendorResponse, VendorResultItem};
use crate::openrtb::request::BidRequest;
use crate::openrtb::response::Bid;

/// 原生载荷存在且至少有一个素材时为 native，否则为 banner/video
pub fn is_native(item: &VendorResultItem) -> bool {
    item.native_ad.as_ref().is_some_and(|n| !n.assets.is_empty())
}

/// 按结果类型分派到对应的 adm 生成器
pub fn build_markup(item: &VendorResultItem, imp_id: &str) -> Result<(BidType, String), AdapterError> {
    if is_native(item) {
        Ok((BidType::Native, create_native_ad(item)?))
    } else {
        Ok((BidType::Banner, create_ad(item, imp_id)))
    }
}

/// **将 Ad Generation 的响应映射为带类型的 Bid 列表**
///
/// - 204：无竞价，无错误
/// - 400：BadInput；其它非 200：BadServerResponse
/// - 任一结果出错时整批失败，不返回部分 Bid
pub fn make_bids(internal_request: &BidRequest, response: &ResponseData) -> Result<Option<BidderResponse>, AdapterError> {
    match response.status_code {
        204 => return Ok(None),
        200 => {}
        400 => {
            return Err(AdapterError::BadInput(format!(
                "unexpected status code: {}. Run with request.debug = 1 for more info",
                response.status_code
            )))
        }
        code => {
            return Err(AdapterError::BadServerResponse(format!(
                "unexpected status code: {}. Run with request.debug = 1 for more info",
                code
            )))
        }
    }

    let vendor_response: VendorResponse = serde_json::from_slice(&response.body)?;
    if vendor_response.results.is_empty() {
        return Ok(None);
    }

    let imp_id = resolve_imp_id(internal_request, &vendor_response.locationid)?;

    let mut bidder_response = BidderResponse::with_capacity(vendor_response.results.len());
    for result in &vendor_response.results {
        let (bid_type, adm) = build_markup(result, &imp_id)?;
        debug!(
            request_id = %internal_request.id,
            locationid = %vendor_response.locationid,
            bid_type = bid_type.as_str(),
            cpm = result.cpm,
            "mapped vendor result"
        );
        bidder_response.bids.push(TypedBid {
            bid: Bid {
                id: vendor_response.locationid.clone(),
                impid: imp_id.clone(),
                adm,
                price: result.cpm,
                w: result.w,
                h: result.h,
                crid: result.creativeid.clone(),
                ext: None,
            },
            bid_type,
        });
    }
    Ok(Some(bidder_response))
}

/// 根据 locationid 找到对应 imp；多个匹配时取最后一个，没有匹配时为空字符串
fn resolve_imp_id(request: &BidRequest, locationid: &str) -> Result<String, AdapterError> {
    let mut imp_id = String::new();
    for imp in &request.imp {
        let ext = imp.get_bidder_ext().map_err(AdapterError::BadServerResponse)?;
        if ext.id == locationid {
            imp_id = imp.id.clone();
        }
    }
    Ok(imp_id)
}
