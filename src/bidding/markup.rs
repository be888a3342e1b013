// src/bidding/markup.rs

use crate::model::vendor::VendorResultItem;

/// 视频广告播放器脚本（固定版本）
pub const APV_SCRIPT_URL: &str = "https://cdn.apvdr.com/js/VideoAd.min.js";

const BODY_OPEN: &str = "<body>";
const BODY_CLOSE: &str = "</body>";

/// **生成 banner/video 的最终 adm**
///
/// 步骤顺序固定：
/// 1. 以 `ad` 为基础；存在非空 VAST 时丢弃 `ad`，改为播放器片段
/// 2. 在 `</body>` 之前插入 beacon；没有 `</body>` 时 beacon 被丢弃
/// 3. 同时存在 `<body>` 与 `</body>` 时去掉外层 body，只返回内部内容
///
/// 第 3 步不是幂等的，每条结果只能调用一次。
pub fn create_ad(item: &VendorResultItem, imp_id: &str) -> String {
    let ad = match item.vast() {
        Some(vast) => format!(
            "{}<div id=\"apvad-{}\"></div>{}{}{}",
            BODY_OPEN,
            html_attr_escape(imp_id),
            apv_tag(),
            insert_vast_method(imp_id, vast),
            BODY_CLOSE
        ),
        None => item.ad.clone(),
    };
    let ad = append_child_to_body(&ad, &item.beacon);
    match remove_wrapper(&ad) {
        Some(inner) => inner.to_string(),
        None => ad,
    }
}

fn apv_tag() -> String {
    format!(
        "<script type=\"text/javascript\" id=\"apv\" src=\"{}\"></script>",
        APV_SCRIPT_URL
    )
}

/// 生成加载 VAST 的脚本。
/// VAST 先移除 CR/LF，再按单引号 JS 字符串转义；impression id 按双引号 JS 字符串转义。
fn insert_vast_method(imp_id: &str, vast: &str) -> String {
    let vast: String = vast.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    format!(
        "<script type=\"text/javascript\"> (function(){{ new APV.VideoAd({{s:\"{}\"}}).load('{}'); }})(); </script>",
        js_string_escape(imp_id, '"'),
        js_string_escape(&vast, '\'')
    )
}

/// 转义反斜杠和引号；`</` 写成 `<\/`，避免提前结束 script 元素
fn js_string_escape(value: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut prev = None;
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            c if c == quote => {
                escaped.push('\\');
                escaped.push(c);
            }
            '/' if prev == Some('<') => escaped.push_str("\\/"),
            c => escaped.push(c),
        }
        prev = Some(c);
    }
    escaped
}

fn html_attr_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 在最后一个 `</body>` 之前插入片段；找不到时原样返回。
/// 多个 `</body>` 时只在最后一个（剥离后保留的那个）之前插入一次，不会在每个闭合标签前都插入。
pub fn append_child_to_body(ad: &str, fragment: &str) -> String {
    if let Some(pos) = ad.rfind(BODY_CLOSE) {
        let (head, tail) = ad.split_at(pos);
        format!("{}{}{}", head, fragment, tail)
    } else {
        ad.to_string()
    }
}

/// 取第一个 `<body>` 与最后一个 `</body>` 之间的内容。
/// 只做字面量匹配（区分大小写，不支持属性）；任一标签缺失时返回 `None`。
pub fn remove_wrapper(ad: &str) -> Option<&str> {
    let start = ad.find(BODY_OPEN)? + BODY_OPEN.len();
    let end = ad.rfind(BODY_CLOSE)?;
    if end < start {
        return None;
    }
    Some(&ad[start..end])
}
