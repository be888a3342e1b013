// src/bidding/usersync.rs

use serde::{Deserialize, Serialize};

const GDPR_PLACEHOLDER: &str = "{{.GDPR}}";
const GDPR_CONSENT_PLACEHOLDER: &str = "{{.GDPRConsent}}";

/// 用户同步时携带的隐私信号
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Policies {
    pub gdpr: Option<String>,
    pub gdpr_consent: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsersyncInfo {
    pub url: String,
    #[serde(rename = "type")]
    pub sync_type: String,
    pub support_cors: bool,
}

/// **重定向方式的用户同步**
#[derive(Debug, Clone)]
pub struct AdgenerationSyncer {
    url_template: String,
}

impl AdgenerationSyncer {
    pub fn new(url_template: &str) -> Self {
        Self {
            url_template: url_template.to_string(),
        }
    }

    pub fn usersync_info(&self, policies: &Policies) -> UsersyncInfo {
        let gdpr = policies.gdpr.as_deref().unwrap_or("");
        let consent = policies.gdpr_consent.as_deref().unwrap_or("");
        let url = self
            .url_template
            .replace(GDPR_PLACEHOLDER, &urlencoding::encode(gdpr))
            .replace(GDPR_CONSENT_PLACEHOLDER, &urlencoding::encode(consent));
        UsersyncInfo {
            url,
            sync_type: "redirect".to_string(),
            support_cors: false,
        }
    }

    /// 未注册 GDPR vendor，固定为 0
    pub fn gdpr_vendor_id(&self) -> u16 {
        0
    }
}
