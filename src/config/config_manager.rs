/// 适配器版本号，随请求上报给 Ad Generation
pub const ADAPTER_VERSION: &str = "0.0.1";
pub const DEFAULT_ENDPOINT: &str = "https://d.socdm.com/adsv/v1";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_SYNC_URL: &str =
    "https://tg.socdm.com/aux/idsync?proto=adgen&gdpr={{.GDPR}}&gdpr_consent={{.GDPRConsent}}";

#[derive(Clone, Debug)]
pub struct ConfigManager {
    pub endpoint: String,
    pub version: String,
    pub default_currency: String,
    pub sync_url: String,
    /// 未指定 tmax 时的出站请求超时（毫秒）
    pub default_timeout_ms: u64,
}

impl ConfigManager {
    pub fn new(endpoint: &str) -> Self {
        ConfigManager {
            endpoint: endpoint.to_string(),
            version: ADAPTER_VERSION.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            sync_url: DEFAULT_SYNC_URL.to_string(),
            default_timeout_ms: 250,
        }
    }

    pub fn from_args(endpoint: &str, currency: &str, sync_url: &str) -> Self {
        ConfigManager {
            default_currency: currency.to_string(),
            sync_url: sync_url.to_string(),
            ..ConfigManager::new(endpoint)
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        ConfigManager::new(DEFAULT_ENDPOINT)
    }
}
