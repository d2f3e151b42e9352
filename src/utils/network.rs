use crate::utils::error::ProviderError;
use crate::utils::models::{ GeoResult, Scope };
use crate::utils::resolve::AliasTable;

use log::{ debug, info, warn };
use reqwest::Client;
use std::time::Duration;

pub const BAIDU_QIFU_ENDPOINT: &str = "https://qifu-api.baidubce.com/ip/local/geo/v1/district";
pub const IP_SB_ENDPOINT: &str = "https://api.ip.sb/geoip";
pub const IPAPI_ENDPOINT: &str = "https://ipapi.co/json/";
pub const GEOJS_ENDPOINT: &str = "https://get.geojs.io/v1/ip/geo.json";

// 百度奇富查的是本机：不带 ip 参数，响应可能包在 data 里，也可能是平铺的
const BAIDU_QIFU: AliasTable = AliasTable {
    ip: &["data.ip", "ip"],
    version: &[],
    country: &["data.country", "country"],
    region: &["data.prov", "data.province", "prov", "province"],
    city: &["data.city", "city"],
    isp: &["data.isp", "data.owner", "isp", "owner"],
    asn: &["data.asnumber", "asnumber"],
    asn_org: &[],
    timezone: &["data.timezone", "timezone"],
    country_default: "中国",
    timezone_default: "UTC+8",
};

const IP_SB: AliasTable = AliasTable {
    ip: &["ip", "query"],
    version: &["version"],
    country: &["country", "country_code"],
    region: &["region", "region_code"],
    city: &["city"],
    isp: &["organization", "isp", "asn_organization"],
    asn: &["asn"],
    asn_org: &["asn_organization"],
    timezone: &["timezone"],
    country_default: "",
    timezone_default: "",
};

const IPAPI: AliasTable = AliasTable {
    ip: &["ip"],
    version: &["version"],
    country: &["country_name", "country"],
    region: &["region"],
    city: &["city"],
    isp: &["org"],
    asn: &["asn"],
    asn_org: &[],
    timezone: &["timezone"],
    country_default: "",
    timezone_default: "",
};

const GEOJS: AliasTable = AliasTable {
    ip: &["ip", "address"],
    version: &[],
    country: &["country"],
    region: &["region", "region_name"],
    city: &["city"],
    isp: &["organization", "org"],
    asn: &["asn"],
    asn_org: &[],
    timezone: &["timezone", "time_zone"],
    country_default: "",
    timezone_default: "",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    BaiduQifu,
    IpSb,
    IpApi,
    GeoJs,
}

impl Adapter {
    pub fn aliases(&self) -> &'static AliasTable {
        match self {
            Adapter::BaiduQifu => &BAIDU_QIFU,
            Adapter::IpSb => &IP_SB,
            Adapter::IpApi => &IPAPI,
            Adapter::GeoJs => &GEOJS,
        }
    }
}

/// 一个地理位置 provider 的静态配置
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub id: String,
    pub name: String,
    pub scope: Scope,
    pub endpoint: String,
    pub adapter: Adapter,
}

impl ProviderSpec {
    pub fn new(id: &str, name: &str, scope: Scope, endpoint: &str, adapter: Adapter) -> Self {
        ProviderSpec {
            id: id.to_string(),
            name: name.to_string(),
            scope,
            endpoint: endpoint.to_string(),
            adapter,
        }
    }

    // 默认的四个 provider，顺序就是表格里的行顺序
    pub fn defaults() -> Vec<ProviderSpec> {
        vec![
            ProviderSpec::new(
                "baidu-qifu",
                "Baidu Qifu",
                Scope::Domestic,
                BAIDU_QIFU_ENDPOINT,
                Adapter::BaiduQifu
            ),
            ProviderSpec::new("ip-sb", "IP.SB", Scope::Global, IP_SB_ENDPOINT, Adapter::IpSb),
            ProviderSpec::new("ipapi", "ipapi.co", Scope::Global, IPAPI_ENDPOINT, Adapter::IpApi),
            ProviderSpec::new("geojs", "GeoJS", Scope::Global, GEOJS_ENDPOINT, Adapter::GeoJs)
        ]
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn normalize(&self, doc: &serde_json::Value) -> GeoResult {
        self.adapter.aliases().normalize(doc, &self.name)
    }

    /// 发一次 GET，归一化结果；只有传输错误、非 2xx 和 JSON 解析失败算失败
    pub async fn fetch(&self, client: &Client) -> Result<GeoResult, ProviderError> {
        debug!("{} | GET {}", self.id, self.endpoint);
        let response = client
            .get(&self.endpoint)
            .send().await
            .map_err(|source| ProviderError::Transport { provider: self.name.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} | HTTP {}", self.id, status.as_u16());
            return Err(ProviderError::Http {
                provider: self.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text().await
            .map_err(|source| ProviderError::Transport { provider: self.name.clone(), source })?;
        let doc: serde_json::Value = serde_json::from_str(&body)
            .map_err(|source| ProviderError::Parse { provider: self.name.clone(), source })?;

        let result = self.normalize(&doc);
        let shown = if result.ip.is_empty() { "-" } else { result.ip.as_str() };
        info!("{} | {} | {}", self.id, shown, result.version);
        Ok(result)
    }
}

// 所有请求共用一个 Client，timeout 作用于每一次请求
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ip-geo-check/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::models::IpVersion;
    use serde_json::json;

    fn provider(id: &str) -> ProviderSpec {
        ProviderSpec::defaults()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap()
    }

    #[test]
    fn defaults_are_four_providers_in_order() {
        let ids: Vec<String> = ProviderSpec::defaults()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["baidu-qifu", "ip-sb", "ipapi", "geojs"]);
        assert_eq!(provider("baidu-qifu").scope, Scope::Domestic);
        assert_eq!(provider("geojs").scope, Scope::Global);
    }

    #[test]
    fn baidu_qifu_envelope_and_defaults() {
        let doc =
            json!({
            "code": "Success",
            "data": { "prov": "广东省", "city": "深圳市", "owner": "中国电信", "asnumber": "4134" },
            "ip": "203.0.113.9"
        });
        let result = provider("baidu-qifu").normalize(&doc);
        assert_eq!(result.ip, "203.0.113.9");
        assert_eq!(result.version, IpVersion::V4);
        assert_eq!(result.country, "中国");
        assert_eq!(result.region, "广东省");
        assert_eq!(result.city, "深圳市");
        assert_eq!(result.isp, "中国电信");
        assert_eq!(result.asn, "AS4134");
        assert_eq!(result.timezone, "UTC+8");
        assert_eq!(result.source, "Baidu Qifu");
    }

    #[test]
    fn baidu_qifu_flat_response() {
        let doc = json!({ "ip": "203.0.113.9", "province": "北京市", "country": "中国", "isp": "联通" });
        let result = provider("baidu-qifu").normalize(&doc);
        assert_eq!(result.region, "北京市");
        assert_eq!(result.isp, "联通");
        assert_eq!(result.asn, "");
    }

    #[test]
    fn ip_sb_asn_with_organization() {
        let doc =
            json!({
            "ip": "2001:db8::8",
            "country_code": "JP",
            "region_code": "13",
            "asn": 2516,
            "asn_organization": "KDDI CORPORATION",
            "timezone": "Asia/Tokyo"
        });
        let result = provider("ip-sb").normalize(&doc);
        assert_eq!(result.version, IpVersion::V6);
        assert_eq!(result.country, "JP");
        assert_eq!(result.region, "13");
        assert_eq!(result.isp, "KDDI CORPORATION");
        assert_eq!(result.asn, "AS2516 KDDI CORPORATION");
        assert_eq!(result.source, "IP.SB");
    }

    #[test]
    fn ipapi_prefers_country_name_and_explicit_version() {
        let doc =
            json!({
            "ip": "198.51.100.4",
            "version": "IPv4",
            "country_name": "Germany",
            "country": "DE",
            "org": "Example GmbH",
            "asn": "AS64500"
        });
        let result = provider("ipapi").normalize(&doc);
        assert_eq!(result.country, "Germany");
        assert_eq!(result.asn, "AS64500");
        assert_eq!(result.isp, "Example GmbH");
        assert_eq!(result.city, "");
    }

    #[test]
    fn geojs_aliases() {
        let doc =
            json!({
            "address": "198.51.100.4",
            "region_name": "Bavaria",
            "org": "AS64500 Example",
            "time_zone": "Europe/Berlin"
        });
        let result = provider("geojs").normalize(&doc);
        assert_eq!(result.ip, "198.51.100.4");
        assert_eq!(result.region, "Bavaria");
        assert_eq!(result.isp, "AS64500 Example");
        assert_eq!(result.timezone, "Europe/Berlin");
    }

    #[test]
    fn with_endpoint_overrides_url() {
        let p = provider("ipapi").with_endpoint("http://127.0.0.1:9/json");
        assert_eq!(p.endpoint, "http://127.0.0.1:9/json");
        assert_eq!(p.adapter, Adapter::IpApi);
    }
}
