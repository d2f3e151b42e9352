use serde::{ Deserialize, Serialize };
use std::fmt;

// 国内 / 国际，只用于展示时的过滤
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Domestic,
    Global,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Domestic => "domestic",
            Scope::Global => "global",
        }
    }

    // 表格里显示的徽标文字
    pub fn badge(&self) -> &'static str {
        match self {
            Scope::Domestic => "国内",
            Scope::Global => "国际",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpVersion {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl IpVersion {
    /// 识别上游显式给出的版本字段（如 ipapi.co 的 `"version": "IPv4"`），不认识的返回 None
    pub fn from_explicit(value: &str) -> Option<IpVersion> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ipv4" | "v4" | "4" => Some(IpVersion::V4),
            "ipv6" | "v6" | "6" => Some(IpVersion::V6),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IpVersion::V4 => "IPv4",
            IpVersion::V6 => "IPv6",
            IpVersion::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 每个 provider 归一化后的结果，缺失的字段一律是空字符串
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoResult {
    pub ip: String,
    pub version: IpVersion,
    pub country: String,
    pub region: String,
    pub city: String,
    pub isp: String,
    pub asn: String,
    pub timezone: String,
    pub source: String, // provider 的显示名称，总是有值
}

/// 左侧概览：IPv4 / IPv6 各一个槽位，每轮只填第一个成功的结果
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MainSummary {
    pub v4: Option<GeoResult>,
    pub v6: Option<GeoResult>,
}

impl MainSummary {
    pub fn reset(&mut self) {
        self.v4 = None;
        self.v6 = None;
    }

    /// 尝试把结果放进对应版本的空槽位，返回实际填入的版本
    pub fn offer(&mut self, result: &GeoResult) -> Option<IpVersion> {
        if result.ip.is_empty() {
            return None;
        }
        let slot = match result.version {
            IpVersion::V4 => &mut self.v4,
            IpVersion::V6 => &mut self.v6,
            IpVersion::Unknown => {
                return None;
            }
        };
        if slot.is_some() {
            return None;
        }
        *slot = Some(result.clone());
        Some(result.version)
    }

    pub fn is_empty(&self) -> bool {
        self.v4.is_none() && self.v6.is_none()
    }
}

// provider 表格里每一行的状态
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Pending,
    Querying,
    Success,
    Failed,
}

impl RowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Pending => "等待中",
            RowStatus::Querying => "查询中",
            RowStatus::Success => "成功",
            RowStatus::Failed => "失败",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProviderRow {
    pub id: String,
    pub name: String,
    pub scope: Scope,
    pub status: RowStatus,
    pub result: Option<GeoResult>,
    pub error: Option<String>,
    pub hidden: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConnectivitySite {
    pub name: String,
    pub url: String,
    pub scope: Scope,
}

impl ConnectivitySite {
    pub fn new(name: &str, url: &str, scope: Scope) -> Self {
        ConnectivitySite {
            name: name.to_string(),
            url: url.to_string(),
            scope,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeStatus {
    Testing,
    Reachable,
    TimedOut,
    Failed,
}

impl ProbeStatus {
    // 超时和失败都无法区分“被阻断 / 宕机 / 太慢”，文案里保留这种不确定性
    pub fn label(&self) -> &'static str {
        match self {
            ProbeStatus::Testing => "测试中",
            ProbeStatus::Reachable => "可访问",
            ProbeStatus::TimedOut => "超时 / 可能被阻断",
            ProbeStatus::Failed => "失败 / 可能被阻断",
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityOutcome {
    pub elapsed_ms: u64,
    pub status: ProbeStatus,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeRow {
    pub site: ConnectivitySite,
    pub outcome: Option<ConnectivityOutcome>,
    pub hidden: bool,
}

impl ProbeRow {
    pub fn status(&self) -> ProbeStatus {
        self.outcome.map(|o| o.status).unwrap_or(ProbeStatus::Testing)
    }
}
