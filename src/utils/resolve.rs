//! 声明式字段别名表
//!
//! 各家 API 对同一个概念用的字段名不一样（国家可能是全称也可能是代码，ISP 可能在好几个键下），
//! 每个逻辑字段配一串候选路径，按顺序取第一个非空值。

use crate::utils::common::detect_version;
use crate::utils::models::GeoResult;
use serde_json::Value;

/// 候选字段路径，`a.b` 表示进入对象 `a` 再取 `b`
pub type Paths = &'static [&'static str];

#[derive(Debug, Clone, Copy)]
pub struct AliasTable {
    pub ip: Paths,
    pub version: Paths,
    pub country: Paths,
    pub region: Paths,
    pub city: Paths,
    pub isp: Paths,
    pub asn: Paths,
    pub asn_org: Paths, // 有值时拼在 ASN 后面
    pub timezone: Paths,
    pub country_default: &'static str,
    pub timezone_default: &'static str,
}

impl AliasTable {
    /// 用别名表把上游 JSON 归一化成 GeoResult
    pub fn normalize(&self, doc: &Value, source: &str) -> GeoResult {
        let ip = resolve(doc, self.ip);
        let explicit = resolve(doc, self.version);
        let explicit = if explicit.is_empty() { None } else { Some(explicit.as_str()) };

        GeoResult {
            version: detect_version(&ip, explicit),
            ip,
            country: resolve_or(doc, self.country, self.country_default),
            region: resolve(doc, self.region),
            city: resolve(doc, self.city),
            isp: resolve(doc, self.isp),
            asn: format_asn(&resolve(doc, self.asn), &resolve(doc, self.asn_org)),
            timezone: resolve_or(doc, self.timezone, self.timezone_default),
            source: source.to_string(),
        }
    }
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |node, key| node.get(key))
}

// 字符串原样取（去掉首尾空白），数字转成字符串，其它类型跳过
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { None } else { Some(s.to_string()) }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 按顺序尝试每个候选路径，返回第一个非空值；都没有时返回空字符串
pub fn resolve(doc: &Value, paths: &[&str]) -> String {
    paths
        .iter()
        .filter_map(|path| lookup(doc, path).and_then(as_text))
        .next()
        .unwrap_or_default()
}

pub fn resolve_or(doc: &Value, paths: &[&str], default: &str) -> String {
    let value = resolve(doc, paths);
    if value.is_empty() { default.to_string() } else { value }
}

// ASN 统一成 "AS<number>"，可选地跟上组织名
pub fn format_asn(raw: &str, org: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let mut asn = if raw.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("AS")) {
        raw.to_string()
    } else {
        format!("AS{}", raw)
    };
    if !org.is_empty() {
        asn.push(' ');
        asn.push_str(org);
    }
    asn
}
