use crate::utils::models::IpVersion;
use std::{ io::{ self, Write }, time::Duration };

// 判断 IPv4 / IPv6：显式给出的版本优先，其次看地址里有没有冒号。
// 版本是枚举，不认识的显式值（如 "v5"）不会原样保留，而是退回到按地址推断
pub fn detect_version(ip: &str, explicit: Option<&str>) -> IpVersion {
    if let Some(version) = explicit.and_then(IpVersion::from_explicit) {
        return version;
    }
    if ip.is_empty() {
        return IpVersion::Unknown;
    }
    if ip.contains(':') { IpVersion::V6 } else { IpVersion::V4 }
}

// 拼位置字符串，全部为空时显示 "-"
pub fn join_location(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<&str>>()
        .join(" / ");
    if joined.is_empty() { "-".to_string() } else { joined }
}

// 空字段在界面上显示成 "-"
pub fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

// 延迟文字：达到或超过超时阈值就显示成 "> N ms"
pub fn format_latency(elapsed_ms: u64, timeout_ms: u64) -> String {
    if elapsed_ms >= timeout_ms {
        format!("> {} ms", timeout_ms)
    } else {
        format!("{} ms", elapsed_ms)
    }
}

// 计算程序运行的总时长
pub fn format_duration(duration: Duration) -> (f64, &'static str) {
    if duration.as_secs() > 0 {
        (duration.as_secs_f64(), "秒")
    } else if duration.as_millis() > 0 {
        (duration.as_millis() as f64, "毫秒")
    } else if duration.as_micros() > 0 {
        (duration.as_micros() as f64, "微秒")
    } else {
        (duration.as_nanos() as f64, "纳秒")
    }
}

pub fn wait_for_enter() {
    print!("按Enter键，退出程序！");
    let _ = io::stdout().flush();

    let mut input = String::new();
    let _ = io::stdin().read_line(&mut input);
}
