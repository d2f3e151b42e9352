//! 把面板状态转成终端文字，隐藏的行不输出

use crate::utils::common::{ format_latency, join_location, or_dash };
use crate::utils::models::{ GeoResult, MainSummary, ProbeRow, ProbeStatus, ProviderRow, RowStatus };
use crate::utils::session::{ GeoSnapshot, ProbeSnapshot, Report };

use std::fmt::Write;

fn render_block(out: &mut String, label: &str, slot: Option<&GeoResult>, settled: bool) {
    let _ = writeln!(out, "[{}]", label);
    match slot {
        Some(r) => {
            let _ = writeln!(out, "  地址: {}", r.ip);
            let _ = writeln!(out, "  位置: {}", join_location(&[r.city.as_str(), r.region.as_str()]));
            let _ = writeln!(out, "  国家: {}", or_dash(&r.country));
            let _ = writeln!(out, "  ISP : {}", or_dash(&r.isp));
            let _ = writeln!(out, "  ASN : {}", or_dash(&r.asn));
            let _ = writeln!(out, "  时区: {}", or_dash(&r.timezone));
            let _ = writeln!(out, "  数据来源：{}", r.source);
        }
        None => {
            let ip = if settled { format!("未检测到 {}", label) } else { "检测中...".to_string() };
            let _ = writeln!(out, "  地址: {}", ip);
            for field in ["位置", "国家", "ISP ", "ASN ", "时区"] {
                let _ = writeln!(out, "  {}: -", field);
            }
        }
    }
}

pub fn render_summary(summary: &MainSummary, settled: bool) -> String {
    let mut out = String::new();
    render_block(&mut out, "IPv4", summary.v4.as_ref(), settled);
    render_block(&mut out, "IPv6", summary.v6.as_ref(), settled);
    out
}

fn provider_line(row: &ProviderRow) -> String {
    let cells: [String; 4] = match (&row.status, &row.result) {
        (RowStatus::Success, Some(r)) =>
            [
                or_dash(&r.ip).to_string(),
                join_location(&[r.city.as_str(), r.region.as_str(), r.country.as_str()]),
                or_dash(&r.isp).to_string(),
                or_dash(&r.asn).to_string(),
            ],
        (RowStatus::Pending | RowStatus::Querying, _) => ["--", "--", "--", "--"].map(String::from),
        _ => ["-", "-", "-", "-"].map(String::from),
    };
    format!(
        "{} | {} | {} | {} | {} | {} | {}",
        row.name,
        row.scope.badge(),
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        row.status.label()
    )
}

pub fn render_provider_table(rows: &[ProviderRow]) -> String {
    let mut out = String::from("来源 | 类型 | IP | 位置 | ISP | ASN | 状态\n");
    for row in rows.iter().filter(|row| !row.hidden) {
        out.push_str(&provider_line(row));
        out.push('\n');
    }
    out
}

fn probe_line(row: &ProbeRow, timeout_ms: u64) -> String {
    let latency = match row.outcome {
        Some(outcome) => format_latency(outcome.elapsed_ms, timeout_ms),
        None => "测试中...".to_string(),
    };
    format!("{} | {} | {} | {}", row.site.name, row.site.scope.badge(), latency, row.status().label())
}

pub fn render_probe_table(rows: &[ProbeRow], timeout_ms: u64) -> String {
    let mut out = String::from("站点 | 类型 | 延迟 | 状态\n");
    for row in rows.iter().filter(|row| !row.hidden) {
        out.push_str(&probe_line(row, timeout_ms));
        out.push('\n');
    }
    out
}

pub fn render_geo(geo: &GeoSnapshot) -> String {
    let mut out = render_summary(&geo.summary, geo.settled);
    if let Some(advisory) = geo.advisory() {
        let _ = writeln!(out, "\n!! {}", advisory);
    }
    out.push('\n');
    out.push_str(&render_provider_table(&geo.providers));
    out
}

pub fn render_connectivity(probe: &ProbeSnapshot) -> String {
    render_probe_table(&probe.rows, probe.timeout_ms)
}

pub fn render_report(report: &Report, show_geo: bool, show_probe: bool) -> String {
    let mut out = String::new();
    if show_geo {
        out.push_str("========== 本机 IP ==========\n");
        out.push_str(&render_geo(&report.geo));
    }
    if show_probe {
        if show_geo {
            out.push('\n');
        }
        out.push_str("========== 连通性测试 ==========\n");
        out.push_str(&render_connectivity(&report.connectivity));
    }
    out
}

// 状态统计，日志里用
pub fn probe_counts(rows: &[ProbeRow]) -> (usize, usize) {
    let reachable = rows
        .iter()
        .filter(|row| row.status() == ProbeStatus::Reachable)
        .count();
    (reachable, rows.len())
}
