use crate::utils::filter::ScopeFilter;
use crate::utils::probe::DEFAULT_PROBE_TIMEOUT_MS;
use crate::utils::session::RefreshScope;

use clap::{ Parser, ValueEnum };
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// 查询本机公网 IP（IPv4 / IPv6）和地理位置，并测试国内外常用站点的连通性
#[derive(Parser, Debug, Clone)]
#[command(name = "ip-geo-check", version)]
pub struct Args {
    /// 连通性测试的超时时间（毫秒）
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
    pub probe_timeout: u64,

    /// 每个 IP 查询接口的请求超时（秒）
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub provider_timeout: u64,

    /// 隐藏国内的 provider / 站点
    #[arg(long)]
    pub hide_domestic: bool,

    /// 隐藏国际的 provider / 站点
    #[arg(long)]
    pub hide_global: bool,

    /// 不查询 IP 信息
    #[arg(long, conflicts_with = "skip_probe")]
    pub skip_geo: bool,

    /// 不做连通性测试
    #[arg(long)]
    pub skip_probe: bool,

    /// 首次检测之后再刷新几次
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub refresh: u32,

    /// 两次刷新之间的间隔（秒）
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub refresh_interval: u64,

    /// 刷新时也重新做连通性测试（默认只刷新 IP 信息）
    #[arg(long)]
    pub refresh_probe: bool,

    /// 以 JSON 输出结果
    #[arg(long)]
    pub json: bool,

    /// 把两张表导出到 CSV 文件
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// 结束前等待按下 Enter
    #[arg(long)]
    pub wait: bool,
}

impl Args {
    pub fn filter(&self) -> ScopeFilter {
        ScopeFilter::new(self.hide_domestic, self.hide_global)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout)
    }

    // 首次检测跑哪些流水线（两个都跳过在解析时就被拒绝了）
    pub fn initial_scope(&self) -> RefreshScope {
        if self.skip_geo {
            RefreshScope::Probe
        } else if self.skip_probe {
            RefreshScope::Geo
        } else {
            RefreshScope::Both
        }
    }

    // 刷新要重跑哪些流水线；跳过的那条不参与刷新
    pub fn refresh_scope(&self) -> Option<RefreshScope> {
        let geo = !self.skip_geo;
        let probe = !self.skip_probe && self.refresh_probe;
        match (geo, probe) {
            (true, true) => Some(RefreshScope::Both),
            (true, false) => Some(RefreshScope::Geo),
            (false, true) => Some(RefreshScope::Probe),
            (false, false) => None,
        }
    }
}
