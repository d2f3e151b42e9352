//! 连通性测试（伪 ping）
//!
//! 对每个站点请求一个很小的图标资源，只看请求成功 / 失败 / 超时，不读取响应内容。
//! 这种方式分不清“被网络策略阻断”“站点宕机”和“太慢”，结果文案里保留这种不确定性。

use crate::utils::error::ProbeError;
use crate::utils::models::{ ConnectivityOutcome, ConnectivitySite, ProbeStatus, Scope };

use log::{ debug, info, warn };
use reqwest::Client;
use std::sync::{ Arc, OnceLock };
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;

// 连通性测试专用的 Client：不设整体超时，超时只由 probe_site 的计时决定。
// 不能和查询 IP 的 Client 共用，否则它自己的超时会先触发，被当成“失败”
pub fn build_probe_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("ip-geo-check/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub fn default_sites() -> Vec<ConnectivitySite> {
    vec![
        ConnectivitySite::new("字节跳动", "https://www.bytedance.com/favicon.ico", Scope::Domestic),
        ConnectivitySite::new("Bilibili", "https://www.bilibili.com/favicon.ico", Scope::Domestic),
        ConnectivitySite::new("微信", "https://wx.qq.com/favicon.ico", Scope::Domestic),
        ConnectivitySite::new("淘宝", "https://www.taobao.com/favicon.ico", Scope::Domestic),
        ConnectivitySite::new("GitHub", "https://github.com/favicon.ico", Scope::Global),
        ConnectivitySite::new("jsDelivr", "https://cdn.jsdelivr.net/favicon.ico", Scope::Global),
        ConnectivitySite::new("Cloudflare", "https://www.cloudflare.com/favicon.ico", Scope::Global),
        ConnectivitySite::new("YouTube", "https://www.youtube.com/favicon.ico", Scope::Global)
    ]
}

// 给地址加上 t=<时间戳>，避免重复测试时命中缓存
pub fn cache_bust(url: &str, stamp: i64) -> Result<Url, ProbeError> {
    let mut parsed = Url::parse(url).map_err(|source| ProbeError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    parsed.query_pairs_mut().append_pair("t", &stamp.to_string());
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeSignal {
    Load,
    Error,
    Timeout,
}

impl ProbeSignal {
    fn status(&self) -> ProbeStatus {
        match self {
            ProbeSignal::Load => ProbeStatus::Reachable,
            ProbeSignal::Error => ProbeStatus::Failed,
            ProbeSignal::Timeout => ProbeStatus::TimedOut,
        }
    }
}

/// 只接受第一个到达的信号（加载成功 / 出错 / 超时），之后的信号全部忽略
#[derive(Debug, Default)]
pub struct ProbeRecorder {
    outcome: OnceLock<ConnectivityOutcome>,
}

impl ProbeRecorder {
    pub fn new() -> Self {
        ProbeRecorder::default()
    }

    // 返回 true 表示这次信号被记录下来了
    pub fn finish(&self, signal: ProbeSignal, elapsed: Duration) -> bool {
        let outcome = ConnectivityOutcome {
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status: signal.status(),
        };
        self.outcome.set(outcome).is_ok()
    }

    pub fn outcome(&self) -> Option<ConnectivityOutcome> {
        self.outcome.get().copied()
    }
}

// 相当于浏览器里图片的 onload / onerror：成功状态码算加载成功，响应体不读
async fn load_resource(client: &Client, url: Url) -> Result<(), ProbeError> {
    let response = client
        .get(url)
        .send().await
        .map_err(|source| ProbeError::Network { source })?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ProbeError::Status { status: status.as_u16() })
    }
}

/// 测试单个站点。请求在后台任务里跑，超时后不取消，晚到的结果会被 recorder 丢弃
pub async fn probe_site(
    client: &Client,
    site: &ConnectivitySite,
    stamp: i64,
    timeout: Duration
) -> ConnectivityOutcome {
    let recorder = Arc::new(ProbeRecorder::new());
    let start = Instant::now();

    match cache_bust(&site.url, stamp) {
        Ok(url) => {
            let request = {
                let client = client.clone();
                let recorder = Arc::clone(&recorder);
                let name = site.name.clone();
                tokio::spawn(async move {
                    let signal = match load_resource(&client, url).await {
                        Ok(()) => ProbeSignal::Load,
                        Err(e) => {
                            debug!("{} | {}", name, e);
                            ProbeSignal::Error
                        }
                    };
                    if !recorder.finish(signal, start.elapsed()) {
                        debug!("{} | 已超时，忽略迟到的 {:?}", name, signal);
                    }
                })
            };

            tokio::select! {
                _ = request => {}
                _ = tokio::time::sleep(timeout) => {
                    recorder.finish(ProbeSignal::Timeout, start.elapsed());
                }
            }
        }
        Err(e) => {
            warn!("{} | {}", site.name, e);
            recorder.finish(ProbeSignal::Error, start.elapsed());
        }
    }

    let outcome = recorder.outcome().unwrap_or(ConnectivityOutcome {
        elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        status: ProbeStatus::Failed,
    });
    info!("{} | {} ms | {}", site.name, outcome.elapsed_ms, outcome.status.label());
    outcome
}
