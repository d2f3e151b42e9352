//! 两条流水线的状态：多来源 IP 查询 + 连通性测试
//!
//! 每次运行都领一个单调递增的 token，所有写操作都带着 token，
//! 不是当前这一轮的结果（被刷新取代的旧请求晚到了）直接丢弃。

use crate::utils::error::ProviderError;
use crate::utils::filter::{ apply_scope_filter, ScopeFilter };
use crate::utils::models::{
    ConnectivityOutcome,
    ConnectivitySite,
    GeoResult,
    MainSummary,
    ProbeRow,
    ProviderRow,
    RowStatus,
};
use crate::utils::network::ProviderSpec;
use crate::utils::probe::probe_site;

use futures::stream::{ FuturesUnordered, StreamExt };
use log::{ debug, info, warn };
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::{ Mutex, MutexGuard, PoisonError };
use std::time::Duration;

pub const ALL_FAILED_ADVISORY: &str =
    "所有 IP API 调用都失败了，可能是被代理、防火墙或网络环境拦截。建议检查：代理设置 / DNS / 企业网络限制等。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    Geo,
    Probe,
    Both,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GeoSnapshot {
    pub providers: Vec<ProviderRow>,
    pub summary: MainSummary,
    pub settled: bool,
    pub all_failed: bool, // 所有 provider 都结束后 v4、v6 仍然为空
}

impl GeoSnapshot {
    pub fn advisory(&self) -> Option<&'static str> {
        if self.all_failed { Some(ALL_FAILED_ADVISORY) } else { None }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeSnapshot {
    pub rows: Vec<ProbeRow>,
    pub timeout_ms: u64,
    pub settled: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct Report {
    pub filter: ScopeFilter,
    pub geo: GeoSnapshot,
    pub connectivity: ProbeSnapshot,
}

struct GeoBoard {
    token: u64,
    rows: Vec<ProviderRow>,
    summary: MainSummary,
    settled: bool,
}

struct ProbeBoard {
    token: u64,
    rows: Vec<ProbeRow>,
    settled: bool,
}

// 锁中毒时照样拿到数据，面板状态没有需要保护的不变量
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Session {
    providers: Vec<ProviderSpec>,
    sites: Vec<ConnectivitySite>,
    probe_timeout: Duration,
    runs: AtomicU64,
    filter: Mutex<ScopeFilter>,
    geo: Mutex<GeoBoard>,
    probe: Mutex<ProbeBoard>,
}

impl Session {
    pub fn new(providers: Vec<ProviderSpec>, sites: Vec<ConnectivitySite>, probe_timeout: Duration) -> Self {
        let rows = providers
            .iter()
            .map(|p| ProviderRow {
                id: p.id.clone(),
                name: p.name.clone(),
                scope: p.scope,
                status: RowStatus::Pending,
                result: None,
                error: None,
                hidden: false,
            })
            .collect();
        let probe_rows = sites
            .iter()
            .map(|site| ProbeRow { site: site.clone(), outcome: None, hidden: false })
            .collect();

        Session {
            providers,
            sites,
            probe_timeout,
            runs: AtomicU64::new(0),
            filter: Mutex::new(ScopeFilter::default()),
            geo: Mutex::new(GeoBoard {
                token: 0,
                rows,
                summary: MainSummary::default(),
                settled: false,
            }),
            probe: Mutex::new(ProbeBoard { token: 0, rows: probe_rows, settled: false }),
        }
    }

    fn next_token(&self) -> u64 {
        self.runs.fetch_add(1, Ordering::SeqCst) + 1
    }

    // ------------------------------ 多来源 IP ------------------------------

    /// 开始新一轮：概览清空，所有行回到“等待中”
    pub fn begin_geo_run(&self) -> u64 {
        let token = self.next_token();
        let filter = *lock(&self.filter);
        let mut geo = lock(&self.geo);
        geo.token = token;
        geo.summary.reset();
        geo.settled = false;
        for row in geo.rows.iter_mut() {
            row.status = RowStatus::Pending;
            row.result = None;
            row.error = None;
            row.hidden = filter.hides(row.scope);
        }
        token
    }

    pub fn mark_querying(&self, token: u64, id: &str) -> bool {
        let mut geo = lock(&self.geo);
        if geo.token != token {
            return false;
        }
        match geo.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.status = RowStatus::Querying;
                true
            }
            None => false,
        }
    }

    /// 记录一个 provider 的结果。成功的话尝试填进概览（每个版本只填第一个），
    /// 失败只影响这一行。token 过期返回 false
    pub fn apply_geo_outcome(
        &self,
        token: u64,
        id: &str,
        outcome: Result<GeoResult, ProviderError>
    ) -> bool {
        let mut geo = lock(&self.geo);
        if geo.token != token {
            debug!("{} | 丢弃过期的结果 (run {}，当前 {})", id, token, geo.token);
            return false;
        }
        let Some(index) = geo.rows.iter().position(|row| row.id == id) else {
            return false;
        };

        match outcome {
            Ok(result) => {
                if let Some(version) = geo.summary.offer(&result) {
                    info!("{} | 作为 {} 主结果", id, version);
                }
                let row = &mut geo.rows[index];
                row.status = RowStatus::Success;
                row.result = Some(result);
                row.error = None;
            }
            Err(e) => {
                warn!("{} | 失败: {}", id, e);
                let row = &mut geo.rows[index];
                row.status = RowStatus::Failed;
                row.result = None;
                row.error = Some(e.to_string());
            }
        }
        true
    }

    /// 所有 provider 都结束后调用，之后才判断“全部失败”
    pub fn finish_geo_run(&self, token: u64) -> bool {
        let mut geo = lock(&self.geo);
        if geo.token != token {
            return false;
        }
        geo.settled = true;
        if geo.summary.is_empty() {
            warn!("{}", ALL_FAILED_ADVISORY);
        }
        true
    }

    /// 并发查询所有 provider，互不影响，按完成顺序处理结果
    pub async fn run_geo(&self, client: &Client) -> GeoSnapshot {
        let token = self.begin_geo_run();
        let mut pending: FuturesUnordered<_> = self.providers
            .iter()
            .map(|provider| {
                self.mark_querying(token, &provider.id);
                async move { (provider.id.as_str(), provider.fetch(client).await) }
            })
            .collect();

        while let Some((id, outcome)) = pending.next().await {
            self.apply_geo_outcome(token, id, outcome);
        }

        self.finish_geo_run(token);
        self.geo_snapshot()
    }

    pub fn geo_snapshot(&self) -> GeoSnapshot {
        let geo = lock(&self.geo);
        GeoSnapshot {
            providers: geo.rows.clone(),
            summary: geo.summary.clone(),
            settled: geo.settled,
            all_failed: geo.settled && geo.summary.is_empty(),
        }
    }

    // ------------------------------ 连通性测试 ------------------------------

    pub fn begin_probe_run(&self) -> u64 {
        let token = self.next_token();
        let filter = *lock(&self.filter);
        let mut probe = lock(&self.probe);
        probe.token = token;
        probe.settled = false;
        for row in probe.rows.iter_mut() {
            row.outcome = None;
            row.hidden = filter.hides(row.site.scope);
        }
        token
    }

    pub fn apply_probe_outcome(&self, token: u64, index: usize, outcome: ConnectivityOutcome) -> bool {
        let mut probe = lock(&self.probe);
        if probe.token != token {
            return false;
        }
        match probe.rows.get_mut(index) {
            Some(row) => {
                row.outcome = Some(outcome);
                true
            }
            None => false,
        }
    }

    pub fn finish_probe_run(&self, token: u64) -> bool {
        let mut probe = lock(&self.probe);
        if probe.token != token {
            return false;
        }
        probe.settled = true;
        true
    }

    /// 并发测试所有站点，这一轮共用同一个时间戳做防缓存参数
    pub async fn run_probes(&self, client: &Client) -> ProbeSnapshot {
        let token = self.begin_probe_run();
        let stamp = chrono::Utc::now().timestamp_millis();
        let timeout = self.probe_timeout;

        let mut pending: FuturesUnordered<_> = self.sites
            .iter()
            .enumerate()
            .map(|(index, site)| async move {
                (index, probe_site(client, site, stamp, timeout).await)
            })
            .collect();

        while let Some((index, outcome)) = pending.next().await {
            self.apply_probe_outcome(token, index, outcome);
        }

        self.finish_probe_run(token);
        self.probe_snapshot()
    }

    pub fn probe_snapshot(&self) -> ProbeSnapshot {
        let probe = lock(&self.probe);
        ProbeSnapshot {
            rows: probe.rows.clone(),
            timeout_ms: u64::try_from(self.probe_timeout.as_millis()).unwrap_or(u64::MAX),
            settled: probe.settled,
        }
    }

    // ------------------------------ 刷新 / 过滤 ------------------------------

    /// IP 查询和连通性测试各用各的 Client，见 `build_client` / `build_probe_client`
    pub async fn refresh(&self, geo_client: &Client, probe_client: &Client, scope: RefreshScope) {
        match scope {
            RefreshScope::Geo => {
                self.run_geo(geo_client).await;
            }
            RefreshScope::Probe => {
                self.run_probes(probe_client).await;
            }
            RefreshScope::Both => {
                tokio::join!(self.run_geo(geo_client), self.run_probes(probe_client));
            }
        }
    }

    pub fn set_filter(&self, filter: ScopeFilter) {
        let mut current = lock(&self.filter);
        *current = filter;
        let mut geo = lock(&self.geo);
        let mut probe = lock(&self.probe);
        apply_scope_filter(filter, &mut geo.rows, &mut probe.rows);
    }

    pub fn filter(&self) -> ScopeFilter {
        *lock(&self.filter)
    }

    pub fn report(&self) -> Report {
        Report {
            filter: self.filter(),
            geo: self.geo_snapshot(),
            connectivity: self.probe_snapshot(),
        }
    }
}
