//! 连通性测试的集成测试（本地 mock 站点）

use ip_geo_check::utils::common::format_latency;
use ip_geo_check::utils::probe::probe_site;
use ip_geo_check::{
    build_client,
    build_probe_client,
    Adapter,
    ConnectivitySite,
    ProbeStatus,
    ProviderSpec,
    RefreshScope,
    RowStatus,
    Scope,
    ScopeFilter,
    Session,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{ method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

async fn favicon_server(status: u16, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_bytes(vec![0u8; 16])
                .insert_header("content-type", "image/x-icon")
                .set_delay(delay)
        )
        .mount(&server).await;
    server
}

fn site(server: &MockServer, name: &str, scope: Scope) -> ConnectivitySite {
    ConnectivitySite::new(name, &format!("{}/favicon.ico", server.uri()), scope)
}

#[tokio::test]
async fn reachable_site_reports_elapsed_time() {
    let server = favicon_server(200, Duration::ZERO).await;
    let client = build_probe_client().unwrap();

    let outcome = probe_site(&client, &site(&server, "ok", Scope::Global), 1234, Duration::from_millis(2000)).await;
    assert_eq!(outcome.status, ProbeStatus::Reachable);
    assert!(outcome.elapsed_ms < 2000);
    assert_eq!(format_latency(outcome.elapsed_ms, 2000), format!("{} ms", outcome.elapsed_ms));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("t=1234"));
}

#[tokio::test]
async fn error_status_is_a_failure() {
    let server = favicon_server(404, Duration::ZERO).await;
    let client = build_probe_client().unwrap();

    let outcome = probe_site(&client, &site(&server, "gone", Scope::Global), 1, Duration::from_millis(2000)).await;
    assert_eq!(outcome.status, ProbeStatus::Failed);
}

#[tokio::test]
async fn refused_connection_is_a_failure() {
    let client = build_probe_client().unwrap();
    let refused = ConnectivitySite::new("refused", "http://127.0.0.1:9/favicon.ico", Scope::Domestic);

    let outcome = probe_site(&client, &refused, 1, Duration::from_millis(2000)).await;
    assert_eq!(outcome.status, ProbeStatus::Failed);
}

#[tokio::test]
async fn slow_site_times_out_and_late_load_is_ignored() {
    let server = favicon_server(200, Duration::from_millis(1500)).await;
    let client = build_probe_client().unwrap();
    let session = Session::new(
        Vec::new(),
        vec![site(&server, "slow", Scope::Global)],
        Duration::from_millis(300)
    );

    let snapshot = session.run_probes(&client).await;
    let outcome = snapshot.rows[0].outcome.unwrap();
    assert_eq!(outcome.status, ProbeStatus::TimedOut);
    assert!(outcome.elapsed_ms >= 300);
    assert_eq!(format_latency(outcome.elapsed_ms, snapshot.timeout_ms), "> 300 ms");

    // 后台请求在超时后才完成，面板上的结果不能变
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(session.probe_snapshot().rows[0].outcome, Some(outcome));
}

#[tokio::test]
async fn session_probes_every_site_with_one_stamp_per_run() {
    let server = favicon_server(200, Duration::ZERO).await;
    let sites = vec![
        site(&server, "国内站", Scope::Domestic),
        site(&server, "国际站", Scope::Global),
        ConnectivitySite::new("refused", "http://127.0.0.1:9/favicon.ico", Scope::Global)
    ];
    let client = build_probe_client().unwrap();
    let session = Session::new(Vec::new(), sites, Duration::from_millis(2000));
    session.set_filter(ScopeFilter::new(false, true));

    let snapshot = session.run_probes(&client).await;
    assert!(snapshot.settled);
    assert_eq!(snapshot.timeout_ms, 2000);
    let statuses: Vec<ProbeStatus> = snapshot.rows
        .iter()
        .map(|r| r.status())
        .collect();
    assert_eq!(statuses, [ProbeStatus::Reachable, ProbeStatus::Reachable, ProbeStatus::Failed]);
    let hidden: Vec<bool> = snapshot.rows
        .iter()
        .map(|r| r.hidden)
        .collect();
    assert_eq!(hidden, [false, true, true]);

    tokio::time::sleep(Duration::from_millis(20)).await;
    session.run_probes(&client).await;

    let stamps: Vec<String> = server
        .received_requests().await
        .unwrap()
        .iter()
        .filter_map(|r| r.url.query().map(str::to_string))
        .collect();
    assert_eq!(stamps.len(), 4);
    assert_eq!(stamps[0], stamps[1]);
    assert_eq!(stamps[2], stamps[3]);
    assert_ne!(stamps[0], stamps[2]);
}

#[tokio::test]
async fn probe_window_is_the_only_timeout() {
    let server = favicon_server(200, Duration::from_millis(1200)).await;
    let client = build_probe_client().unwrap();

    let outcome = probe_site(&client, &site(&server, "slow", Scope::Global), 1, Duration::from_millis(3000)).await;
    assert_eq!(outcome.status, ProbeStatus::Reachable);
    assert!(outcome.elapsed_ms >= 1200);
    assert!(outcome.elapsed_ms < 3000);
}

#[tokio::test]
async fn short_provider_timeout_does_not_fail_slow_sites() {
    let server = favicon_server(200, Duration::from_millis(1200)).await;
    Mock::given(method("GET"))
        .and(path("/ipapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "198.51.100.7" })))
        .mount(&server).await;

    let provider = ProviderSpec::new(
        "ipapi",
        "ipapi.co",
        Scope::Global,
        &format!("{}/ipapi", server.uri()),
        Adapter::IpApi
    );
    let session = Session::new(
        vec![provider],
        vec![site(&server, "slow", Scope::Global)],
        Duration::from_millis(3000)
    );
    // 查询 IP 的超时比连通性测试的窗口短得多
    let geo_client = build_client(Duration::from_millis(500)).unwrap();
    let probe_client = build_probe_client().unwrap();

    session.refresh(&geo_client, &probe_client, RefreshScope::Both).await;

    let report = session.report();
    assert_eq!(report.geo.providers[0].status, RowStatus::Success);
    let outcome = report.connectivity.rows[0].outcome.unwrap();
    assert_eq!(outcome.status, ProbeStatus::Reachable);
    assert!(outcome.elapsed_ms >= 1200);
}
