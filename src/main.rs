use clap::Parser;
use ip_geo_check::utils::{
    args::Args,
    common::{ format_duration, wait_for_enter },
    files::write_report_csv,
    logger::init_logger,
    network::{ build_client, ProviderSpec },
    probe::{ build_probe_client, default_sites },
    render::{ probe_counts, render_report },
    session::Session,
};
use log::info;
use std::io::{ self, Write };
use std::time::{ Duration, Instant };

// 输出当前的两张表：默认是文字表格，--json 时输出 JSON
fn print_report(session: &Session, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let report = session.report();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(out, "{}", render_report(&report, !args.skip_geo, !args.skip_probe))?;
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let args = Args::parse();
    init_logger(args.log_level.into())?;

    let client = build_client(args.provider_timeout())?;
    let probe_client = build_probe_client()?;
    let session = Session::new(ProviderSpec::defaults(), default_sites(), args.probe_timeout());
    session.set_filter(args.filter());

    // 首次检测：IP 查询和连通性测试同时进行
    session.refresh(&client, &probe_client, args.initial_scope()).await;
    if !args.skip_probe {
        let (reachable, total) = probe_counts(&session.probe_snapshot().rows);
        info!("连通性测试完成，可访问 {}/{}", reachable, total);
    }
    print_report(&session, &args)?;

    // 手动刷新：默认只重新查询 IP，--refresh-probe 时连通性测试也重跑
    if let Some(scope) = args.refresh_scope() {
        for round in 1..=args.refresh {
            tokio::time::sleep(Duration::from_secs(args.refresh_interval)).await;
            info!("第 {} 次刷新", round);
            session.refresh(&client, &probe_client, scope).await;
            print_report(&session, &args)?;
        }
    }

    if let Some(path) = &args.csv {
        write_report_csv(path, &session.report())?;
        info!("结果已导出到 {}", path.display());
    }

    let (elapsed_time, unit) = format_duration(start_time.elapsed());
    info!("程序运行结束，耗时：{:.2} {}", elapsed_time, unit);
    if args.wait {
        wait_for_enter();
    }

    Ok(())
}
