// 初始化日志（设置日志格式），输出到 stderr，stdout 留给表格 / JSON
pub fn init_logger(level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch
        ::new()
        .format(|out, message, record| {
            out.finish(
                format_args!(
                    "{} {:<5} {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    message
                )
            )
        })
        .level(level)
        // reqwest / hyper 的内部日志太吵
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("hyper_util", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
