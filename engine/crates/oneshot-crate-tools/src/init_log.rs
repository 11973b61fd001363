use std::io::Write;

/// 日志等级对应的前景色
///
/// Trace 专门留给 driver 的 VERBOSE 消息，用灰色弱化显示
fn level_color(level: log::Level) -> Option<anstyle::Color> {
    let color = match level {
        log::Level::Error => anstyle::Color::Ansi(anstyle::AnsiColor::Red),
        log::Level::Warn => anstyle::Color::Ansi(anstyle::AnsiColor::Yellow),
        log::Level::Info => anstyle::Color::Ansi(anstyle::AnsiColor::Green),
        log::Level::Debug => anstyle::Color::Ansi(anstyle::AnsiColor::Cyan),
        log::Level::Trace => anstyle::Color::Rgb(anstyle::RgbColor(110, 110, 110)),
    };
    Some(color)
}

/// 初始化全局 logger，输出到 stderr
///
/// `default_level` 是没有设置 `RUST_LOG` 时使用的等级；设置了 `RUST_LOG` 时以环境变量为准。
///
/// 重复调用不会 panic，只有第一次调用生效
pub fn init_log(default_level: log::LevelFilter) {
    let result = env_logger::Builder::new()
        .format(|buf, record| {
            let level_style = buf.default_level_style(record.level()).fg_color(level_color(record.level()));
            let grey_style = anstyle::Style::new().fg_color(Some(anstyle::Color::Rgb(anstyle::RgbColor(110, 110, 110))));

            let line = record.line().unwrap_or(!0);
            let file = record.file().unwrap_or("").rsplit(['\\', '/']).next().unwrap_or("");
            let time = chrono::Local::now().format("%H:%M:%S");
            let level = record.level();

            writeln!(
                buf,
                "{level_style}[{time}] {level}{level_style:#} {grey_style}[{file}:{line}]{grey_style:#} {}",
                record.args()
            )
        })
        .filter(None, default_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .try_init();

    if result.is_err() {
        log::debug!("logger already initialized, keep the existing one");
    }
}
