use oneshot_app::{app::OneShotApp, config::DispatchConfig};
use oneshot_crate_tools::init_log::init_log;

fn panic_handler(info: &std::panic::PanicHookInfo) {
    log::error!("{}", info);
}

fn main() {
    std::panic::set_hook(Box::new(panic_handler));
    init_log(DispatchConfig::host_log_level(|key| std::env::var(key).ok()));

    let config = DispatchConfig::from_env_and_args();
    log::info!("shader: {:?}", config.shader_path);

    if let Err(err) = OneShotApp::run(&config) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }

    log::info!("end run.");
}
