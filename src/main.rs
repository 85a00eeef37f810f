use color_eyre::eyre::{Result, WrapErr};
use ptc_wings::DemoConfig;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let config = setup()?;

    info!("Running {:?} on prefix {:?}", config.board, config.name_prefix());
    let err = config.board.run(&config);
    Err::<(), _>(err).wrap_err_with(|| format!("{:?} demo stopped", config.board))
}

fn setup() -> Result<DemoConfig> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }

    // Logging is not up yet, so load errors surface through the eyre report
    let config = DemoConfig::load().wrap_err("Failed to load demo config")?;
    setup_logging_env(config.max_level());
    Ok(config)
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
