use clap::Parser;
use promptdeck_lib::commands::{self, Cli};
use promptdeck_lib::config::Config;
use promptdeck_lib::logger;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = logger::init_logging(&config, cli.verbose) {
        eprintln!("Warning: 日志初始化失败: {e}");
    }

    if let Err(e) = commands::run(cli, config).await {
        tracing::debug!("[CLI] 命令失败: {:?}", e);
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
