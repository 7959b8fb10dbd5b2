mod config;
mod error;
mod models;
mod ranks;
mod services;

use config::{CliArgs, DEFAULT_CONFIG_PATH};
use services::fetcher::Fetcher;
use services::store::SessionStore;

const DEFAULT_ENDPOINT: &str = "https://api.mozambiquehe.re/bridge";

fn print_usage() {
    println!("lp-tracker - polls the Apex stats API and keeps overlay-readable LP files");
    println!();
    println!("Usage:");
    println!("  lp-tracker [--new] [--user NAME] [--platform PC|PS4|X1|SWITCH]");
    println!("             [--root PREFIX] [--api-mins N] [--api-key KEY] [--config PATH]");
    println!();
    println!("Each field resolves CLI flag > config file > environment variable");
    println!("(LP_TRACKER_API_KEY, LP_TRACKER_USER, LP_TRACKER_PLATFORM, LP_TRACKER_ROOT).");
    println!("Default config file: {}", DEFAULT_CONFIG_PATH);
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&raw_args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            std::process::exit(2);
        }
    };
    if cli.help {
        print_usage();
        return;
    }

    let config_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_file_config(&config_path)
        .and_then(|file| config::resolve(cli, file))
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(2);
        });

    let store = SessionStore::new(cfg.root.clone());
    if let Err(e) = store.ensure_slots() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let fetcher = match Fetcher::new(DEFAULT_ENDPOINT, &cfg) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // ctrl_c aborts any in-flight backoff or inter-poll sleep promptly
    tokio::select! {
        result = services::poller::run(&cfg, &fetcher, store) => {
            if let Err(e) = result {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Shutting down");
        }
    }
}
