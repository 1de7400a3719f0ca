//! `fw-host`: inspect, render and load form widgets from the command line

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::HostConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

fn cli() -> Command {
    Command::new("fw-host")
        .version(fw_registry::VERSION)
        .about("Form widget registry host")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Backend base URL serving the extension endpoints"),
        )
        .arg(
            Arg::new("fixtures")
                .long("fixtures")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON fixture file used instead of a backend"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("CPU deadline per widget evaluation or render"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter when RUST_LOG is unset (e.g. debug, fw_discovery=trace)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("list")
                .about("List registered widgets, including extension widgets when a source is set")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render one widget to HTML")
                .arg(Arg::new("widget").required(true).help("Widget name"))
                .arg(
                    Arg::new("props")
                        .long("props")
                        .help("Widget props as JSON, e.g. '{\"id\":\"amount\",\"label\":\"Amount\"}'"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate and load a widget source file in the sandbox")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Widget module source"),
                ),
        )
        .subcommand(
            Command::new("discover")
                .about("Load extension widgets and report per-file outcomes")
                .arg(
                    Arg::new("extension")
                        .long("extension")
                        .help("Reload a single extension instead of all"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn resolve_config(matches: &ArgMatches) -> Result<HostConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };

    if let Some(url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(url.clone());
    }
    if let Some(path) = matches.get_one::<PathBuf>("fixtures") {
        config = config.with_fixtures(path.clone());
    }
    if let Some(ms) = matches.get_one::<u64>("timeout-ms") {
        config = config.with_sandbox_timeout(Duration::from_millis(*ms));
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config = config.with_log_level(level.clone());
    }
    if matches.get_flag("json-logs") {
        config = config.with_json_logs(true);
    }
    Ok(config)
}

async fn run(matches: ArgMatches) -> Result<bool> {
    let config = resolve_config(&matches)?;
    logging::init(&config.logging)?;

    match matches.subcommand() {
        Some(("list", args)) => commands::list(&config, args.get_flag("json")).await?,
        Some(("render", args)) => {
            let widget = args
                .get_one::<String>("widget")
                .map(String::as_str)
                .unwrap_or_default();
            let props = args.get_one::<String>("props").map(String::as_str);
            commands::render(&config, widget, props).await?;
        }
        Some(("check", args)) => {
            if let Some(file) = args.get_one::<PathBuf>("file") {
                commands::check(&config, file)?;
            }
        }
        Some(("discover", args)) => {
            let extension = args.get_one::<String>("extension").map(String::as_str);
            return commands::discover(&config, extension, args.get_flag("json")).await;
        }
        _ => {}
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();

    match run(matches).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let matches = cli().get_matches_from([
            "fw-host",
            "--fixtures",
            "widgets.json",
            "--timeout-ms",
            "250",
            "list",
            "--json",
        ]);
        let config = resolve_config(&matches).unwrap();

        assert_eq!(config.discovery.fixtures, Some(PathBuf::from("widgets.json")));
        assert_eq!(config.sandbox.timeout_ms, 250);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let matches = cli().get_matches_from(["fw-host", "discover", "--base-url", "http://x/api/"]);
        let config = resolve_config(&matches).unwrap();
        assert_eq!(config.discovery.base_url.as_deref(), Some("http://x/api/"));
    }
}
