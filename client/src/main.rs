//! Vespa deploy client - Entry Point
//!
//! Usage: vespa-deploy <deploy|prepare|activate|submit|version> [--key=value ...]

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use colored::Colorize;
use tracing::{error, info};

use deploy_models::PrepareResult;
use vespa_deploy::filesys::file::File;
use vespa_deploy::http::client::HttpClient;
use vespa_deploy::logs::{init_logging, LogOptions};
use vespa_deploy::storage::settings::Settings;
use vespa_deploy::utils::version_info;
use vespa_deploy::{activate, deploy, prepare, submit, DeploymentOptions};

const DEFAULT_SETTINGS_FILE: &str = "vespa-deploy.json";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut command = None;
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --json-logs
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        } else if command.is_none() {
            command = Some(arg.clone());
        }
    }

    let Some(command) = command else {
        eprintln!("Usage: vespa-deploy <deploy|prepare|activate|submit|version> [--key=value ...]");
        return ExitCode::FAILURE;
    };

    if command == "version" {
        let version = version_info();
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", e),
        }
        return ExitCode::SUCCESS;
    }

    match run(&command, &cli_args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} failed: {:#}", command, e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &str, cli_args: &HashMap<String, String>) -> anyhow::Result<()> {
    let settings_path = cli_args
        .get("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_SETTINGS_FILE);
    let mut settings = Settings::load(&File::new(settings_path))
        .await
        .with_context(|| format!("unable to read settings from {}", settings_path))?;
    apply_overrides(&mut settings, cli_args)?;

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        json_format: cli_args.contains_key("json-logs"),
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let client = HttpClient::new()?;
    let target = settings.build_target(client).await?;
    let package = settings
        .build_package()
        .await
        .with_context(|| format!("unable to load package {}", settings.package.display()))?;
    let options = DeploymentOptions::new(target, package, settings.timeout());
    info!("Running {} for {}", command, options);

    match command {
        "deploy" => {
            let result = deploy(&options).await?;
            print_log(&result);
            if options.is_cloud() {
                println!(
                    "{} Triggered deployment of {} with run ID {}",
                    "Success:".green().bold(),
                    options.target.deployment().application,
                    result.id
                );
            } else {
                println!("{} Deployed {}", "Success:".green().bold(), settings.package.display());
            }
        }
        "prepare" => {
            let result = prepare(&options).await?;
            print_log(&result);
            println!(
                "{} Prepared {} with session {}",
                "Success:".green().bold(),
                settings.package.display(),
                result.id
            );
        }
        "activate" => {
            let session_id: i64 = cli_args
                .get("session")
                .ok_or_else(|| anyhow!("activate requires --session=<id>"))?
                .parse()
                .context("invalid session id")?;
            activate(session_id, &options).await?;
            println!("{} Activated session {}", "Success:".green().bold(), session_id);
        }
        "submit" => {
            submit(&options).await?;
            println!(
                "{} Submitted {} for deployment",
                "Success:".green().bold(),
                options.target.deployment().application
            );
        }
        other => return Err(anyhow!("unknown command {:?}", other)),
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, cli_args: &HashMap<String, String>) -> anyhow::Result<()> {
    if let Some(target_type) = cli_args.get("target") {
        settings.target.target_type = target_type.parse()?;
    }
    if let Some(url) = cli_args.get("url") {
        settings.target.url = Some(url.clone());
    }
    if let Some(application) = cli_args.get("application") {
        settings.application = application.parse()?;
    }
    if let Some(zone) = cli_args.get("zone") {
        settings.zone = Some(zone.parse()?);
    }
    if let Some(package) = cli_args.get("package") {
        settings.package = PathBuf::from(package);
    }
    if let Some(test_package) = cli_args.get("test-package") {
        settings.test_package = Some(PathBuf::from(test_package));
    }
    if let Some(wait) = cli_args.get("wait") {
        settings.wait_secs = wait.parse().context("invalid --wait")?;
    }
    if let Some(level) = cli_args.get("log-level") {
        settings.log_level = level.parse().map_err(|e: String| anyhow!(e))?;
    }
    Ok(())
}

fn print_log(result: &PrepareResult) {
    for line in &result.log_lines {
        let level = match line.level.as_str() {
            "error" => line.level.red(),
            "warning" | "warn" => line.level.yellow(),
            _ => line.level.normal(),
        };
        println!("{} {}", level, line.message);
    }
}
