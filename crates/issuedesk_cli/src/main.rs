//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `issuedesk_core` linkage and storage bootstrap from a shell.
//! - Print resolved configuration and the migrated schema version.

use issuedesk_core::db::migrations::current_user_version;
use issuedesk_core::{core_version, init_logging_from_config, open_db, ping, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CoreConfig::from_env();
    println!("issuedesk_core ping={}", ping());
    println!("issuedesk_core version={}", core_version());
    println!("config db_path={}", config.db_path.display());
    println!(
        "config log_level={} log_dir={}",
        config.log_level,
        config.log_dir.display()
    );

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let schema_version = open_db(&config.db_path)
        .map_err(|err| err.to_string())
        .and_then(|conn| current_user_version(&conn).map_err(|err| err.to_string()));
    match schema_version {
        Ok(version) => {
            log::info!("event=cli_check module=cli status=ok schema_version={version}");
            println!("db schema_version={version}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_check module=cli status=error");
            eprintln!("db open failed: {err}");
            ExitCode::FAILURE
        }
    }
}
