//! nwpcat - A catalog of archived NWP output
//!
//! This is the main entry point for the nwpcat command line tool.

use std::process::ExitCode;
use tracing::{error, info};

use nwpcat::{
    check_availability, init_tracing, log_error, Action, Catalog, Config, JsonIndexStore,
    LocalFilesystem, Result,
};

fn main() -> Result<ExitCode> {
    // Load configuration
    let (config, command) = Config::load()?;

    init_tracing(&config.log_level);
    info!("Starting nwpcat v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    let host = config.host()?;

    let store = JsonIndexStore::new(&config.catalog.cases_path);
    let mut catalog = Catalog::open(&config.catalog.cases_path, host, &command.selection, &store)
        .map_err(|e| {
            log_error(&e, "opening catalog");
            e
        })?;

    match &command.action {
        Action::List => {
            println!("{}", catalog.summary(command.verbosity)?);
        }
        Action::Scan => {
            let results = catalog.scan(&LocalFilesystem, &store)?;
            for (case, scanned) in &results {
                info!(
                    case = case.as_str(),
                    found = ?scanned.found,
                    not_found = ?scanned.not_found,
                    "Case scanned"
                );
            }
            if command.verbosity > 0 {
                println!(" Scan result:");
                println!("{}", catalog.summary(command.verbosity)?);
            }
        }
        Action::Reconstruct(query) => {
            for path in catalog.reconstruct(query)? {
                println!("{}", path);
            }
        }
        Action::Check => {
            let missing = check_availability(&catalog, &LocalFilesystem)?;
            for file in &missing {
                println!("{}/{}: missing {}", file.case, file.experiment, file.path);
            }
            if !missing.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
            info!("All probed files present");
        }
    }

    Ok(ExitCode::SUCCESS)
}
