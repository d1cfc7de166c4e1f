//! ridilint CLI - phpcs-compatible supplementary PHP linter
//!
//! Invoked exactly like phpcs (`ridilint <file> --standard=<x>
//! --encoding=utf-8 --report=xml`), so IDE inspections configured for
//! phpcs can point at this binary instead. The output is the real phpcs
//! XML report with ridilint's own `<error>` elements merged into it; when
//! no phpcs install is configured, only ridilint's findings are printed.

mod config;
mod export;
mod lint;
mod logging;
mod phpcs;

use std::process::ExitCode;

use anyhow::Result;

use config::Config;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(report) => {
            if !report.is_empty() {
                println!("{}", report);
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("ridilint: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String> {
    let config = match Config::load()? {
        Some((config, _path)) => config,
        None => Config::default(),
    };
    if let Some(log_path) = &config.log.file {
        // A broken log path should never break linting.
        let _ = logging::init(log_path);
    }
    logging::section(&format!("ridilint {:?}", args));

    let lint_xml = lint::run(config.rules.file.as_deref(), args)?;

    // Without a configured phpcs install there is nothing to merge into;
    // the fragment itself is the whole report.
    let (php_bin, phpcs_script) = match (&config.php.binary, &config.phpcs.script) {
        (Some(bin), Some(script)) => (bin, script),
        _ => return Ok(lint_xml),
    };

    let phpcs_xml = phpcs::run_phpcs(php_bin, phpcs_script, args)?;
    let fragment = if lint_xml.is_empty() {
        None
    } else {
        Some(lint_xml.as_str())
    };
    let merged = export::merge_result(&phpcs_xml, fragment);
    logging::log("merged lint fragment into phpcs report");
    Ok(merged)
}
