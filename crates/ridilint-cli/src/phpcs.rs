//! Subprocess proxy for the real phpcs install.
//!
//! The emulated CLI only supplements phpcs; the genuine report still comes
//! from running the configured phpcs script with the original arguments.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

use crate::logging;

/// Run phpcs with the forwarded arguments and capture its stdout.
///
/// phpcs exits non-zero whenever it reports any violation, so the exit
/// status is deliberately ignored; only the XML on stdout matters.
pub fn run_phpcs(php_bin: &str, phpcs_script: &Path, args: &[String]) -> Result<String> {
    logging::log(&format!(
        "running {} {} with {} args",
        php_bin,
        phpcs_script.display(),
        args.len()
    ));
    let output = Command::new(php_bin)
        .arg(phpcs_script)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {} {}", php_bin, phpcs_script.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        // `echo` stands in for the php binary; the script path becomes the
        // first echoed word.
        let output = run_phpcs("echo", Path::new("phpcs"), &["hello".to_string()]).unwrap();
        assert_eq!(output, "phpcs hello");
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let result = run_phpcs(
            "/nonexistent/php-binary",
            Path::new("phpcs"),
            &[],
        );
        assert!(result.is_err());
    }
}
