//! Lint pipeline behind the emulated phpcs CLI contract
//!
//! `run()` accepts the exact positional argument shape PhpStorm hands to
//! phpcs (`<file> --standard=<x> --encoding=utf-8 --report=xml`), lints
//! the file against the configured JSON rules and returns the XML error
//! fragment. Deviations from the contract either exit silently empty (a
//! `--version` check, or no rule file configured) or fail as an invalid
//! invocation.

use std::fs;
use std::path::{Path, PathBuf};

use bumpalo::Bump;
use mago_database::file::FileId;
use thiserror::Error;

use ridilint_core::PositionError;
use ridilint_rules::{LoadError, RuleError};

use crate::export;
use crate::logging;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid argument (only the phpcs invocation shape is supported)")]
    InvalidArguments,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse { path: PathBuf },

    #[error(transparent)]
    Rules(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] RuleError),

    #[error(transparent)]
    Export(#[from] PositionError),
}

/// Run the lint pipeline for one emulated phpcs invocation.
pub fn run(rule_file: Option<&Path>, args: &[String]) -> Result<String, RunError> {
    let mut remaining = args.iter().map(String::as_str);
    let php_file = remaining.next().unwrap_or("");
    let standard = remaining.next().unwrap_or("");
    let encoding = remaining.next().unwrap_or("");
    let report = remaining.next().unwrap_or("");
    let has_trailing = remaining.next().is_some();

    let valid = rule_file.is_some()
        && Path::new(php_file).is_file()
        && !standard.is_empty()
        && encoding == "--encoding=utf-8"
        && report == "--report=xml"
        && !has_trailing;

    if !valid {
        // Normal silent exits, not errors: a version check, or the tool is
        // simply not configured with a rule file.
        if php_file == "--version" || rule_file.is_none() {
            return Ok(String::new());
        }
        logging::log(&format!("invalid invocation: {:?}", args));
        return Err(RunError::InvalidArguments);
    }
    let rule_file = match rule_file {
        Some(path) => path,
        None => return Ok(String::new()),
    };

    let source = fs::read_to_string(php_file).map_err(|source| RunError::Io {
        path: PathBuf::from(php_file),
        source,
    })?;
    let rules = ridilint_rules::load_rules_from_file(rule_file)?;
    logging::log(&format!(
        "linting {} against {} rules",
        php_file,
        rules.len()
    ));

    let arena = Bump::new();
    let file_id = FileId::new(php_file.as_bytes());
    let program = mago_syntax::parser::parse_file_content(&arena, file_id, source.as_bytes());
    // Hard fail on broken input; no partial serialization.
    if program.has_errors() {
        return Err(RunError::Parse {
            path: PathBuf::from(php_file),
        });
    }

    let entities = ridilint_core::serialize(program, &source);
    logging::log(&format!("serialized {} entities", entities.len()));

    let flagged = ridilint_rules::filter(&rules, entities)?;
    logging::log(&format!("{} entities flagged", flagged.len()));

    Ok(export::export_xml(&source, &flagged)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn phpcs_args(php_file: &Path) -> Vec<String> {
        vec![
            php_file.to_string_lossy().into_owned(),
            "--standard=ruleset.xml".to_string(),
            "--encoding=utf-8".to_string(),
            "--report=xml".to_string(),
        ]
    }

    #[test]
    fn test_version_check_is_silent() {
        let rules = write_temp("[]");
        let output = run(Some(rules.path()), &["--version".to_string()]).unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_missing_rule_file_is_silent() {
        let php = write_temp("<?php $a = 1;\n");
        let output = run(None, &phpcs_args(php.path())).unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_missing_source_file_is_invalid() {
        let rules = write_temp("[]");
        let args = phpcs_args(Path::new("/nonexistent/file.php"));
        assert!(matches!(
            run(Some(rules.path()), &args),
            Err(RunError::InvalidArguments)
        ));
    }

    #[test]
    fn test_wrong_encoding_flag_is_invalid() {
        let rules = write_temp("[]");
        let php = write_temp("<?php\n");
        let mut args = phpcs_args(php.path());
        args[2] = "--encoding=latin1".to_string();
        assert!(matches!(
            run(Some(rules.path()), &args),
            Err(RunError::InvalidArguments)
        ));
    }

    #[test]
    fn test_trailing_arguments_are_invalid() {
        let rules = write_temp("[]");
        let php = write_temp("<?php\n");
        let mut args = phpcs_args(php.path());
        args.push("--extra".to_string());
        assert!(matches!(
            run(Some(rules.path()), &args),
            Err(RunError::InvalidArguments)
        ));
    }

    #[test]
    fn test_unparsable_source_fails() {
        let rules = write_temp("[]");
        let php = write_temp("<?php class {{{{\n");
        assert!(matches!(
            run(Some(rules.path()), &phpcs_args(php.path())),
            Err(RunError::Parse { .. })
        ));
    }

    #[test]
    fn test_clean_file_yields_empty_fragment() {
        let rules = write_temp(r#"[{"type": "class", "must": "class [A-Z]\\w*", "reason": "r"}]"#);
        let php = write_temp("<?php\nclass Good {}\n");
        let output = run(Some(rules.path()), &phpcs_args(php.path())).unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_flagged_file_yields_error_elements() {
        let rules = write_temp(
            r#"[{"type": "class", "must": "class [A-Z]\\w*", "reason": "class names start uppercase"}]"#,
        );
        let php = write_temp("<?php\nclass bad {}\n");
        let output = run(Some(rules.path()), &phpcs_args(php.path())).unwrap();
        assert!(output.starts_with("<error line='2' column='0'"));
        assert!(output.contains("source='RIDI.LINT'"));
        assert!(output.contains("[class] class names start uppercase &lt;class bad&gt;"));
    }

    #[test]
    fn test_unreadable_rule_file_fails() {
        let php = write_temp("<?php\n");
        let args = phpcs_args(php.path());
        assert!(matches!(
            run(Some(Path::new("/nonexistent/rules.json")), &args),
            Err(RunError::Rules(_))
        ));
    }
}
