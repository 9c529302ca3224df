// Author: Dustin Pilgrim
// License: MIT

//! The operator-facing INI configuration.

use std::path::Path;

use ini::Ini;

use crate::cli::Args;
use crate::core::config::Settings;

pub const DEFAULT_CONFIG_FILE: &str = "/etc/stop-idle-sessions.conf";

const SECTION: &str = "stop-idle-sessions";

/// Load settings from the given path, or from the default location.
///
/// The default file is allowed to be missing; a file the operator named
/// explicitly is not.
pub fn load(path: Option<&Path>) -> Result<Settings, String> {
    match path {
        Some(path) => read_file(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_file(default)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

/// Fold the command-line flags in. They can set, never unset.
pub fn apply_cli(settings: &mut Settings, args: &Args) {
    if args.dry_run {
        settings.dry_run = true;
    }
    if args.verbose {
        settings.verbose = true;
    }
}

fn read_file(path: &Path) -> Result<Settings, String> {
    let ini = Ini::load_from_file(path)
        .map_err(|err| format!("could not load config file {}: {err}", path.display()))?;
    settings_from(&ini)
}

fn settings_from(ini: &Ini) -> Result<Settings, String> {
    let mut settings = Settings::default();

    let Some(section) = ini.section(Some(SECTION)) else {
        return Ok(settings);
    };

    if let Some(raw) = section.get("dry-run") {
        settings.dry_run = parse_bool(raw)
            .ok_or_else(|| format!("invalid boolean for dry-run: {raw:?}"))?;
    }

    if let Some(raw) = section.get("verbose") {
        settings.verbose = parse_bool(raw)
            .ok_or_else(|| format!("invalid boolean for verbose: {raw:?}"))?;
    }

    if let Some(raw) = section.get("excluded-users") {
        settings.excluded_users = split_users(raw);
    }

    if let Some(raw) = section.get("timeout") {
        settings.timeout_minutes = raw
            .trim()
            .parse()
            .map_err(|_| format!("invalid timeout (non-negative minutes): {raw:?}"))?;
    }

    Ok(settings)
}

// The boolean vocabulary of classic INI consumers.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

fn split_users(raw: &str) -> Vec<String> {
    raw.split([',', ';', ':'])
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use clap::Parser;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn an_empty_file_yields_the_defaults() {
        let file = config_file("");
        let settings = load(Some(file.path())).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeout_minutes, 15);
        assert!(!settings.dry_run);
        assert!(!settings.verbose);
        assert!(settings.excluded_users.is_empty());
    }

    #[test]
    fn all_keys_are_read_from_the_section() {
        let file = config_file(
            "[stop-idle-sessions]\n\
             dry-run = yes\n\
             verbose = on\n\
             excluded-users = ansible, backup;monitor :  deploy\n\
             timeout = 45\n",
        );
        let settings = load(Some(file.path())).unwrap();

        assert!(settings.dry_run);
        assert!(settings.verbose);
        assert_eq!(
            settings.excluded_users,
            vec!["ansible", "backup", "monitor", "deploy"]
        );
        assert_eq!(settings.timeout_minutes, 45);
    }

    #[test]
    fn keys_outside_the_section_are_ignored() {
        let file = config_file("[other]\ntimeout = 1\n");
        let settings = load(Some(file.path())).unwrap();

        assert_eq!(settings.timeout_minutes, 15);
    }

    #[test]
    fn a_missing_explicit_file_is_fatal() {
        assert!(load(Some(Path::new("/no/such/file.conf"))).is_err());
    }

    #[test]
    fn boolean_vocabulary_matches_ini_conventions() {
        for raw in ["1", "yes", "Yes", "TRUE", "on"] {
            assert_eq!(parse_bool(raw), Some(true), "{raw}");
        }
        for raw in ["0", "no", "No", "FALSE", "off"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn a_bad_boolean_is_a_parse_error() {
        let file = config_file("[stop-idle-sessions]\ndry-run = maybe\n");
        assert!(load(Some(file.path())).is_err());
    }

    #[test]
    fn a_negative_timeout_is_a_parse_error() {
        let file = config_file("[stop-idle-sessions]\ntimeout = -5\n");
        assert!(load(Some(file.path())).is_err());
    }

    #[test]
    fn excluded_users_splits_on_every_separator() {
        assert_eq!(split_users("a,b;c:d"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_users("  spaced , out  "), vec!["spaced", "out"]);
        assert!(split_users("").is_empty());
        assert!(split_users(" , ; ").is_empty());
    }

    #[test]
    fn the_command_line_can_set_but_never_unset() {
        let mut settings = Settings {
            dry_run: true,
            verbose: true,
            ..Settings::default()
        };
        let args = Args::parse_from(["stop-idle-sessions"]);

        apply_cli(&mut settings, &args);
        assert!(settings.dry_run);
        assert!(settings.verbose);

        let mut settings = Settings::default();
        let args = Args::parse_from(["stop-idle-sessions", "-n", "-v"]);

        apply_cli(&mut settings, &args);
        assert!(settings.dry_run);
        assert!(settings.verbose);
    }
}
