//! Configuration inspection command.
//!
//! - `--list` (default): every key with its merged value and source
//! - `--get KEY`: one value
//! - `--path`: config file locations

use crate::cli::ConfigArgs;
use crate::cli::commands::print_json;
use crate::config::{
    self, CliOverrides, ConfigSource, KNOWN_KEYS, PROJECT_DIR, ResolvedConfig, is_known_key,
    user_config_path,
};
use crate::error::{PerfError, Result};
use serde_json::json;
use std::env;
use tracing::debug;

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or the key is unknown.
pub fn execute(args: &ConfigArgs, json_mode: bool, overrides: &CliOverrides) -> Result<()> {
    if args.path {
        return show_paths(json_mode, overrides);
    }

    let loaded = config::load_from_cwd(overrides)?;
    debug!(keys = loaded.resolved.iter().count(), "Resolved configuration");

    match &args.get {
        Some(key) => get_value(&loaded.resolved, key, json_mode),
        None => list_values(&loaded.resolved, json_mode),
    }
}

fn show_paths(json_mode: bool, overrides: &CliOverrides) -> Result<()> {
    let project = match &overrides.config_path {
        Some(path) => path.clone(),
        None => env::current_dir()?.join(PROJECT_DIR).join("config.yaml"),
    };
    let user = user_config_path();

    if json_mode {
        return print_json(&json!({
            "project": project.display().to_string(),
            "project_exists": project.is_file(),
            "user": user.as_ref().map(|p| p.display().to_string()),
            "user_exists": user.as_ref().is_some_and(|p| p.is_file()),
        }));
    }

    println!("project: {}{}", project.display(), missing_marker(project.is_file()));
    match user {
        Some(path) => println!("user:    {}{}", path.display(), missing_marker(path.is_file())),
        None => println!("user:    (HOME not set)"),
    }
    Ok(())
}

const fn missing_marker(exists: bool) -> &'static str {
    if exists { "" } else { " (missing)" }
}

fn get_value(resolved: &ResolvedConfig, key: &str, json_mode: bool) -> Result<()> {
    if !is_known_key(key) {
        return Err(PerfError::Config(format!("unknown config key: {key}")));
    }
    let value = resolved.get(key);
    let source = resolved.source(key);

    if json_mode {
        return print_json(&json!({
            "key": key,
            "value": value,
            "source": source,
        }));
    }

    match value {
        Some(value) => println!("{value}"),
        None => println!("(unset)"),
    }
    Ok(())
}

fn list_values(resolved: &ResolvedConfig, json_mode: bool) -> Result<()> {
    let entries: Vec<(&str, Option<&str>, Option<ConfigSource>)> = KNOWN_KEYS
        .iter()
        .map(|(key, _)| (*key, resolved.get(key), resolved.source(key)))
        .collect();

    if json_mode {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(key, value, source)| {
                (
                    (*key).to_string(),
                    json!({ "value": value, "source": source }),
                )
            })
            .collect();
        return print_json(&map);
    }

    let width = entries.iter().map(|(k, _, _)| k.len()).max().unwrap_or(0);
    for (key, value, source) in entries {
        let source = source.map_or("unset", |s| s.as_str());
        println!(
            "{key:<width$}  {}  ({source})",
            value.unwrap_or("-")
        );
    }
    for key in resolved.unknown_keys() {
        println!("{key:<width$}  (ignored: unknown key)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLayer, default_config_layer};

    #[test]
    fn get_rejects_unknown_key() {
        let resolved =
            ResolvedConfig::from_layers(&[(ConfigSource::Default, default_config_layer())]);
        assert!(matches!(
            get_value(&resolved, "colour", false),
            Err(PerfError::Config(_))
        ));
        assert!(get_value(&resolved, "fetch-workers", true).is_ok());
    }

    #[test]
    fn list_includes_unknown_keys() {
        let mut extra = ConfigLayer::default();
        extra.insert("colour", "yes".to_string());
        let resolved = ResolvedConfig::from_layers(&[
            (ConfigSource::Default, default_config_layer()),
            (ConfigSource::Project, extra),
        ]);
        assert!(list_values(&resolved, false).is_ok());
    }
}
