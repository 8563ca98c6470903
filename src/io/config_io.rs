use std::fs;
use std::path::Path;

use crate::io::project_io::ProjectError;
use crate::io::storage::atomic_write;
use crate::model::config::PlannerConfig;
use crate::model::project::CONFIG_FILE;

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(root: &Path) -> Result<(PlannerConfig, toml_edit::DocumentMut), ProjectError> {
    let config_path = root.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: PlannerConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(root: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ProjectError> {
    let config_path = root.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| ProjectError::ReadError {
        path: config_path,
        source: e,
    })
}

/// Set `cache.version`, creating the `[cache]` table if needed. A trailing
/// comment on an existing value is kept.
pub fn set_cache_version(doc: &mut toml_edit::DocumentMut, version: &str) {
    if !doc.contains_key("cache") {
        doc["cache"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let item = &mut doc["cache"]["version"];
    match item.as_value_mut() {
        Some(value) => {
            let decor = value.decor().clone();
            *value = toml_edit::Value::from(version);
            *value.decor_mut() = decor;
        }
        None => *item = toml_edit::value(version),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# Sitges planner
[festival]
name = "Sitges"   # shown in the tab bar
month = 10

[cache]
name = "festival-planner"
version = "1.0.3" # bumped by fp bump
"#
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, sample_config()).unwrap();

        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.cache.version, "1.0.3");
        write_config(tmp.path(), &doc).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), sample_config());
    }

    #[test]
    fn cache_version_update_keeps_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_cache_version(&mut doc, "1.0.4");
        let result = doc.to_string();
        assert!(result.contains("version = \"1.0.4\" # bumped by fp bump"));
        assert!(result.contains("# shown in the tab bar"));
        let config: PlannerConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.cache.cache_name(), "festival-planner-v1.0.4");
    }

    #[test]
    fn cache_table_is_created() {
        let mut doc: toml_edit::DocumentMut = "[festival]\nname = \"X\"\n".parse().unwrap();
        set_cache_version(&mut doc, "2.0.0");
        let config: PlannerConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.cache.version, "2.0.0");
        assert_eq!(config.festival.name, "X");
    }
}
