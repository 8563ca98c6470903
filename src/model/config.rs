use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from planner.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub festival: FestivalConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FestivalConfig {
    #[serde(default = "default_festival_name")]
    pub name: String,
    /// Calendar month the festival runs in (1-12). The schedule has no year
    /// or month, so calendar export pins events to this month.
    #[serde(default = "default_month")]
    pub month: u32,
    /// Key of the preferences entry in the storage file
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for FestivalConfig {
    fn default() -> Self {
        FestivalConfig {
            name: default_festival_name(),
            month: default_month(),
            storage_key: default_storage_key(),
        }
    }
}

/// Locations relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_schedule_path")]
    pub schedule: String,
    #[serde(default = "default_storage_path")]
    pub storage: String,
    #[serde(default = "default_version_path")]
    pub version: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            schedule: default_schedule_path(),
            storage: default_storage_path(),
            version: default_version_path(),
        }
    }
}

/// Offline cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache name prefix; the full name is `<name>-v<version>`
    #[serde(default = "default_cache_name")]
    pub name: String,
    #[serde(default = "default_cache_version")]
    pub version: String,
    /// Where cache generations are stored
    #[serde(default = "default_cache_dir")]
    pub dir: String,
    /// Directory the offline worker fetches from
    #[serde(default = "default_site_dir")]
    pub site_dir: String,
    /// Asset paths pre-fetched on install
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,
}

impl CacheConfig {
    pub fn cache_name(&self) -> String {
        format!("{}-v{}", self.name, self.version)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            name: default_cache_name(),
            version: default_cache_version(),
            dir: default_cache_dir(),
            site_dir: default_site_dir(),
            manifest: default_manifest(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long transient notices stay in the status row (clamped to 3-5)
    #[serde(default = "default_notice_seconds")]
    pub notice_seconds: u64,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl UiConfig {
    pub fn notice_seconds(&self) -> u64 {
        self.notice_seconds.clamp(3, 5)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            notice_seconds: default_notice_seconds(),
            colors: HashMap::new(),
        }
    }
}

fn default_festival_name() -> String {
    "Festival".to_string()
}

fn default_month() -> u32 {
    10
}

fn default_storage_key() -> String {
    "festivalPlannerPrefs".to_string()
}

fn default_schedule_path() -> String {
    "data/schedule.json".to_string()
}

fn default_storage_path() -> String {
    ".festplan/storage.json".to_string()
}

fn default_version_path() -> String {
    "version.json".to_string()
}

fn default_cache_name() -> String {
    "festival-planner".to_string()
}

fn default_cache_version() -> String {
    "1.0.0".to_string()
}

fn default_cache_dir() -> String {
    ".festplan/cache".to_string()
}

fn default_site_dir() -> String {
    ".".to_string()
}

fn default_manifest() -> Vec<String> {
    ["/", "/index.html", "/css/styles.css", "/js/planner.js", "/data/schedule.json", "/manifest.json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_notice_seconds() -> u64 {
    4
}
