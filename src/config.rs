use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;

/// File name of the GeoIP2 City database inside the base directory.
pub const DATABASE_FILENAME: &str = "GeoIP2-City.mmdb";

/// Environment variable naming the directory that holds the database.
pub const MMDB_DIR_ENV: &str = "GEOIP_MMDB_DIR";

/// Environment variable selecting the language used for place names.
pub const LOCALE_ENV: &str = "GEOIP_LOCALE";

pub const DEFAULT_LOCALE: &str = "en";

// Searched in order when no directory is configured.
const STANDARD_DIRS: [&str; 3] = ["/usr/share/GeoIP", "/opt/homebrew/var/GeoIP", "/var/lib/GeoIP"];

static GLOBAL: Lazy<GeoConfig> = Lazy::new(GeoConfig::from_env);

/// Where to find the geo database and how to render names from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeoConfig {
    /// Directory containing [`DATABASE_FILENAME`].
    pub base_dir: Utf8PathBuf,
    /// Language key used to pick a name out of a record's localized names.
    pub locale: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl GeoConfig {
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Build a configuration from `GEOIP_MMDB_DIR` and `GEOIP_LOCALE`,
    /// falling back to the defaults for anything unset or empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = non_empty_env(MMDB_DIR_ENV) {
            config.base_dir = Utf8PathBuf::from(dir);
        }
        if let Some(locale) = non_empty_env(LOCALE_ENV) {
            config.locale = locale;
        }
        config
    }

    /// The process-wide configuration, read from the environment on first use.
    pub fn global() -> &'static GeoConfig {
        &GLOBAL
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// First of the standard GeoIP directories that exists, or `/usr/share/GeoIP`.
pub fn default_base_dir() -> Utf8PathBuf {
    STANDARD_DIRS
        .iter()
        .map(Utf8Path::new)
        .find(|dir| dir.exists())
        .unwrap_or_else(|| Utf8Path::new(STANDARD_DIRS[0]))
        .to_path_buf()
}

/// Location of the database file: a base directory plus the fixed file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatabasePath {
    base_dir: Utf8PathBuf,
}

impl DatabasePath {
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Pick the per-call override when one is given, else the configured
    /// base directory. An empty override counts as absent.
    pub fn resolve(config: &GeoConfig, base_override: Option<&str>) -> Self {
        match base_override.filter(|dir| !dir.is_empty()) {
            Some(dir) => Self::new(dir),
            None => Self::new(config.base_dir.clone()),
        }
    }

    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Full path of the database file.
    pub fn file(&self) -> Utf8PathBuf {
        self.base_dir.join(DATABASE_FILENAME)
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_config() {
        let config = GeoConfig::new("/data/geo");
        let path = DatabasePath::resolve(&config, Some("/mnt/hdfs/maxmind"));
        assert_eq!(path.file().as_str(), "/mnt/hdfs/maxmind/GeoIP2-City.mmdb");
    }

    #[test]
    fn empty_or_missing_override_uses_config() {
        let config = GeoConfig::new("/data/geo");
        assert_eq!(DatabasePath::resolve(&config, None).base_dir().as_str(), "/data/geo");
        assert_eq!(DatabasePath::resolve(&config, Some("")).base_dir().as_str(), "/data/geo");
    }

    #[test]
    fn display_shows_the_file() {
        let path = DatabasePath::new("/data/geo/");
        assert_eq!(path.to_string(), "/data/geo/GeoIP2-City.mmdb");
    }

    #[test]
    fn default_dir_is_a_standard_location() {
        let dir = default_base_dir();
        assert!(STANDARD_DIRS.contains(&dir.as_str()));
        assert_eq!(GeoConfig::default().locale, "en");
    }
}
