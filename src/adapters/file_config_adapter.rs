//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// An adapter with no keys; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Override a key, e.g. from a command-line flag.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.config.set(section, key, Some(value.into()));
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
ticker = MSFT
fast_window = 10

[output]
dir = out
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "ticker"),
            Some("MSFT".to_string())
        );
        assert_eq!(adapter.get_string("output", "dir"), Some("out".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nticker = AAPL\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn empty_adapter_has_no_keys() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("backtest", "ticker"), None);
    }

    #[test]
    fn get_string_keeps_raw_text() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nfast_window = abc\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "fast_window"), Some("abc".to_string()));
    }

    #[test]
    fn set_overrides_file_value() {
        let mut adapter = FileConfigAdapter::from_string("[backtest]\nticker = AAPL\n").unwrap();
        adapter.set("backtest", "ticker", "NVDA");
        adapter.set("data", "source", "csv");
        assert_eq!(adapter.get_string("backtest", "ticker"), Some("NVDA".to_string()));
        assert_eq!(adapter.get_string("data", "source"), Some("csv".to_string()));
    }

    #[test]
    fn from_file_reads_config() {
        let content = "[data]\ncsv_dir = /tmp/prices\n";
        let file = create_temp_config(content);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "csv_dir"),
            Some("/tmp/prices".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
