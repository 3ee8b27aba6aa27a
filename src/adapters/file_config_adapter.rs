//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
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
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn sections(&self) -> Vec<String> {
        let mut sections: Vec<String> = self.config.get_map_ref().keys().cloned().collect();
        sections.sort();
        sections
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(&section.to_lowercase())
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
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

    const SAMPLE: &str = r#"
[evaluation]
data_dir = /var/lib/stratlab
segments = NIFTY, BANKNIFTY
strategies = all
min_bars = 80

[backtest]
session_close = 15:15
fallback_stop_pct = 0.25

[scoring]
profit_factor_cap = 12.5

[strategy.ema_adx_trend]
max_bars_held = 30
min_adx = 22
"#;

    #[test]
    fn from_string_parses_config() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("evaluation", "data_dir"),
            Some("/var/lib/stratlab".to_string())
        );
        assert_eq!(
            adapter.get_string("evaluation", "segments"),
            Some("NIFTY, BANKNIFTY".to_string())
        );
        assert_eq!(
            adapter.get_string("backtest", "session_close"),
            Some("15:15".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("evaluation", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn sections_and_keys_are_sorted() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        let sections = adapter.sections();
        assert!(sections.contains(&"strategy.ema_adx_trend".to_string()));
        assert!(sections.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            adapter.keys("strategy.ema_adx_trend"),
            vec!["max_bars_held".to_string(), "min_adx".to_string()]
        );
        assert!(adapter.keys("absent").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("strategy.ema_adx_trend", "max_bars_held"),
            Some("30".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
