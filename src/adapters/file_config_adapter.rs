//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use rust_decimal::Decimal;
use std::path::Path;

/// [`ConfigPort`] backed by an INI file. Section and key names are
/// case-insensitive (configparser lowercases them).
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

    fn get_decimal(&self, section: &str, key: &str) -> Option<Decimal> {
        self.config
            .get(section, key)
            .and_then(|value| value.trim().parse::<Decimal>().ok())
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
    use rust_decimal_macros::dec;
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
[account]
opening_balance = 10000.00

[valuation]
baseline = net_contributions

[prices]
AAPL = 170.00
TSLA = 250.00
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("valuation", "baseline"),
            Some("net_contributions".to_string())
        );
        assert_eq!(
            adapter.get_decimal("account", "opening_balance"),
            Some(dec!(10000.00))
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[account]\nopening_balance = 100\n").unwrap();
        assert_eq!(adapter.get_string("account", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_decimal_returns_none_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[account]\nopening_balance = plenty\n").unwrap();
        assert_eq!(adapter.get_decimal("account", "opening_balance"), None);
    }

    #[test]
    fn get_decimal_handles_exact_scale() {
        let adapter =
            FileConfigAdapter::from_string("[prices]\nAAPL = 170.55\n").unwrap();
        assert_eq!(adapter.get_decimal("prices", "AAPL"), Some(dec!(170.55)));
    }

    #[test]
    fn keys_lists_section_entries_sorted() {
        let adapter =
            FileConfigAdapter::from_string("[prices]\nTSLA = 250\nAAPL = 170\nGOOGL = 2800\n")
                .unwrap();
        assert_eq!(adapter.keys("prices"), vec!["aapl", "googl", "tsla"]);
    }

    #[test]
    fn keys_of_missing_section_is_empty() {
        let adapter = FileConfigAdapter::from_string("[account]\n").unwrap();
        assert!(adapter.keys("prices").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[account]\nopening_balance = 5000\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_decimal("account", "opening_balance"),
            Some(dec!(5000))
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
