use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use labelcheck_ocr::BareWeightUnit;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "labelcheck.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    /// Unit assumed for weight values submitted without a unit token.
    /// The stock-intake form sends grams.
    pub bare_weight_unit: BareWeightUnit,
    pub tesseract_lang: String,
    pub tesseract_data_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            max_upload_bytes: 10 * 1024 * 1024,
            bare_weight_unit: BareWeightUnit::default(),
            tesseract_lang: "eng".to_string(),
            tesseract_data_path: None,
        }
    }
}

impl ServerConfig {
    /// Load from the path in `LABELCHECK_CONFIG`, or `labelcheck.toml`
    /// in the working directory. An explicitly configured path must
    /// exist; the default path is optional and falls back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("LABELCHECK_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_service() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr.port(), 8000);
        assert_eq!(cfg.bare_weight_unit, BareWeightUnit::Grams);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: ServerConfig =
            toml::from_str("bind_addr = \"0.0.0.0:9100\"\nbare_weight_unit = \"kilograms\"")
                .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9100);
        assert_eq!(cfg.bare_weight_unit, BareWeightUnit::Kilograms);
        assert_eq!(cfg.tesseract_lang, "eng");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ServerConfig, _> = toml::from_str("no_such_key = 1");
        assert!(result.is_err());
    }
}
