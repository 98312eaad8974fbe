//! # Config Loader
//!
//! Reads a capture blueprint (`[processing]`, `[capture]`, `[source]`,
//! `[[sinks]]`) from TOML or JSON and checks it before any recorder or sink
//! is built from it.
//!
//! The format follows the file extension. Files without one (`kinetrace`,
//! piped `/dev/stdin`) are sniffed: a leading `{` means JSON, anything else
//! is read as TOML. Unknown extensions such as `.yaml` are rejected rather
//! than guessed.
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("capture.toml")).unwrap();
//! println!("lead-in frames: {}", blueprint.processing.delay_depth);
//! ```

mod parser;
mod validator;

pub use contracts::CaptureBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::{debug, instrument};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a blueprint file.
    ///
    /// # Errors
    /// I/O failures, an unsupported extension, malformed content, or a
    /// blueprint that fails validation.
    #[instrument(name = "config_load", fields(path = %path.display()))]
    pub fn load_from_path(path: &Path) -> Result<CaptureBlueprint, ContractError> {
        let content = std::fs::read_to_string(path)?;
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ConfigFormat::from_extension(ext).ok_or_else(|| {
                ContractError::config_parse(format!("unsupported config format: .{ext}"))
            })?,
            None => ConfigFormat::sniff(&content),
        };

        let blueprint = Self::load_from_str(&content, format)?;
        debug!(
            ?format,
            subject = %blueprint.capture.subject,
            delay_depth = blueprint.processing.delay_depth,
            sinks = blueprint.sinks.len(),
            "blueprint loaded"
        );
        Ok(blueprint)
    }

    /// Parse then validate blueprint text in a known format.
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<CaptureBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-check a blueprint after command-line overrides were applied.
    pub fn validate(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    pub fn to_toml(blueprint: &CaptureBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint).map_err(|e| ContractError::config_decode("TOML", e))
    }

    pub fn to_json(blueprint: &CaptureBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint).map_err(|e| ContractError::config_decode("JSON", e))
    }
}
