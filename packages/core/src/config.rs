/// Configuration for the form designer session
use serde::{Deserialize, Serialize};

/// Environment variable overriding `dedupe_window_ms`
pub const ENV_DEDUPE_WINDOW_MS: &str = "FORMSMITH_DEDUPE_WINDOW_MS";

/// Environment variable overriding `export_file_stem`
pub const ENV_EXPORT_STEM: &str = "FORMSMITH_EXPORT_STEM";

/// Upper bound for `dedupe_window_ms`
const MAX_DEDUPE_WINDOW_MS: u64 = 10_000;

/// Configuration for `FormDesigner`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignerConfig {
    /// Window in which identical insert requests are suppressed
    pub dedupe_window_ms: u64,

    /// Stem of the export file name (`<stem>-config.json`)
    pub export_file_stem: String,

    /// Pretty-print exported documents
    pub pretty_export: bool,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            dedupe_window_ms: 100,
            export_file_stem: "form".to_string(),
            pretty_export: true,
        }
    }
}

impl DesignerConfig {
    /// Defaults with `FORMSMITH_*` environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Apply overrides from a variable lookup
    ///
    /// Unparseable or blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(window) = lookup(ENV_DEDUPE_WINDOW_MS).and_then(|v| v.trim().parse().ok()) {
            self.dedupe_window_ms = window;
        }
        if let Some(stem) = lookup(ENV_EXPORT_STEM).filter(|v| !v.trim().is_empty()) {
            self.export_file_stem = stem.trim().to_string();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.dedupe_window_ms == 0 {
            return Err("dedupe_window_ms must be greater than 0".to_string());
        }

        if self.dedupe_window_ms > MAX_DEDUPE_WINDOW_MS {
            return Err(format!(
                "dedupe_window_ms cannot exceed {}",
                MAX_DEDUPE_WINDOW_MS
            ));
        }

        if self.export_file_stem.is_empty() {
            return Err("export_file_stem cannot be empty".to_string());
        }

        if self
            .export_file_stem
            .chars()
            .any(|c| {
                c.is_control()
                    || matches!(c, '/' | '\\' | ':' | '*' | '?' | '<' | '>' | '|' | '"')
            })
        {
            return Err(format!(
                "export_file_stem '{}' contains characters not allowed in file names",
                self.export_file_stem
            ));
        }

        Ok(())
    }
}
