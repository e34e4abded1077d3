use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub logging: Option<LoggingConfig>,
    pub pdf: Option<PdfConfig>,
    pub docx: Option<DocxConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub dir: Option<String>,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    pub header_exclusion: Option<f32>,
    pub footer_exclusion: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocxConfig {
    pub max_part_mb: Option<u64>,
}

pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_MAX_PART_MB: u64 = 64;

/// Platform config directory path: `<config_dir>/docparse/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docparse").join("config.toml"))
}

/// A config file that exists but could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load config by cascading CWD `.docparse.toml` over platform config.
/// CWD values override platform values.
///
/// Files that fail to load are skipped and returned alongside the config,
/// so the caller can report them once logging is up.
pub fn load_config() -> (ConfigFile, Vec<ConfigError>) {
    let mut skipped = Vec::new();
    let mut load = |path: &Path| {
        load_from_path(path).unwrap_or_else(|e| {
            skipped.push(e);
            None
        })
    };
    let platform = config_path().and_then(|p| load(&p));
    let cwd = load(Path::new(".docparse.toml"));

    let config = match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    };
    (config, skipped)
}

/// Load a config from a specific path. Returns `Ok(None)` if the file
/// doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let logging = |f: fn(&LoggingConfig) -> Option<String>| {
        overlay
            .logging
            .as_ref()
            .and_then(f)
            .or_else(|| base.logging.as_ref().and_then(f))
    };
    let pdf = |f: fn(&PdfConfig) -> Option<f32>| {
        overlay
            .pdf
            .as_ref()
            .and_then(f)
            .or_else(|| base.pdf.as_ref().and_then(f))
    };

    ConfigFile {
        logging: Some(LoggingConfig {
            dir: logging(|l| l.dir.clone()),
            filter: logging(|l| l.filter.clone()),
        }),
        pdf: Some(PdfConfig {
            header_exclusion: pdf(|p| p.header_exclusion),
            footer_exclusion: pdf(|p| p.footer_exclusion),
        }),
        docx: Some(DocxConfig {
            max_part_mb: overlay
                .docx
                .as_ref()
                .and_then(|d| d.max_part_mb)
                .or_else(|| base.docx.as_ref().and_then(|d| d.max_part_mb)),
        }),
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory for the log file. Logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub log_filter: String,
    /// Fraction of page height at the top whose text blocks are dropped (0 = keep all).
    pub pdf_header_exclusion: f32,
    /// Fraction of page height at the bottom whose text blocks are dropped (0 = keep all).
    pub pdf_footer_exclusion: f32,
    /// Upper bound on the uncompressed size of a DOCX part.
    pub docx_max_part_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(ConfigFile::default(), |_| None)
    }
}

impl Settings {
    /// Resolve settings from the process environment and config files,
    /// returning any config files that had to be skipped.
    pub fn load() -> (Self, Vec<ConfigError>) {
        let (file, skipped) = load_config();
        (Self::resolve(file, |key| std::env::var(key).ok()), skipped)
    }

    /// Resolve settings: env vars > config file > defaults.
    ///
    /// Values that fail to parse are ignored, as are exclusion ratios
    /// outside `0.0..1.0`.
    pub fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let env_nonempty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let ratio = |key: &str, from_file: Option<f32>| {
            env_nonempty(key)
                .and_then(|v| v.trim().parse::<f32>().ok())
                .or(from_file)
                .filter(|r| (0.0..1.0).contains(r))
                .unwrap_or(0.0)
        };

        let logging = file.logging.unwrap_or_default();
        let pdf = file.pdf.unwrap_or_default();
        let docx = file.docx.unwrap_or_default();

        let log_dir = env_nonempty("DOCPARSE_LOG_DIR")
            .or(logging.dir)
            .map(PathBuf::from);
        let log_filter = env_nonempty("DOCPARSE_LOG")
            .or(logging.filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let max_part_mb = env_nonempty("DOCPARSE_DOCX_MAX_PART_MB")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(docx.max_part_mb)
            .filter(|mb| *mb > 0)
            .unwrap_or(DEFAULT_MAX_PART_MB);

        Self {
            log_dir,
            log_filter,
            pdf_header_exclusion: ratio("DOCPARSE_PDF_HEADER_EXCLUSION", pdf.header_exclusion),
            pdf_footer_exclusion: ratio("DOCPARSE_PDF_FOOTER_EXCLUSION", pdf.footer_exclusion),
            docx_max_part_bytes: max_part_mb.saturating_mul(1024 * 1024),
        }
    }
}
