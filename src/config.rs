use directories::ProjectDirs;
use gridcalc_core::SheetLimits;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    limits: Option<SheetLimits>,
}

/// Parse the contents of a config file into sheet limits.
pub fn parse_config(content: &str) -> Result<SheetLimits, toml::de::Error> {
    let file: ConfigFile = toml::from_str(content)?;
    let limits = file.limits.unwrap_or_default();
    Ok(SheetLimits::new(limits.max_rows, limits.max_cols))
}

/// Load sheet limits from `config_file`, or from the user config dir.
///
/// Problems never abort startup: they are reported as warnings and the
/// defaults are used instead.
pub fn load_limits(config_file: Option<&PathBuf>, no_config: bool) -> (SheetLimits, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    if no_config && config_file.is_none() {
        return (SheetLimits::default(), warnings);
    }

    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (SheetLimits::default(), warnings);
    };
    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (SheetLimits::default(), warnings);
    }

    match read_config(&path) {
        Ok(limits) => (limits, warnings),
        Err(message) => {
            warnings.push(message);
            (SheetLimits::default(), warnings)
        }
    }
}

fn read_config(path: &Path) -> Result<SheetLimits, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    parse_config(&content).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
