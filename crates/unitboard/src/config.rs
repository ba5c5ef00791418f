//! CLI configuration: thin wrapper around `unitboard_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--source, --api-key, --timeout, ...).

use clap::ValueEnum;
use secrecy::SecretString;

use unitboard_core::{SourceFormat, SyncConfig};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat, PayloadFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use unitboard_config::{Config, Profile, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Output format: flag, then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Color mode: flag, then `defaults.color`, then auto.
pub fn color_mode(global: &GlobalOpts, config: &Config) -> ColorMode {
    global.color.unwrap_or_else(|| {
        ColorMode::from_str(&config.defaults.color, true).unwrap_or(ColorMode::Auto)
    })
}

/// Translate the active profile plus global flags into a `SyncConfig`.
///
/// Flags win over profile values. With `--source` no profile is needed;
/// the config file's `[defaults]` still apply.
pub fn resolve_sync_config(global: &GlobalOpts, config: &Config) -> Result<SyncConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(profile_not_found(&profile_name, config));
        }
        None if global.source.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoSource {
                path: config_path().display().to_string(),
            });
        }
    };
    apply_overrides(&mut profile, global);

    let mut sync =
        unitboard_config::profile_to_sync_config(&profile, &profile_name, &config.defaults)?;

    if let Some(ref key) = global.api_key {
        let param = profile.api_key_param.as_deref().unwrap_or("key");
        sync.source.location = sync
            .source
            .location
            .with_api_key(SecretString::from(key.clone()), param);
    }
    Ok(sync)
}

pub fn profile_not_found(name: &str, config: &Config) -> CliError {
    let available = if config.profiles.is_empty() {
        "(none)".to_owned()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    };
    CliError::ProfileNotFound {
        name: name.to_owned(),
        available,
    }
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref source) = global.source {
        // Anything with a scheme is a URL; otherwise a spreadsheet id.
        if source.contains("://") {
            profile.url = Some(source.clone());
            profile.sheet_id = None;
        } else {
            profile.url = None;
            profile.sheet_id = Some(source.clone());
        }
    }
    if let Some(format) = global.format {
        profile.format = Some(match format {
            PayloadFormat::Auto => SourceFormat::Auto,
            PayloadFormat::Csv => SourceFormat::Csv,
            PayloadFormat::Json => SourceFormat::JsonTable,
        });
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(interval) = global.interval {
        profile.refresh_interval = Some(interval);
    }
    if global.merge_booked {
        profile.booked_as_sold = Some(true);
    }
}
