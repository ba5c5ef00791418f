//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, ConfigInitArgs, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` safe to print: plaintext keys masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
    }
    cfg
}

fn to_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg)
        .map(|s| s.trim_end().to_owned())
        .unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

fn init_profile(args: &ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config()?;

    if cfg.profiles.contains_key(&args.name) && !args.force {
        return Err(CliError::ProfileExists {
            name: args.name.clone(),
        });
    }

    let profile = Profile {
        url: args.url.clone(),
        sheet_id: args.sheet_id.clone(),
        sheet: args.sheet.clone(),
        api_key_env: args.api_key_env.clone(),
        ..Profile::default()
    };
    // Reject an unusable source before it reaches disk.
    unitboard_config::profile_source(&profile, &args.name)?;

    let first = cfg.profiles.is_empty();
    cfg.profiles.insert(args.name.clone(), profile);
    let default_missing = cfg
        .default_profile
        .as_ref()
        .is_none_or(|name| !cfg.profiles.contains_key(name));
    if first || default_missing {
        cfg.default_profile = Some(args.name.clone());
    }

    let path = config::save_config(&cfg)?;
    output::print_note(
        &format!("✓ Profile '{}' written to {}", args.name, path.display()),
        global.quiet,
    );
    Ok(())
}

// ── Dispatch ────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init(ref init) => init_profile(init, global),

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let format = config::output_format(global, &cfg);
            let out = output::render_single(format, &redacted(&cfg), to_toml, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Use { ref name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(name) {
                return Err(config::profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_note(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_masks_plaintext_keys_only() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "a".into(),
            Profile {
                api_key: Some("secret-value".into()),
                api_key_env: Some("SHEET_KEY".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert("b".into(), Profile::default());

        let shown = to_toml(&redacted(&cfg));
        assert!(!shown.contains("secret-value"));
        assert!(shown.contains(REDACTED));
        assert!(shown.contains("SHEET_KEY"));
        assert!(cfg.profiles["b"].api_key.is_none());
    }
}
