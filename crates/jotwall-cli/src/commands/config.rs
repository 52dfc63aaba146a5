use jotwall_core::config::ClientConfig;
use jotwall_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            supabase_url,
            supabase_anon_key,
            no_activate,
        ),
        ConfigCommands::Show { profile } => run_config_show(profile.as_deref().or(global_profile)),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged = merge_profile(
        ClientConfig::new(supabase_url, supabase_anon_key),
        ClientConfig::from_env(),
        &existing,
    )?;

    *config.profile_mut_or_default(&profile_name) = merged;
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    let path = config.save().map_err(CliError::Config)?;

    println!("Saved profile '{profile_name}' to {}", path.display());
    if no_activate {
        if let Some(active) = config.active_profile.as_deref() {
            println!("Active profile remains '{active}'");
        }
    } else {
        println!("Active profile set to '{profile_name}'");
    }
    Ok(())
}

/// Explicit flags, then environment, then what the profile already had.
///
/// The merged pair must be complete and well-formed.
pub fn merge_profile(
    explicit: ClientConfig,
    env: ClientConfig,
    existing: &CliProfile,
) -> Result<CliProfile, CliError> {
    let merged = explicit.or(env).or(existing.client_config());
    if merged.resolve()?.is_none() {
        return Err(CliError::Config(
            "Missing Supabase config. Pass --supabase-url and --supabase-anon-key or set SUPABASE_URL and SUPABASE_ANON_KEY.".to_string(),
        ));
    }

    Ok(CliProfile {
        supabase_url: normalize_text_option(merged.supabase_url)
            .map(|url| url.trim_end_matches('/').to_string()),
        supabase_anon_key: merged.supabase_anon_key,
    })
}

pub fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let Some(profile) = config.profile(&profile_name) else {
        println!("Profile '{profile_name}' is not configured.");
        return Ok(());
    };

    println!("profile: {profile_name}");
    println!(
        "supabase_url: {}",
        profile.supabase_url().as_deref().unwrap_or("(unset)")
    );
    println!(
        "supabase_anon_key: {}",
        profile
            .supabase_anon_key()
            .map_or_else(|| "(unset)".to_string(), |key| mask_secret(&key))
    );
    Ok(())
}

/// Keep only the last four characters visible.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    let visible = value.chars().skip(count.saturating_sub(4)).collect::<String>();
    format!("{}{visible}", "*".repeat(count.saturating_sub(4).min(8)))
}
