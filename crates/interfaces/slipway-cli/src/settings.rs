use anyhow::Result;

use slipway_app_core::domain::AppSettings;
use slipway_app_core::persistence::FilePersistence;
use slipway_app_core::ports::SettingsRepo;

pub fn handle_show() -> Result<()> {
    let settings = FilePersistence::new().load()?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub fn handle_set(
    timeout_secs: Option<u64>,
    runner: Option<String>,
    script: Option<String>,
    copy_enabled: Option<bool>,
    destination: Option<String>,
    patterns: Option<String>,
) -> Result<()> {
    let persistence = FilePersistence::new();
    let mut settings: AppSettings = persistence.load()?;

    if let Some(t) = timeout_secs {
        settings.execution_timeout_secs = slipway_config::clamp_timeout_secs(t);
    }
    if let Some(r) = runner {
        settings.script_runner_path = r;
    }
    if let Some(s) = script {
        settings.build_script_path = s;
    }
    if let Some(c) = copy_enabled {
        settings.copy_enabled = c;
    }
    if let Some(d) = destination {
        settings.destination_dir = d;
    }
    if let Some(p) = patterns {
        settings.extension_patterns = p;
    }

    persistence.save(&settings)?;
    println!("Settings saved");
    Ok(())
}
