use crate::domain::AppSettings;

/// What the trigger surface (UI or CLI) hands over when the user starts a
/// build: the solution path plus the copy-stage inputs. Timeout and script
/// host paths come from settings.
#[derive(Debug, Clone)]
pub struct BuildInputs {
    pub solution_path: String,
    pub copy_enabled: bool,
    pub destination_dir: String,
    pub extension_patterns: String,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    // Settings
    LoadSettings,
    UpdateSettings(AppSettings),

    // Build lifecycle
    StartBuild(BuildInputs),
    CancelBuild,
}
