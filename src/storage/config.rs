use bilicopy_core::fs_paths::AppPaths;
use bilicopy_core::models::settings::AppSettings;

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(paths: &dyn AppPaths) -> AppSettings {
    let path = paths.settings_file();
    let raw = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(_) => return AppSettings::default(),
    };

    match serde_json::from_str::<AppSettings>(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("[config] ignoring {}: {}", path.display(), e);
            AppSettings::default()
        }
    }
}

pub fn save_settings(paths: &dyn AppPaths, settings: &AppSettings) -> anyhow::Result<()> {
    let dir = paths.config_dir();
    std::fs::create_dir_all(&dir)?;
    let val = serde_json::to_string_pretty(settings)?;
    std::fs::write(paths.settings_file(), val)?;
    Ok(())
}
