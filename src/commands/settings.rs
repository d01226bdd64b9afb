use bilicopy_core::fs_paths::AppPaths;
use bilicopy_core::models::settings::AppSettings;

use crate::storage::config;

pub fn get_settings(paths: &dyn AppPaths) -> AppSettings {
    config::load_settings(paths)
}

/// Deep-merges a JSON patch such as `{"selection":{"ranking_policy":"highest"}}`
/// into the stored settings.
pub fn update_settings(paths: &dyn AppPaths, partial: &str) -> anyhow::Result<AppSettings> {
    let current = config::load_settings(paths);

    let patch: serde_json::Value =
        serde_json::from_str(partial).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;
    let mut current_val = serde_json::to_value(&current)?;
    merge_json(&mut current_val, &patch);
    let updated: AppSettings = serde_json::from_value(current_val)
        .map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
    config::save_settings(paths, &updated)?;

    Ok(updated)
}

/// Writes the loaded settings back so every field appears in the file.
pub fn init_settings(paths: &dyn AppPaths) -> anyhow::Result<AppSettings> {
    let current = config::load_settings(paths);
    config::save_settings(paths, &current)?;
    Ok(current)
}

pub fn reset_settings(paths: &dyn AppPaths) -> anyhow::Result<AppSettings> {
    let defaults = AppSettings::default();
    config::save_settings(paths, &defaults)?;
    Ok(defaults)
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if let Some(existing) = base_obj
                .get_mut(key)
                .filter(|v| v.is_object() && value.is_object())
            {
                merge_json(existing, value);
                continue;
            }
            base_obj.insert(key.clone(), value.clone());
        }
    }
}
