use std::path::PathBuf;

pub trait AppPaths: Send + Sync {
    fn config_dir(&self) -> PathBuf;

    fn settings_file(&self) -> PathBuf {
        self.config_dir().join("settings.json")
    }
}

pub struct DesktopPaths;

impl AppPaths for DesktopPaths {
    fn config_dir(&self) -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("bilicopy"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Fixed directory, used by tests and portable setups.
pub struct FixedPaths(pub PathBuf);

impl AppPaths for FixedPaths {
    fn config_dir(&self) -> PathBuf {
        self.0.clone()
    }
}
