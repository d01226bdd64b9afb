use serde::Serialize;

/// What the copy control currently shows.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum UiState {
    Idle,
    Fetching,
    Ready,
    Copying,
    Copied,
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StreamOption {
    pub index: usize,
    pub label: String,
    pub url: String,
    pub qn: Option<u32>,
    pub size_bytes: Option<u64>,
}

/// Implemented by whatever renders the control. The pipeline pushes state
/// changes and the populated option list through it.
pub trait Presenter: Send + Sync {
    fn emit_state(&self, state: &UiState);
    fn emit_options(&self, options: &[StreamOption]);
}

/// Host-specific lookup of the place the control attaches to.
pub trait MountLocator: Send + Sync {
    fn find_mount_point(&self) -> bool;
}
