use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("could not extract a BV identifier from {0}")]
    Identity(String),
    #[error("failed to parse JSON from {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("network error on {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("network timeout on {0}")]
    Timeout(String),
    #[error("no track for {video_id} page {page}")]
    NoTrack { video_id: String, page: u32 },
    #[error("no MP4 candidates for cid {track_id} at qn {qn}")]
    NoCandidates { track_id: u64, qn: u32 },
    #[error("no MP4 found for {0}")]
    NoMp4(String),
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("not ready to copy: {0}")]
    NotReady(String),
}

impl ResolveError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Identity(_) => "identity",
            Self::Parse { .. } => "parse",
            Self::Network { .. } => "network",
            Self::Timeout(_) => "timeout",
            Self::NoTrack { .. } => "no_track",
            Self::NoCandidates { .. } => "no_candidates",
            Self::NoMp4(_) => "no_mp4",
            Self::Clipboard(_) => "clipboard",
            Self::NotReady(_) => "not_ready",
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
