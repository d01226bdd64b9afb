use serde::{Deserialize, Serialize};

/// Server-assigned `cid` of one page of a video.
pub type TrackId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoIdentity {
    pub video_id: String,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub page: u32,
    pub cid: Option<TrackId>,
    pub part: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityTier {
    pub qn: u32,
    pub label: String,
}

impl QualityTier {
    pub fn new(qn: u32, label: impl Into<String>) -> Self {
        Self {
            qn,
            label: label.into(),
        }
    }

    /// Tier known only by its code.
    pub fn bare(qn: u32) -> Self {
        Self {
            qn,
            label: qn.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub url: String,
    pub size_bytes: Option<u64>,
    pub tier: Option<QualityTier>,
    pub is_backup_source: bool,
    pub source_part_index: usize,
}

impl StreamCandidate {
    pub fn qn(&self) -> Option<u32> {
        self.tier.as_ref().map(|t| t.qn)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedStreamList {
    pub streams: Vec<StreamCandidate>,
}

impl RankedStreamList {
    /// Default selection: the first entry.
    pub fn best(&self) -> Option<&StreamCandidate> {
        self.streams.first()
    }

    pub fn get(&self, index: usize) -> Option<&StreamCandidate> {
        self.streams.get(index)
    }

    /// Position of the first stream served at `qn`.
    pub fn position_of_qn(&self, qn: u32) -> Option<usize> {
        self.streams.iter().position(|c| c.qn() == Some(qn))
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
