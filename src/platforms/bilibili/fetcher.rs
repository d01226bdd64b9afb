use std::sync::Arc;

use crate::core::cache::MemoCache;
use crate::core::error::{ResolveError, ResolveResult};
use crate::core::http_client::JsonClient;
use crate::models::media::{QualityTier, StreamCandidate, TrackId};
use crate::platforms::bilibili::api::{self, PlayUrlData};

pub struct StreamFetcher {
    client: Arc<dyn JsonClient>,
    api_base: String,
    cache: MemoCache<(TrackId, u32), Vec<StreamCandidate>>,
}

impl StreamFetcher {
    pub fn new(client: Arc<dyn JsonClient>, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            cache: MemoCache::new(),
        }
    }

    /// Progressive MP4 candidates for one tier. Only successful lookups are
    /// cached, keyed by the requested tier.
    pub async fn fetch_candidates_for_tier(
        &self,
        video_id: &str,
        track_id: TrackId,
        tier: &QualityTier,
    ) -> ResolveResult<Vec<StreamCandidate>> {
        let key = (track_id, tier.qn);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!("[playurl] cache hit for cid {} qn {}", track_id, tier.qn);
            return Ok(hit);
        }

        let url = api::playurl_url(&self.api_base, video_id, track_id, tier.qn);
        let json = self.client.get_json(&url).await?;
        let envelope = api::decode::<PlayUrlData>(&url, json)?;

        let no_candidates = || ResolveError::NoCandidates {
            track_id,
            qn: tier.qn,
        };

        if envelope.code != 0 {
            tracing::debug!(
                "[playurl] cid {} qn {} answered code {}: {}",
                track_id,
                tier.qn,
                envelope.code,
                envelope.message
            );
            return Err(no_candidates());
        }

        let data = envelope.data.unwrap_or_default();
        let served = api::served_tier(&data, Some(tier));
        let candidates = api::extract_candidates(&data, served.as_ref());
        if candidates.is_empty() {
            return Err(no_candidates());
        }

        if served.as_ref().map(|t| t.qn) != Some(tier.qn) {
            tracing::debug!(
                "[playurl] cid {} asked qn {}, served {:?}",
                track_id,
                tier.qn,
                served.as_ref().map(|t| t.qn)
            );
        }

        self.cache.insert(key, candidates.clone()).await;
        Ok(candidates)
    }
}
