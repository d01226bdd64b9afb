pub mod api;
pub mod fetcher;
pub mod pages;
pub mod qualities;
pub mod ranker;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use bilicopy_core::models::settings::{AppSettings, RankingPolicy};
use futures::future::join_all;

use crate::core::cache::MemoCache;
use crate::core::environment::EnvironmentProvider;
use crate::core::error::{ResolveError, ResolveResult};
use crate::core::http_client::JsonClient;
use crate::core::url_parser;
use crate::models::media::{QualityTier, RankedStreamList, StreamCandidate, TrackId, VideoIdentity};
use crate::platforms::bilibili::fetcher::StreamFetcher;
use crate::platforms::bilibili::pages::TrackResolver;
use crate::platforms::bilibili::qualities::{QualityEnumerator, QualityProbe};
use crate::platforms::bilibili::ranker::rank_candidates;

/// Page location in, ranked progressive streams out.
pub struct BilibiliResolver {
    tracks: TrackResolver,
    qualities: QualityEnumerator,
    fetcher: StreamFetcher,
    ranked: MemoCache<TrackId, RankedStreamList>,
    policy: RankingPolicy,
    concurrent: bool,
}

impl BilibiliResolver {
    pub fn new(client: Arc<dyn JsonClient>, settings: &AppSettings) -> Self {
        let api_base = settings.network.api_base.clone();
        Self {
            tracks: TrackResolver::new(client.clone(), api_base.clone()),
            qualities: QualityEnumerator::new(client.clone(), api_base.clone(), settings.selection.probe_qn),
            fetcher: StreamFetcher::new(client, api_base),
            ranked: MemoCache::new(),
            policy: settings.selection.ranking_policy,
            concurrent: settings.selection.concurrent_tier_fetch,
        }
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    /// Re-reads the page location on every call since the page may have
    /// navigated since the last load.
    pub async fn list_all_streams(&self, env: &dyn EnvironmentProvider) -> ResolveResult<RankedStreamList> {
        let identity = url_parser::extract_identity(env)?;
        self.list_streams_for(&identity).await
    }

    pub async fn list_streams_for(&self, identity: &VideoIdentity) -> ResolveResult<RankedStreamList> {
        let video_id = identity.video_id.as_str();
        let track_id = self
            .tracks
            .resolve_track(video_id, identity.page_number)
            .await?;

        if let Some(hit) = self.ranked.get(&track_id).await {
            tracing::debug!("[resolver] ranked list for cid {} served from cache", track_id);
            return Ok(hit);
        }

        let probe = match self.qualities.probe(video_id, track_id).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("[resolver] quality probe for cid {} failed: {}", track_id, e);
                QualityProbe::default()
            }
        };

        let tiers = if probe.tiers.is_empty() {
            let fallback = probe
                .served
                .clone()
                .unwrap_or_else(|| QualityTier::bare(self.qualities.probe_qn()));
            tracing::debug!("[resolver] no advertised tiers, falling back to qn {}", fallback.qn);
            vec![fallback]
        } else {
            probe.tiers.clone()
        };

        let mut collected = self.fetch_tiers(video_id, track_id, &tiers).await;
        if collected.is_empty() {
            tracing::debug!(
                "[resolver] no tier produced a candidate, using {} from the probe",
                probe.candidates.len()
            );
            collected = probe.candidates;
        }

        if collected.is_empty() {
            return Err(ResolveError::NoMp4(video_id.to_string()));
        }

        let ranked = rank_candidates(collected, self.policy);
        tracing::info!(
            "[resolver] {} p{} -> cid {}: {} stream(s)",
            video_id,
            identity.page_number,
            track_id,
            ranked.len()
        );
        self.ranked.insert(track_id, ranked.clone()).await;
        Ok(ranked)
    }

    /// Failed tiers are logged and left out. Results are merged in tier
    /// order regardless of completion order.
    async fn fetch_tiers(&self, video_id: &str, track_id: TrackId, tiers: &[QualityTier]) -> Vec<StreamCandidate> {
        let results: Vec<ResolveResult<Vec<StreamCandidate>>> = if self.concurrent {
            join_all(
                tiers
                    .iter()
                    .map(|tier| self.fetcher.fetch_candidates_for_tier(video_id, track_id, tier)),
            )
            .await
        } else {
            let mut out = Vec::with_capacity(tiers.len());
            for tier in tiers {
                out.push(self.fetcher.fetch_candidates_for_tier(video_id, track_id, tier).await);
            }
            out
        };

        tiers
            .iter()
            .zip(results)
            .flat_map(|(tier, result)| match result {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("[resolver] skipping qn {} ({}): {}", tier.qn, tier.label, e);
                    Vec::new()
                }
            })
            .collect()
    }
}
