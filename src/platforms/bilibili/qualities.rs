use std::sync::Arc;

use crate::core::error::{ResolveError, ResolveResult};
use crate::core::http_client::JsonClient;
use crate::models::media::{QualityTier, StreamCandidate, TrackId};
use crate::platforms::bilibili::api::{self, PlayUrlData};

/// Everything learned from the enumeration request.
#[derive(Debug, Clone, Default)]
pub struct QualityProbe {
    /// Advertised tiers, deduplicated and ascending by code.
    pub tiers: Vec<QualityTier>,
    pub served: Option<QualityTier>,
    /// Progressive URLs that came back with the probe itself.
    pub candidates: Vec<StreamCandidate>,
}

pub struct QualityEnumerator {
    client: Arc<dyn JsonClient>,
    api_base: String,
    probe_qn: u32,
}

impl QualityEnumerator {
    pub fn new(client: Arc<dyn JsonClient>, api_base: impl Into<String>, probe_qn: u32) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            probe_qn,
        }
    }

    pub fn probe_qn(&self) -> u32 {
        self.probe_qn
    }

    pub async fn enumerate_qualities(&self, video_id: &str, track_id: TrackId) -> ResolveResult<Vec<QualityTier>> {
        Ok(self.probe(video_id, track_id).await?.tiers)
    }

    pub async fn probe(&self, video_id: &str, track_id: TrackId) -> ResolveResult<QualityProbe> {
        let url = api::playurl_url(&self.api_base, video_id, track_id, self.probe_qn);
        let json = self.client.get_json(&url).await?;
        let envelope = api::decode::<PlayUrlData>(&url, json)?;

        if envelope.code != 0 {
            return Err(ResolveError::Network {
                url,
                reason: format!("API code {}: {}", envelope.code, envelope.message),
            });
        }

        let data = envelope.data.unwrap_or_default();
        let tiers = api::advertised_tiers(&data);
        let served = api::served_tier(&data, None);
        let candidates = api::extract_candidates(&data, served.as_ref());

        tracing::debug!(
            "[playurl] cid {} advertises {:?}, served {:?}",
            track_id,
            tiers.iter().map(|t| t.qn).collect::<Vec<_>>(),
            served.as_ref().map(|t| t.qn)
        );

        Ok(QualityProbe {
            tiers,
            served,
            candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::bilibili::fixtures::{self, FakeClient, API};
    use serde_json::json;

    #[tokio::test]
    async fn tiers_come_back_sorted_and_unique() {
        let client = Arc::new(FakeClient::new().route(
            &fixtures::qn_route(120),
            fixtures::probe(80, &[(80, "1080P"), (16, "360P"), (64, "720P"), (16, "360P again")]),
        ));
        let enumerator = QualityEnumerator::new(client, API, 120);
        let tiers = enumerator.enumerate_qualities("BV1test", 7).await.unwrap();
        let codes: Vec<u32> = tiers.iter().map(|t| t.qn).collect();
        assert_eq!(codes, vec![16, 64, 80]);
        assert_eq!(tiers[0].label, "360P");
    }

    #[tokio::test]
    async fn probe_keeps_its_own_candidates() {
        let client = Arc::new(FakeClient::new().route(
            &fixtures::qn_route(120),
            json!({"code": 0, "data": {
                "quality": 32,
                "accept_quality": [32],
                "accept_description": ["480P"],
                "durl": [{"url": "https://cdn.test/v-32.mp4", "size": 900}]
            }}),
        ));
        let probe = QualityEnumerator::new(client, API, 120).probe("BV1test", 7).await.unwrap();
        assert_eq!(probe.served, Some(QualityTier::new(32, "480P")));
        assert_eq!(probe.candidates.len(), 1);
        assert_eq!(probe.candidates[0].qn(), Some(32));
    }

    #[tokio::test]
    async fn empty_tier_list_is_not_an_error() {
        let client = Arc::new(FakeClient::new().route(
            &fixtures::qn_route(120),
            json!({"code": 0, "data": {"quality": 64}}),
        ));
        let tiers = QualityEnumerator::new(client, API, 120)
            .enumerate_qualities("BV1test", 7)
            .await
            .unwrap();
        assert!(tiers.is_empty());
    }

    #[tokio::test]
    async fn api_error_code_fails_the_probe() {
        let client = Arc::new(FakeClient::new().route(
            &fixtures::qn_route(120),
            json!({"code": -400, "message": "请求错误"}),
        ));
        let err = QualityEnumerator::new(client, API, 120).probe("BV1test", 7).await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
