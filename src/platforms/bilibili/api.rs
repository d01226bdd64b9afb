use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::error::{ResolveError, ResolveResult};
use crate::models::media::{PageDescriptor, QualityTier, StreamCandidate};

const PROGRESSIVE_MARKER: &str = ".mp4";
const SEGMENTED_MARKER: &str = ".m4s";

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct PageItem {
    pub page: Option<u32>,
    pub cid: Option<u64>,
    #[serde(default)]
    pub part: String,
}

impl From<PageItem> for PageDescriptor {
    fn from(item: PageItem) -> Self {
        Self {
            page: item.page.unwrap_or(0),
            cid: item.cid.filter(|c| *c != 0),
            part: item.part,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayUrlData {
    pub quality: Option<u32>,
    pub accept_quality: Option<Vec<u32>>,
    pub accept_description: Option<Vec<String>>,
    pub support_formats: Option<Vec<SupportFormat>>,
    pub durl: Option<Vec<DurlEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct SupportFormat {
    pub quality: u32,
    #[serde(default)]
    pub new_description: String,
    #[serde(default)]
    pub display_desc: String,
    #[serde(default)]
    pub format: String,
}

impl SupportFormat {
    fn label(&self) -> String {
        [&self.new_description, &self.display_desc, &self.format]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| self.quality.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct DurlEntry {
    pub url: Option<String>,
    /// Entries may be `null`; those are skipped.
    pub backup_url: Option<Vec<Option<String>>>,
    pub size: Option<u64>,
}

pub fn pagelist_url(api_base: &str, video_id: &str) -> String {
    format!(
        "{}/x/player/pagelist?bvid={}&jsonp=jsonp",
        api_base.trim_end_matches('/'),
        urlencoding::encode(video_id)
    )
}

/// Pinned to the single-file response shape: `fnval=0` disables DASH.
pub fn playurl_url(api_base: &str, video_id: &str, track_id: u64, qn: u32) -> String {
    format!(
        "{}/x/player/playurl?bvid={}&cid={}&qn={}&fourk=1&fnver=0&fnval=0&otype=json&platform=html5",
        api_base.trim_end_matches('/'),
        urlencoding::encode(video_id),
        track_id,
        qn
    )
}

pub fn decode<T: DeserializeOwned>(url: &str, value: serde_json::Value) -> ResolveResult<ApiEnvelope<T>> {
    serde_json::from_value(value).map_err(|e| ResolveError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub fn is_progressive_mp4(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains(PROGRESSIVE_MARKER) && !lower.contains(SEGMENTED_MARKER)
}

/// Tier list the server advertises. `support_formats` carries proper
/// descriptions, so it wins over the bare `accept_quality` codes.
pub fn advertised_tiers(data: &PlayUrlData) -> Vec<QualityTier> {
    let mut tiers: Vec<QualityTier> = match data.support_formats.as_deref() {
        Some(formats) if !formats.is_empty() => formats
            .iter()
            .map(|f| QualityTier::new(f.quality, f.label()))
            .collect(),
        _ => {
            let descriptions = data.accept_description.as_deref().unwrap_or_default();
            data.accept_quality
                .as_deref()
                .unwrap_or_default()
                .iter()
                .enumerate()
                .map(|(i, qn)| match descriptions.get(i) {
                    Some(desc) if !desc.is_empty() => QualityTier::new(*qn, desc.clone()),
                    _ => QualityTier::bare(*qn),
                })
                .collect()
        }
    };

    tiers.sort_by_key(|t| t.qn);
    tiers.dedup_by_key(|t| t.qn);
    tiers
}

/// Tier the server actually served, which can be lower than the one asked for.
pub fn served_tier(data: &PlayUrlData, requested: Option<&QualityTier>) -> Option<QualityTier> {
    match (data.quality, requested) {
        (Some(q), Some(req)) if q == req.qn => Some(req.clone()),
        (Some(q), _) => Some(
            advertised_tiers(data)
                .into_iter()
                .find(|t| t.qn == q)
                .unwrap_or_else(|| QualityTier::bare(q)),
        ),
        (None, req) => req.cloned(),
    }
}

/// One candidate per part: the primary URL when it is a progressive MP4,
/// otherwise the first backup that is.
pub fn extract_candidates(data: &PlayUrlData, tier: Option<&QualityTier>) -> Vec<StreamCandidate> {
    let Some(parts) = data.durl.as_deref() else {
        return Vec::new();
    };

    parts
        .iter()
        .enumerate()
        .filter_map(|(index, part)| {
            let size_bytes = part.size.filter(|s| *s > 0);
            let primary = part
                .url
                .as_deref()
                .filter(|u| is_progressive_mp4(u))
                .map(|u| (u, false));
            let backup = || {
                part.backup_url
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .flatten()
                    .find(|u| is_progressive_mp4(u))
                    .map(|u| (u.as_str(), true))
            };
            primary.or_else(backup).map(|(url, is_backup)| StreamCandidate {
                url: url.to_string(),
                size_bytes,
                tier: tier.cloned(),
                is_backup_source: is_backup,
                source_part_index: index,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn play_data(value: serde_json::Value) -> PlayUrlData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn container_filter() {
        assert!(is_progressive_mp4("https://cn.bilivideo.com/a/b-1-192.MP4?e=1"));
        assert!(!is_progressive_mp4("https://cn.bilivideo.com/a/b-30080.m4s?x=.mp4"));
        assert!(!is_progressive_mp4("https://cn.bilivideo.com/a/b.flv"));
    }

    #[test]
    fn backup_used_when_primary_is_segmented() {
        let data = play_data(json!({
            "quality": 64,
            "durl": [{
                "url": "https://up.example/v-30064.m4s",
                "backup_url": ["https://bak.example/v-64.mp4?x=1"],
                "size": 1234
            }]
        }));
        let tier = QualityTier::new(64, "720P");
        let got = extract_candidates(&data, Some(&tier));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].url, "https://bak.example/v-64.mp4?x=1");
        assert!(got[0].is_backup_source);
        assert_eq!(got[0].size_bytes, Some(1234));
        assert_eq!(got[0].source_part_index, 0);
    }

    #[test]
    fn null_backup_entries_are_skipped() {
        let data = play_data(json!({
            "quality": 32,
            "durl": [{
                "url": "https://up.example/v-30032.m4s",
                "backup_url": [null, "", "https://bak.example/v-32.mp4"],
                "size": 64
            }]
        }));
        let got = extract_candidates(&data, None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].url, "https://bak.example/v-32.mp4");
        assert!(got[0].is_backup_source);
    }

    #[test]
    fn primary_wins_over_backups() {
        let data = play_data(json!({
            "durl": [{
                "url": "https://up.example/a.mp4",
                "backup_url": ["https://bak.example/a.mp4"]
            }]
        }));
        let got = extract_candidates(&data, None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].url, "https://up.example/a.mp4");
        assert!(!got[0].is_backup_source);
        assert_eq!(got[0].size_bytes, None);
    }

    #[test]
    fn parts_without_mp4_are_skipped() {
        let data = play_data(json!({
            "durl": [
                {"url": "https://up.example/a.flv", "backup_url": null, "size": 0},
                {"url": "https://up.example/b.mp4", "size": 10}
            ]
        }));
        let got = extract_candidates(&data, None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].source_part_index, 1);
    }

    #[test]
    fn missing_durl_gives_nothing() {
        assert!(extract_candidates(&PlayUrlData::default(), None).is_empty());
    }

    #[test]
    fn support_formats_preferred_over_accept_quality() {
        let data = play_data(json!({
            "accept_quality": [80, 64],
            "accept_description": ["1080P", "720P"],
            "support_formats": [
                {"quality": 80, "new_description": "1080P 高清"},
                {"quality": 16, "display_desc": "360P"},
                {"quality": 80, "new_description": "dup"}
            ]
        }));
        let tiers = advertised_tiers(&data);
        assert_eq!(
            tiers,
            vec![QualityTier::new(16, "360P"), QualityTier::new(80, "1080P 高清")]
        );
    }

    #[test]
    fn accept_quality_fallback_pairs_descriptions() {
        let data = play_data(json!({
            "accept_quality": [64, 32, 116],
            "accept_description": ["720P", "480P"]
        }));
        let tiers = advertised_tiers(&data);
        assert_eq!(
            tiers,
            vec![
                QualityTier::new(32, "480P"),
                QualityTier::new(64, "720P"),
                QualityTier::bare(116),
            ]
        );
    }

    #[test]
    fn served_tier_reports_downgrade() {
        let data = play_data(json!({
            "quality": 32,
            "support_formats": [{"quality": 32, "new_description": "480P"}]
        }));
        let asked = QualityTier::new(80, "1080P");
        assert_eq!(served_tier(&data, Some(&asked)), Some(QualityTier::new(32, "480P")));
    }

    #[test]
    fn urls_carry_progressive_parameters() {
        let url = playurl_url("https://api.bilibili.com/", "BV1xx411c7mD", 42, 80);
        assert!(url.starts_with("https://api.bilibili.com/x/player/playurl?"));
        assert!(url.contains("&qn=80&"));
        assert!(url.contains("fnval=0"));
        assert!(url.contains("platform=html5"));
        assert_eq!(
            pagelist_url("https://api.bilibili.com", "BV1xx411c7mD"),
            "https://api.bilibili.com/x/player/pagelist?bvid=BV1xx411c7mD&jsonp=jsonp"
        );
    }

    #[test]
    fn page_item_zero_cid_is_missing() {
        let item: PageItem = serde_json::from_value(json!({"page": 1, "cid": 0})).unwrap();
        let desc = PageDescriptor::from(item);
        assert_eq!(desc.cid, None);
    }
}
