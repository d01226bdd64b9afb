use regex::Regex;
use std::sync::LazyLock;

use crate::core::environment::EnvironmentProvider;
use crate::core::error::{ResolveError, ResolveResult};
use crate::models::media::VideoIdentity;

static BVID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/video/(BV[0-9A-Za-z]+)").unwrap());

pub fn extract_identity(env: &dyn EnvironmentProvider) -> ResolveResult<VideoIdentity> {
    parse_location(&env.location())
}

/// Accepts a full page URL or a bare path such as `/video/BV1xx411c7mD?p=2`.
pub fn parse_location(location: &str) -> ResolveResult<VideoIdentity> {
    let (path, query) = match url::Url::parse(location) {
        Ok(parsed) => (parsed.path().to_string(), parsed.query().map(str::to_string)),
        Err(_) => match location.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (location.to_string(), None),
        },
    };

    let video_id = BVID_RE
        .captures(&path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ResolveError::Identity(location.to_string()))?;

    let page_param = query.as_deref().and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == "p")
            .map(|(_, v)| v.into_owned())
    });

    Ok(VideoIdentity {
        video_id,
        page_number: parse_page_number(page_param.as_deref()),
    })
}

/// Leading decimal digits win, anything else (including zero) is page 1.
pub fn parse_page_number(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else { return 1 };
    let digits: String = raw
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => 1,
    }
}
