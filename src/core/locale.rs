#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    ZhCn,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("zh") {
            Self::ZhCn
        } else {
            Self::En
        }
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Self::En => &EN,
            Self::ZhCn => &ZH_CN,
        }
    }
}

/// A non-empty override wins, otherwise only the first preference counts.
pub fn determine_locale(preferences: &[String], override_tag: Option<&str>) -> Locale {
    if let Some(tag) = override_tag.filter(|t| !t.trim().is_empty()) {
        return Locale::from_tag(tag);
    }
    preferences
        .first()
        .map(|p| Locale::from_tag(p))
        .unwrap_or_default()
}

pub struct Messages {
    pub button_idle: &'static str,
    pub button_fetching: &'static str,
    pub button_copied: &'static str,
    pub button_error: &'static str,
    pub button_title: &'static str,
    pub select_placeholder: &'static str,
    pub size_unknown: &'static str,
    pub error_extract_bvid: &'static str,
    pub error_bad_json: &'static str,
    pub error_no_mp4: &'static str,
    pub error_no_mp4_candidates: &'static str,
    pub error_not_ready: &'static str,
}

pub static EN: Messages = Messages {
    button_idle: "Copy MP4",
    button_fetching: "Fetching…",
    button_copied: "Copied ✅",
    button_error: "Error ❌",
    button_title: "Copy a progressive MP4 URL (for VRChat, custom players or direct download)",
    select_placeholder: "Select quality",
    size_unknown: "size unknown",
    error_extract_bvid: "Could not extract BV identifier.",
    error_bad_json: "Failed to parse JSON.",
    error_no_mp4: "No MP4 found.",
    error_no_mp4_candidates: "No MP4 candidates.",
    error_not_ready: "Nothing to copy yet.",
};

pub static ZH_CN: Messages = Messages {
    button_idle: "复制 MP4",
    button_fetching: "获取中…",
    button_copied: "已复制 ✅",
    button_error: "出错 ❌",
    button_title: "复制 MP4 直链（适用于 VRChat、自定义播放器或直接下载）",
    select_placeholder: "选择画质",
    size_unknown: "大小未知",
    error_extract_bvid: "无法提取 BV 号。",
    error_bad_json: "JSON 解析失败。",
    error_no_mp4: "未找到 MP4。",
    error_no_mp4_candidates: "没有可用的 MP4。",
    error_not_ready: "暂无可复制的链接。",
};
