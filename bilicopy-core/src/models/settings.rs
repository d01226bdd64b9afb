use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub appearance: AppearanceSettings,
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppearanceSettings {
    /// Empty means "follow the system language preference".
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub proxy: ProxySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSettings {
    #[serde(default)]
    pub ranking_policy: RankingPolicy,
    /// Quality code sent with the enumeration probe. 120 asks for 4K so the
    /// server advertises its full tier list.
    #[serde(default = "default_probe_qn")]
    pub probe_qn: u32,
    #[serde(default)]
    pub concurrent_tier_fetch: bool,
    #[serde(default = "default_flash_interval_ms")]
    pub flash_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// Smallest stream first, so the default pick is the cheapest one.
    #[default]
    Lowest,
    Highest,
}

impl std::str::FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowest" | "low" | "asc" => Ok(Self::Lowest),
            "highest" | "high" | "desc" => Ok(Self::Highest),
            other => Err(format!("unknown ranking policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxySettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_type")]
    pub proxy_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_api_base() -> String {
    "https://api.bilibili.com".into()
}

fn default_referer() -> String {
    "https://www.bilibili.com/".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_probe_qn() -> u32 {
    120
}

fn default_flash_interval_ms() -> u64 {
    1500
}

fn default_proxy_type() -> String {
    "http".into()
}

fn default_proxy_port() -> u16 {
    8080
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            referer: default_referer(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            proxy: ProxySettings::default(),
        }
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            ranking_policy: RankingPolicy::default(),
            probe_qn: default_probe_qn(),
            concurrent_tier_fetch: false,
            flash_interval_ms: default_flash_interval_ms(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            appearance: AppearanceSettings::default(),
            network: NetworkSettings::default(),
            selection: SelectionSettings::default(),
        }
    }
}
