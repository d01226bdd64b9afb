use bilicopy_core::models::settings::{AppSettings, RankingPolicy};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bilicopy",
    version,
    about = "Copy a direct progressive MP4 link for a bilibili video page",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub copy: CopyArgs,

    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show, patch or reset the settings file
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    /// Video page URL, e.g. https://www.bilibili.com/video/BV1xx411c7mD?p=2
    pub url: Option<String>,

    /// Page number; overrides the `p` query parameter of the URL
    #[arg(short = 'p', long)]
    pub page: Option<u32>,

    /// Pick the stream with this quality code instead of the default
    #[arg(short, long, conflicts_with = "index")]
    pub quality: Option<u32>,

    /// Pick the stream at this position of the list
    #[arg(short, long)]
    pub index: Option<usize>,

    /// Print the available streams and stop
    #[arg(short, long)]
    pub list: bool,

    /// Print the URL instead of copying it
    #[arg(long)]
    pub no_copy: bool,

    /// Ordering of the stream list: lowest or highest
    #[arg(long)]
    pub policy: Option<RankingPolicy>,

    /// Fetch all quality tiers at once
    #[arg(long)]
    pub concurrent: bool,

    /// Message language, e.g. en or zh-CN
    #[arg(long)]
    pub lang: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Write the current settings (defaults filled in) to the settings file
    #[arg(long, conflicts_with_all = ["reset", "set"])]
    pub init: bool,

    /// Print the settings; implied when nothing is written
    #[arg(long)]
    pub show: bool,

    /// Write default settings
    #[arg(long, conflicts_with = "set")]
    pub reset: bool,

    /// Merge a JSON patch into the settings
    #[arg(long)]
    pub set: Option<String>,
}

impl ConfigArgs {
    pub fn writes(&self) -> bool {
        self.init || self.reset || self.set.is_some()
    }

    pub fn prints_settings(&self) -> bool {
        self.show || !self.writes()
    }
}

impl CopyArgs {
    /// Command-line flags win over the settings file.
    pub fn apply_to(&self, settings: &mut AppSettings) {
        if let Some(policy) = self.policy {
            settings.selection.ranking_policy = policy;
        }
        if self.concurrent {
            settings.selection.concurrent_tier_fetch = true;
        }
        if let Some(lang) = &self.lang {
            settings.appearance.language = lang.clone();
        }
    }

    /// Page URL with `--page` folded into its query.
    pub fn location(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        let Some(page) = self.page else {
            return Some(url.to_string());
        };
        match url::Url::parse(url) {
            Ok(mut parsed) => {
                let kept: Vec<(String, String)> = parsed
                    .query_pairs()
                    .filter(|(k, _)| k != "p")
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                parsed
                    .query_pairs_mut()
                    .clear()
                    .extend_pairs(kept)
                    .append_pair("p", &page.to_string());
                Some(parsed.to_string())
            }
            Err(_) => Some(url.to_string()),
        }
    }
}
