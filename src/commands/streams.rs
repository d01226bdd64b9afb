use std::sync::Arc;
use std::time::Duration;

use bilicopy_core::core::events::Presenter;
use bilicopy_core::models::settings::AppSettings;

use crate::cli::CopyArgs;
use crate::core::clipboard::{ClipboardSink, SystemClipboard};
use crate::core::environment::{DesktopEnvironment, EnvironmentProvider};
use crate::core::events::{TerminalMount, TerminalPresenter};
use crate::core::http_client::{JsonClient, ReqwestJsonClient};
use crate::core::locale::{determine_locale, Messages};
use crate::core::session::CopySession;
use crate::platforms::bilibili::BilibiliResolver;

pub fn messages_for(env: &dyn EnvironmentProvider, settings: &AppSettings) -> &'static Messages {
    let lang = settings.appearance.language.as_str();
    determine_locale(&env.preferred_languages(), Some(lang)).messages()
}

/// Loads the stream list for the page and either lists it, prints the chosen
/// URL, or copies it. Returns the chosen URL, or `None` for `--list`.
pub async fn copy_stream(args: &CopyArgs, settings: &AppSettings) -> anyhow::Result<Option<String>> {
    let location = args
        .location()
        .ok_or_else(|| anyhow::anyhow!("a video page URL is required"))?;
    let env = DesktopEnvironment::new(location);
    let messages = messages_for(&env, settings);

    let client: Arc<dyn JsonClient> = Arc::new(ReqwestJsonClient::new(&settings.network)?);
    let resolver = Arc::new(BilibiliResolver::new(client, settings));
    let clipboard: Arc<dyn ClipboardSink> = Arc::new(SystemClipboard);
    let presenter: Arc<dyn Presenter> = Arc::new(TerminalPresenter::new(messages, args.list));
    let session = CopySession::new(
        resolver,
        clipboard,
        presenter,
        messages,
        Duration::from_millis(settings.selection.flash_interval_ms),
    );

    session.attach(&TerminalMount);
    session
        .request_load(&env)
        .await
        .map_err(|e| anyhow::anyhow!("{}", crate::core::session::user_message(&e, messages)))?;

    if args.list {
        return Ok(None);
    }

    if let Some(qn) = args.quality {
        if !session.select_qn(qn).await {
            anyhow::bail!("no stream with quality {} (use --list)", qn);
        }
    } else if let Some(index) = args.index {
        if !session.select(index).await {
            anyhow::bail!("no stream at position {} (use --list)", index);
        }
    }

    if args.no_copy {
        let chosen = session
            .selected()
            .await
            .ok_or_else(|| anyhow::anyhow!("{}", messages.error_no_mp4))?;
        return Ok(Some(chosen.url));
    }

    match session.copy_selected().await {
        Ok(url) => Ok(Some(url)),
        Err(e) => {
            session.recover().await;
            Err(anyhow::anyhow!("{}", crate::core::session::user_message(&e, messages)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::StaticEnvironment;
    use crate::core::locale::{EN, ZH_CN};

    #[test]
    fn language_setting_overrides_os() {
        let env = StaticEnvironment {
            location: String::new(),
            languages: vec!["en-US".into()],
        };
        let mut settings = AppSettings::default();
        assert!(std::ptr::eq(messages_for(&env, &settings), &EN));
        settings.appearance.language = "zh-CN".into();
        assert!(std::ptr::eq(messages_for(&env, &settings), &ZH_CN));
    }

    #[test]
    fn empty_language_follows_os() {
        let env = StaticEnvironment {
            location: String::new(),
            languages: vec!["zh-TW".into(), "en".into()],
        };
        let mut settings = AppSettings::default();
        settings.appearance.language = String::new();
        assert!(std::ptr::eq(messages_for(&env, &settings), &ZH_CN));
    }

    #[tokio::test]
    async fn unusable_network_settings_fail_before_loading() {
        let args = CopyArgs {
            url: Some("https://www.bilibili.com/video/BV1xx411c7mD".into()),
            page: None,
            quality: None,
            index: None,
            list: true,
            no_copy: true,
            policy: None,
            concurrent: false,
            lang: None,
        };
        let mut settings = AppSettings::default();
        settings.network.user_agent = "bilicopy\n1.0".into();
        settings.network.api_base = "http://127.0.0.1:9".into();
        let err = copy_stream(&args, &settings).await.unwrap_err();
        assert!(format!("{:#}", err).contains("builder error"), "{:#}", err);
    }

    #[tokio::test]
    async fn missing_url_is_an_error() {
        let args = CopyArgs {
            url: None,
            page: None,
            quality: None,
            index: None,
            list: false,
            no_copy: true,
            policy: None,
            concurrent: false,
            lang: None,
        };
        assert!(copy_stream(&args, &AppSettings::default()).await.is_err());
    }
}
