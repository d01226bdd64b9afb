use std::sync::Arc;
use std::time::Duration;

use bilicopy_core::core::events::{MountLocator, Presenter, StreamOption, UiState};
use tokio::sync::Mutex;

use crate::core::clipboard::ClipboardSink;
use crate::core::environment::EnvironmentProvider;
use crate::core::error::{ResolveError, ResolveResult};
use crate::core::locale::Messages;
use crate::models::media::{RankedStreamList, StreamCandidate};
use crate::platforms::bilibili::BilibiliResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Copying,
    Failed,
}

struct SessionInner {
    phase: Phase,
    streams: Option<RankedStreamList>,
    selected: usize,
}

/// Load / select / copy flow behind one copy control. A successful load is
/// kept until [`CopySession::reset_guard`]; further load requests are no-ops.
pub struct CopySession {
    resolver: Arc<BilibiliResolver>,
    clipboard: Arc<dyn ClipboardSink>,
    presenter: Arc<dyn Presenter>,
    messages: &'static Messages,
    flash_interval: Duration,
    inner: Mutex<SessionInner>,
}

impl CopySession {
    pub fn new(
        resolver: Arc<BilibiliResolver>,
        clipboard: Arc<dyn ClipboardSink>,
        presenter: Arc<dyn Presenter>,
        messages: &'static Messages,
        flash_interval: Duration,
    ) -> Self {
        Self {
            resolver,
            clipboard,
            presenter,
            messages,
            flash_interval,
            inner: Mutex::new(SessionInner {
                phase: Phase::Idle,
                streams: None,
                selected: 0,
            }),
        }
    }

    /// Renders the idle control if the host has somewhere to put it.
    pub fn attach(&self, locator: &dyn MountLocator) -> bool {
        if !locator.find_mount_point() {
            tracing::debug!("[session] no mount point yet");
            return false;
        }
        self.presenter.emit_state(&UiState::Idle);
        true
    }

    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.phase
    }

    pub async fn streams(&self) -> Option<RankedStreamList> {
        self.inner.lock().await.streams.clone()
    }

    pub async fn selected(&self) -> Option<StreamCandidate> {
        let inner = self.inner.lock().await;
        inner
            .streams
            .as_ref()
            .and_then(|s| s.get(inner.selected))
            .cloned()
    }

    /// Returns `Ok(false)` when the request was swallowed by the guard.
    pub async fn request_load(&self, env: &dyn EnvironmentProvider) -> ResolveResult<bool> {
        {
            let mut inner = self.inner.lock().await;
            if inner.streams.is_some() || inner.phase != Phase::Idle {
                tracing::debug!("[session] load ignored in {:?}", inner.phase);
                return Ok(false);
            }
            inner.phase = Phase::Loading;
        }
        self.presenter.emit_state(&UiState::Fetching);

        match self.resolver.list_all_streams(env).await {
            Ok(list) => {
                let options = stream_options(&list, self.messages);
                {
                    let mut inner = self.inner.lock().await;
                    inner.streams = Some(list);
                    inner.selected = 0;
                    inner.phase = Phase::Ready;
                }
                self.presenter.emit_options(&options);
                self.presenter.emit_state(&UiState::Ready);
                Ok(true)
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    pub async fn select(&self, index: usize) -> bool {
        let mut inner = self.inner.lock().await;
        let in_range = inner.streams.as_ref().map(|s| index < s.len()).unwrap_or(false);
        if in_range {
            inner.selected = index;
        }
        in_range
    }

    pub async fn select_qn(&self, qn: u32) -> bool {
        let index = {
            let inner = self.inner.lock().await;
            inner.streams.as_ref().and_then(|s| s.position_of_qn(qn))
        };
        match index {
            Some(i) => self.select(i).await,
            None => false,
        }
    }

    /// Copies the selected URL. On success the control flashes "copied" and
    /// returns to idle with the list kept.
    pub async fn copy_selected(&self) -> ResolveResult<String> {
        let url = {
            let mut inner = self.inner.lock().await;
            let url = inner
                .streams
                .as_ref()
                .and_then(|s| s.get(inner.selected))
                .map(|c| c.url.clone());
            match (inner.phase, url) {
                (Phase::Ready | Phase::Idle, Some(url)) => {
                    inner.phase = Phase::Copying;
                    url
                }
                (Phase::Copying, _) => return Err(ResolveError::NotReady("copy in progress".into())),
                _ => return Err(ResolveError::NotReady("nothing loaded".into())),
            }
        };
        self.presenter.emit_state(&UiState::Copying);

        if let Err(e) = self.clipboard.set_text(&url).await {
            self.fail(&e).await;
            return Err(e);
        }

        self.presenter.emit_state(&UiState::Copied);
        tokio::time::sleep(self.flash_interval).await;
        self.inner.lock().await.phase = Phase::Idle;
        self.presenter.emit_state(&UiState::Idle);
        Ok(url)
    }

    /// Failed goes back to idle after the display interval.
    pub async fn recover(&self) {
        if self.inner.lock().await.phase != Phase::Failed {
            return;
        }
        tokio::time::sleep(self.flash_interval).await;
        let mut inner = self.inner.lock().await;
        if inner.phase == Phase::Failed {
            inner.phase = Phase::Idle;
            drop(inner);
            self.presenter.emit_state(&UiState::Idle);
        }
    }

    /// Forgets the loaded list so the next load runs the pipeline again.
    pub async fn reset_guard(&self) {
        let mut inner = self.inner.lock().await;
        inner.streams = None;
        inner.selected = 0;
        if inner.phase != Phase::Loading && inner.phase != Phase::Copying {
            inner.phase = Phase::Idle;
        }
    }

    async fn fail(&self, e: &ResolveError) {
        tracing::error!("[session] {} ({})", e, e.kind());
        self.inner.lock().await.phase = Phase::Failed;
        self.presenter.emit_state(&UiState::Error {
            message: user_message(e, self.messages).to_string(),
        });
    }
}

/// Generic, detail-free text for the end user.
pub fn user_message(e: &ResolveError, messages: &Messages) -> &'static str {
    match e {
        ResolveError::Identity(_) => messages.error_extract_bvid,
        ResolveError::Parse { .. } => messages.error_bad_json,
        ResolveError::NoTrack { .. } | ResolveError::NoMp4(_) => messages.error_no_mp4,
        ResolveError::NoCandidates { .. } => messages.error_no_mp4_candidates,
        ResolveError::NotReady(_) => messages.error_not_ready,
        _ => messages.button_error,
    }
}

pub fn option_label(candidate: &StreamCandidate, messages: &Messages) -> String {
    let tier = candidate
        .tier
        .as_ref()
        .map(|t| t.label.clone())
        .unwrap_or_else(|| "MP4".to_string());
    match candidate.size_bytes {
        Some(bytes) => format!("{} · {:.1} MiB", tier, bytes as f64 / (1024.0 * 1024.0)),
        None => format!("{} · {}", tier, messages.size_unknown),
    }
}

pub fn stream_options(list: &RankedStreamList, messages: &Messages) -> Vec<StreamOption> {
    list.streams
        .iter()
        .enumerate()
        .map(|(index, c)| StreamOption {
            index,
            label: option_label(c, messages),
            url: c.url.clone(),
            qn: c.qn(),
            size_bytes: c.size_bytes,
        })
        .collect()
}
