use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::core::error::{ResolveError, ResolveResult};

#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn set_text(&self, text: &str) -> ResolveResult<()>;
}

/// Writes through whatever clipboard tool the platform offers.
pub struct SystemClipboard;

#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn set_text(&self, text: &str) -> ResolveResult<()> {
        copy_text_to_clipboard(text)
            .await
            .map_err(|e| ResolveError::Clipboard(e.to_string()))
    }
}

pub async fn copy_text_to_clipboard(text: &str) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        copy_text_macos(text).await
    }

    #[cfg(target_os = "windows")]
    {
        copy_text_windows(text).await
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        copy_text_linux(text).await
    }
}

/// Feeds `text` to the tool's stdin. `Ok(false)` means the tool is missing
/// or exited unsuccessfully.
async fn pipe_to(program: &str, args: &[&str], text: &str) -> anyhow::Result<bool> {
    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .spawn();

    let mut child = match child {
        Ok(c) => c,
        Err(_) => {
            tracing::debug!("[clipboard] {} not found", program);
            return Ok(false);
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }
    let output = child.wait_with_output().await?;
    if !output.status.success() {
        tracing::debug!(
            "[clipboard] {} failed: {}",
            program,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output.status.success())
}

#[cfg(target_os = "macos")]
async fn copy_text_macos(text: &str) -> anyhow::Result<()> {
    if pipe_to("pbcopy", &[], text).await? {
        tracing::info!("[clipboard] copied text (pbcopy)");
        return Ok(());
    }
    Err(anyhow::anyhow!("pbcopy failed"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
async fn copy_text_linux(text: &str) -> anyhow::Result<()> {
    let tools: [(&str, &[&str]); 3] = [
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--clipboard", "--input"]),
        ("wl-copy", &["--type", "text/plain"]),
    ];

    for (program, args) in tools {
        if pipe_to(program, args, text).await? {
            tracing::info!("[clipboard] copied text ({})", program);
            return Ok(());
        }
    }

    Err(anyhow::anyhow!(
        "No clipboard tool found (tried xclip, xsel, wl-copy)"
    ))
}

#[cfg(target_os = "windows")]
async fn copy_text_windows(text: &str) -> anyhow::Result<()> {
    let ps_script = format!("Set-Clipboard -Value '{}'", text.replace('\'', "''"));

    let output = tokio::process::Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", ps_script.as_str()])
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("PowerShell Set-Clipboard failed: {}", stderr));
    }

    tracing::info!("[clipboard] copied text (Windows)");
    Ok(())
}
