//! System clipboard access through the platform's command-line tools.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::ExportError;

/// Clipboard tools to try, in order.
const CANDIDATES: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

/// Copy `content` to the clipboard using the first tool that works.
pub async fn copy(content: &str) -> Result<(), ExportError> {
    let mut last_error = String::from("no clipboard tool found");

    for (program, args) in CANDIDATES {
        match pipe_into(program, args, content).await {
            Ok(()) => {
                tracing::debug!(tool = program, "Copied to clipboard");
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => last_error = format!("{program}: {e}"),
        }
    }

    Err(ExportError::Clipboard(last_error))
}

async fn pipe_into(program: &str, args: &[&str], content: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(content.as_bytes()).await?;
        stdin.shutdown().await?;
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("exited with {status}")))
    }
}
