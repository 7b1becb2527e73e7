//! Client library for the external mail delivery tool binary.
//!
//! The service shells out to a sendmail-style helper rather than speaking SMTP
//! itself. The helper receives the envelope as flags and the body on an
//! argument; a non-zero exit means the message was not accepted for delivery.

use std::borrow::Cow;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default binary name the client will attempt to execute if only a directory is provided.
const DEFAULT_TOOL_BINARY: &str = "jobboard-mail-sender";

/// Encapsulates interactions with the external mail delivery binary.
#[derive(Debug, Clone)]
pub struct MailClient {
    tool_path: PathBuf,
    from: Option<String>,
}

impl MailClient {
    /// Build a client pointing to a concrete mail tool binary.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(tool_path: P) -> Self {
        Self {
            tool_path: tool_path.into(),
            from: None,
        }
    }

    /// Build a client by combining a directory with the default binary name.
    #[must_use]
    pub fn from_directory<P: Into<PathBuf>>(dir: P) -> Self {
        let mut path = dir.into();
        path.push(DEFAULT_TOOL_BINARY);
        Self::new(path)
    }

    /// Set the envelope sender passed to the tool.
    #[must_use]
    pub fn with_from<S: Into<String>>(mut self, from: S) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Hand a message to the delivery tool.
    pub fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        let mut command = Command::new(&self.tool_path);
        if let Some(from) = &self.from {
            command.arg("--from").arg(from);
        }
        command.arg("--to").arg(&message.to);
        command.arg("--subject").arg(&message.subject);
        command.arg("--body").arg(&message.body);

        run_command(command, "send")?;
        tracing::debug!(to = %message.to, "mail handed to delivery tool");
        Ok(())
    }
}

/// Envelope and body for a single outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    #[must_use]
    pub fn new<T, S, B>(to: T, subject: S, body: B) -> Self
    where
        T: Into<String>,
        S: Into<String>,
        B: Into<String>,
    {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Errors surfaced while communicating with the mail delivery binary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MailerError {
    #[error("failed to invoke mail tool: {0}")]
    Io(#[from] std::io::Error),
    #[error("mail tool command `{command}` failed with status {status}: {stderr}")]
    ToolFailure {
        command: Cow<'static, str>,
        status: ExitStatus,
        stderr: String,
    },
}

#[inline]
fn run_command(mut command: Command, name: &'static str) -> Result<Output, MailerError> {
    let output = command.output()?;
    if output.status.success() {
        Ok(output)
    } else {
        let stderr = match String::from_utf8(output.stderr) {
            Ok(s) => s.trim().to_owned(),
            Err(e) => String::from_utf8_lossy(e.as_bytes()).trim().to_owned(),
        };
        Err(MailerError::ToolFailure {
            command: Cow::Borrowed(name),
            status: output.status,
            stderr,
        })
    }
}
