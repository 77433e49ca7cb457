//! Best-effort e-mail side channel. Callers enqueue onto an unbounded channel
//! and never observe delivery failures; a background worker drains the queue
//! into an [`EmailTransport`].

use async_trait::async_trait;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait EmailTransport: Send + Sync + 'static {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "email dispatched");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Mailer {
    sender: UnboundedSender<EmailMessage>,
}

impl Mailer {
    pub fn channel() -> (Self, UnboundedReceiver<EmailMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn spawn<T: EmailTransport>(transport: T) -> (Self, JoinHandle<()>) {
        let (mailer, mut receiver) = Self::channel();
        let handle = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                if let Err(err) = transport.send(&message).await {
                    tracing::warn!(error = %err, to = %message.to, "email delivery failed");
                }
            }
            tracing::debug!("mail worker stopped");
        });
        (mailer, handle)
    }

    pub fn enqueue(&self, message: EmailMessage) {
        if let Err(err) = self.sender.send(message) {
            tracing::warn!(to = %err.0.to, "mail queue closed, dropping email");
        }
    }
}

pub fn provider_approval_email(
    to: &str,
    name: &str,
    profession: &str,
    approved: bool,
    reason: Option<&str>,
    frontend_url: &str,
) -> EmailMessage {
    let subject = if approved {
        format!("Your {profession} provider account is approved")
    } else {
        format!("Update on your {profession} provider application")
    };

    let mut body = format!("Hello {name},\n\n");
    if approved {
        body.push_str(&format!(
            "Your {profession} provider account has been approved by our admin team.\n"
        ));
    } else {
        body.push_str(&format!(
            "Your {profession} provider application has been reviewed by our admin team.\n"
        ));
    }
    if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
        body.push_str(&format!("\nNote: {reason}\n"));
    }
    let link = if approved {
        format!("{frontend_url}/provider/dashboard")
    } else {
        format!("{frontend_url}/provider/profile")
    };
    body.push_str(&format!("\n{link}\n"));

    EmailMessage {
        to: to.to_string(),
        subject,
        body,
    }
}
