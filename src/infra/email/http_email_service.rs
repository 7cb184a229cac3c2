use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay replies longer than this are cut before they reach the logs.
const MAX_LOGGED_REPLY: usize = 512;

/// Posts rendered appointment mails to the outbound mail relay.
pub struct HttpEmailService {
    client: Client,
    relay_url: String,
    relay_token: String,
    from_alias: String,
}

/// One outbound mail as the relay expects it.
#[derive(Serialize)]
struct RelayMail<'a> {
    from_alias: &'a str,
    to_addr: &'a str,
    subject: &'a str,
    html_body: &'a str,
    attachments: Vec<RelayAttachment<'a>>,
}

#[derive(Serialize)]
struct RelayAttachment<'a> {
    filename: &'a str,
    content_base64: String,
}

impl<'a> RelayAttachment<'a> {
    /// A name without data (or the reverse) is not an attachment.
    fn from_parts(name: Option<&'a str>, data: Option<&[u8]>) -> Option<Self> {
        let (filename, data) = name.zip(data)?;
        Some(Self { filename, content_base64: STANDARD.encode(data) })
    }
}

impl HttpEmailService {
    pub fn new(relay_url: String, relay_token: String, from_alias: String) -> Self {
        let client = Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, relay_url, relay_token, from_alias }
    }

    fn relay_failure(status: StatusCode, reply: &str) -> AppError {
        let reply: String = reply.chars().take(MAX_LOGGED_REPLY).collect();
        error!(%status, reply, "Mail relay refused appointment mail");
        AppError::InternalWithMsg(format!("mail relay answered {}", status))
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError> {
        let mail = RelayMail {
            from_alias: &self.from_alias,
            to_addr: recipient,
            subject,
            html_body,
            attachments: RelayAttachment::from_parts(attachment_name, attachment_data).into_iter().collect(),
        };
        debug!(recipient, subject, attachments = mail.attachments.len(), "Posting mail to relay");

        let res = self.client
            .post(&self.relay_url)
            .bearer_auth(&self.relay_token)
            .json(&mail)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Mail relay unreachable");
                AppError::InternalWithMsg(format!("mail relay unreachable: {}", e))
            })?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        let reply = res.text().await.unwrap_or_default();
        Err(Self::relay_failure(status, &reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// Local relay that records each request and answers with `status`.
    async fn spawn_relay(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let sink = captured.clone();
        let app = Router::new().route("/send", post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
                sink.lock().unwrap().push((auth, body));
                (status, "relay says no")
            }
        }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{}/send", addr), captured)
    }

    #[test]
    fn attachment_needs_name_and_data() {
        assert!(RelayAttachment::from_parts(Some("invite.ics"), None).is_none());
        assert!(RelayAttachment::from_parts(None, Some(b"BEGIN")).is_none());

        let attachment = RelayAttachment::from_parts(Some("invite.ics"), Some(b"BEGIN")).unwrap();
        assert_eq!(attachment.filename, "invite.ics");
        assert_eq!(attachment.content_base64, "QkVHSU4=");
    }

    #[tokio::test]
    async fn posts_mail_with_alias_and_token() {
        let (url, captured) = spawn_relay(StatusCode::OK).await;
        let service = HttpEmailService::new(url, "relay-secret".into(), "bookings".into());

        service.send("ana@example.com", "Booked", "<p>hi</p>", Some("invite.ics"), Some(b"BEGIN")).await.unwrap();

        let captured = captured.lock().unwrap();
        let (auth, body) = &captured[0];
        assert_eq!(auth.as_deref(), Some("Bearer relay-secret"));
        assert_eq!(body["from_alias"], "bookings");
        assert_eq!(body["to_addr"], "ana@example.com");
        assert_eq!(body["attachments"][0]["filename"], "invite.ics");
    }

    #[tokio::test]
    async fn relay_rejection_is_an_error() {
        let (url, _) = spawn_relay(StatusCode::BAD_GATEWAY).await;
        let service = HttpEmailService::new(url, String::new(), "bookings".into());

        let err = service.send("ana@example.com", "Booked", "<p>hi</p>", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::InternalWithMsg(msg) if msg.contains("502")));
    }
}
