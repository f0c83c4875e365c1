//! Transactional email message handed to a `Mailer`.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,

    /// At least one recipient. Loading a message with an empty list fails.
    #[serde(deserialize_with = "non_empty_recipients")]
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: vec![to.into()],
            subject: subject.into(),
            html: html.into(),
        }
    }

    pub fn with_recipient(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Recipient label used for logging (`a@x, b@y`).
    pub fn recipient_label(&self) -> String {
        self.to.join(", ")
    }
}

fn non_empty_recipients<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let to = Vec::<String>::deserialize(d)?;
    if to.is_empty() {
        return Err(serde::de::Error::custom("`to` must list at least one recipient"));
    }
    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_label_joins_all_recipients() {
        let msg = EmailMessage::new(
            "agency@example.com",
            "creator@example.com",
            "Welcome",
            "<p>hi</p>",
        )
        .with_recipient("client@example.com");
        assert_eq!(msg.recipient_label(), "creator@example.com, client@example.com");
    }

    #[test]
    fn message_roundtrip_json() {
        let json = r#"
        {
          "from": "agency@example.com",
          "to": ["creator@example.com"],
          "subject": "Briefing ready",
          "html": "<p>Your briefing is ready.</p>"
        }"#;
        let msg: EmailMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.to.len(), 1);
        assert_eq!(msg.subject, "Briefing ready");
    }

    #[test]
    fn message_without_recipients_is_rejected() {
        let json = r#"{"from": "agency@example.com", "to": [], "subject": "s", "html": "h"}"#;
        let err = serde_json::from_str::<EmailMessage>(json).unwrap_err();
        assert!(err.to_string().contains("at least one recipient"));
    }
}
