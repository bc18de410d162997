//! Contact-form submissions and the relay they are forwarded through.
//!
//! The core only validates and renders a lead; delivering it (a chat bot,
//! e-mail, a CRM) is the job of a `LeadRelay` implementation.

use serde::{Deserialize, Serialize};

use crate::error::SolarFinanceError;
use crate::SolarFinanceResult;

/// A document uploaded with the form, such as a photo of an electricity bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadAttachment {
    pub file_name: String,
    pub content_type: String,
    #[serde(default, skip_serializing)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub full_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub files: Vec<LeadAttachment>,
}

impl LeadSubmission {
    pub fn validate(&self) -> SolarFinanceResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(SolarFinanceError::InvalidInput {
                field: "full_name".into(),
                reason: "Name is required".into(),
            });
        }
        let digits = self.phone.chars().filter(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return Err(SolarFinanceError::InvalidInput {
                field: "phone".into(),
                reason: "Phone number is required".into(),
            });
        }
        for (i, file) in self.files.iter().enumerate() {
            if file.file_name.trim().is_empty() {
                return Err(SolarFinanceError::InvalidInput {
                    field: format!("files[{i}].file_name"),
                    reason: "Attachment needs a file name".into(),
                });
            }
        }
        Ok(())
    }

    /// Markdown notification text. Optional fields are omitted when blank.
    pub fn render_message(&self) -> String {
        let mut message = String::from("📝 *Đăng ký mới từ website*\n\n");
        message.push_str(&format!("👤 *Họ tên:* {}\n", escape_markdown(self.full_name.trim())));
        message.push_str(&format!("📱 *Số điện thoại:* {}\n", escape_markdown(self.phone.trim())));
        if let Some(email) = non_blank(&self.email) {
            message.push_str(&format!("📧 *Email:* {}\n", escape_markdown(email)));
        }
        if let Some(address) = non_blank(&self.address) {
            message.push_str(&format!("🏠 *Địa chỉ:* {}\n", escape_markdown(address)));
        }
        message
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Escape the characters legacy Markdown treats as entity markers.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Delivers a lead to whoever follows up on it.
pub trait LeadRelay {
    type Error: std::error::Error;

    /// Send the rendered message followed by each attachment.
    fn submit(&self, lead: &LeadSubmission, message: &str) -> Result<(), Self::Error>;
}

/// Validate a submission and hand it to the relay.
pub fn relay_lead<R: LeadRelay>(relay: &R, lead: &LeadSubmission) -> SolarFinanceResult<()> {
    lead.validate()?;
    let message = lead.render_message();
    tracing::debug!(attachments = lead.files.len(), "relaying lead");
    relay
        .submit(lead, &message)
        .map_err(|e| SolarFinanceError::Relay(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fmt;

    #[derive(Debug)]
    struct Offline;

    impl fmt::Display for Offline {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "webhook unreachable")
        }
    }

    impl std::error::Error for Offline {}

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<String>>,
        fail: bool,
    }

    impl LeadRelay for Recorder {
        type Error = Offline;

        fn submit(&self, _lead: &LeadSubmission, message: &str) -> Result<(), Offline> {
            if self.fail {
                return Err(Offline);
            }
            self.sent.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    fn lead() -> LeadSubmission {
        LeadSubmission {
            full_name: "Nguyễn Văn A".into(),
            phone: "0901 234 567".into(),
            email: None,
            address: None,
            files: Vec::new(),
        }
    }

    #[test]
    fn test_message_has_required_lines_only() {
        let message = lead().render_message();
        assert_eq!(
            message,
            "📝 *Đăng ký mới từ website*\n\n👤 *Họ tên:* Nguyễn Văn A\n📱 *Số điện thoại:* 0901 234 567\n"
        );
    }

    #[test]
    fn test_message_includes_optional_lines() {
        let mut l = lead();
        l.email = Some("a_b@example.com".into());
        l.address = Some("  ".into());
        let message = l.render_message();
        assert!(message.contains("📧 *Email:* a\\_b@example.com\n"));
        assert!(!message.contains("Địa chỉ"));
    }

    #[test]
    fn test_validation() {
        let mut l = lead();
        l.full_name = " ".into();
        assert!(l.validate().is_err());
        let mut l = lead();
        l.phone = "".into();
        assert!(l.validate().is_err());
        assert!(lead().validate().is_ok());
    }

    #[test]
    fn test_relay_receives_rendered_message() {
        let relay = Recorder::default();
        relay_lead(&relay, &lead()).unwrap();
        assert_eq!(relay.sent.borrow().len(), 1);
        assert!(relay.sent.borrow()[0].starts_with("📝"));
    }

    #[test]
    fn test_relay_failure_maps_to_error() {
        let relay = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let err = relay_lead(&relay, &lead()).unwrap_err();
        assert!(matches!(err, SolarFinanceError::Relay(ref msg) if msg == "webhook unreachable"));
    }

    #[test]
    fn test_invalid_lead_never_reaches_relay() {
        let relay = Recorder::default();
        let mut l = lead();
        l.full_name.clear();
        assert!(relay_lead(&relay, &l).is_err());
        assert!(relay.sent.borrow().is_empty());
    }

    #[test]
    fn test_attachment_bytes_not_serialized() {
        let mut l = lead();
        l.files.push(LeadAttachment {
            file_name: "bill.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![1, 2, 3],
        });
        let json = serde_json::to_value(&l).unwrap();
        assert!(json["files"][0].get("bytes").is_none());
    }
}
