//! Rendering of outbound messages.

/// Content type of every message the mailer produces.
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=\"utf-8\"";

/// A fully rendered message plus the SMTP envelope addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    sender: String,
    recipients: Vec<String>,
    content: Vec<u8>,
}

impl Envelope {
    /// Render headers and body.
    ///
    /// Headers are emitted in a fixed order (From, To, Subject, MIME-Version,
    /// Content-Type), CRLF terminated, followed by a blank line and the body
    /// verbatim. CR and LF inside header values are folded to spaces.
    pub fn build(from: &str, to: &[String], subject: &str, body: &str) -> Self {
        let headers = [
            ("From", header_value(from)),
            ("To", header_value(&to.join(","))),
            ("Subject", header_value(subject)),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", CONTENT_TYPE_HTML.to_string()),
        ];

        let mut content = String::with_capacity(body.len() + 256);
        for (name, value) in &headers {
            content.push_str(name);
            content.push_str(": ");
            content.push_str(value);
            content.push_str("\r\n");
        }
        content.push_str("\r\n");
        content.push_str(body);

        Self {
            sender: from.to_string(),
            recipients: to.to_vec(),
            content: content.into_bytes(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Bytes written during the data phase.
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }
}

fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipients(list: &[&str]) -> Vec<String> {
        list.iter().map(|r| r.to_string()).collect()
    }

    fn rendered(envelope: &Envelope) -> &str {
        std::str::from_utf8(envelope.as_bytes()).unwrap()
    }

    #[test]
    fn test_build_renders_headers_in_order() {
        let envelope = Envelope::build(
            "noreply@example.com",
            &recipients(&["a@example.com"]),
            "Hello",
            "<p>Hi</p>",
        );

        assert_eq!(
            rendered(&envelope),
            "From: noreply@example.com\r\n\
             To: a@example.com\r\n\
             Subject: Hello\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/html; charset=\"utf-8\"\r\n\
             \r\n\
             <p>Hi</p>"
        );
    }

    #[test]
    fn test_single_to_header_joins_recipients_in_order() {
        let to = recipients(&["c@example.com", "a@example.com", "b@example.com"]);
        let envelope = Envelope::build("from@example.com", &to, "s", "b");

        let to_headers: Vec<&str> = rendered(&envelope)
            .split("\r\n")
            .filter(|line| line.starts_with("To: "))
            .collect();
        assert_eq!(
            to_headers,
            vec!["To: c@example.com,a@example.com,b@example.com"]
        );
        assert_eq!(envelope.recipients(), to.as_slice());
    }

    #[test]
    fn test_build_is_deterministic() {
        let to = recipients(&["a@example.com", "b@example.com"]);
        let first = Envelope::build("f@example.com", &to, "Subject", "<b>body</b>");
        let second = Envelope::build("f@example.com", &to, "Subject", "<b>body</b>");
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(first, second);
    }

    #[test]
    fn test_body_is_verbatim() {
        let body = "<p>Line one</p>\n<p>&amp; <script>x</script></p>";
        let envelope = Envelope::build("f@example.com", &recipients(&["a@example.com"]), "s", body);
        assert!(rendered(&envelope).ends_with(&format!("\r\n\r\n{}", body)));
    }

    #[test]
    fn test_header_injection_is_folded() {
        let envelope = Envelope::build(
            "f@example.com",
            &recipients(&["a@example.com"]),
            "Hi\r\nBcc: victim@example.com",
            "body",
        );
        let text = rendered(&envelope);
        assert!(text.contains("Subject: Hi  Bcc: victim@example.com\r\n"));
        assert!(!text.contains("\r\nBcc:"));
    }
}
