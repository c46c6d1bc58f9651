//! Raw RFC 2822 messages to payload trees
//!
//! Produces the same shape the API returns for `format=full`, so raw
//! messages and API payloads go through one decoding path.

use mailparse::ParsedMail;

use super::decode::{Header, MessagePart, PartBody};
use super::encode::encode_raw;

/// Parse a raw message (headers, body, nested multiparts) into a payload tree
pub fn parse_rfc822(raw: &[u8]) -> MessagePart {
    match mailparse::parse_mail(raw) {
        Ok(mail) => to_part(&mail, String::new()),
        Err(e) => {
            log::warn!("Unparseable raw message, keeping it as plain text: {}", e);
            MessagePart {
                mime_type: "text/plain".to_string(),
                body: leaf_body(raw),
                ..MessagePart::default()
            }
        }
    }
}

fn to_part(mail: &ParsedMail<'_>, part_id: String) -> MessagePart {
    let headers = mail
        .headers
        .iter()
        .map(|header| Header {
            name: header.get_key(),
            value: header.get_value(),
        })
        .collect();

    let mime_type = mail.ctype.mimetype.to_ascii_lowercase();
    let filename = mail
        .get_content_disposition()
        .params
        .get("filename")
        .or_else(|| mail.ctype.params.get("name"))
        .cloned()
        .unwrap_or_default();

    if mime_type.starts_with("multipart/") {
        let parts = mail
            .subparts
            .iter()
            .enumerate()
            .map(|(i, sub)| to_part(sub, child_id(&part_id, i)))
            .collect();
        return MessagePart {
            part_id,
            mime_type,
            filename,
            headers,
            body: PartBody::default(),
            parts,
        };
    }

    // Text parts are converted from their declared charset to UTF-8
    let content = if mime_type.starts_with("text/") {
        mail.get_body().map(String::into_bytes)
    } else {
        mail.get_body_raw()
    };
    let content = content.unwrap_or_else(|e| {
        log::debug!("Undecodable {} part {:?}: {}", mime_type, part_id, e);
        Vec::new()
    });

    MessagePart {
        part_id,
        mime_type,
        filename,
        headers,
        body: leaf_body(&content),
        parts: Vec::new(),
    }
}

fn leaf_body(content: &[u8]) -> PartBody {
    PartBody {
        size: content.len() as u64,
        data: Some(encode_raw(content)),
        attachment_id: None,
    }
}

/// Gmail numbers children "0", "1", ... and nested ones "0.1"
fn child_id(parent: &str, index: usize) -> String {
    if parent.is_empty() {
        index.to_string()
    } else {
        format!("{}.{}", parent, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::{HeaderMap, OutboundMessage, build_outbound, decode_plain_text};

    fn subject(part: &MessagePart) -> Option<String> {
        HeaderMap::from_headers(&part.headers)
            .get("subject")
            .map(str::to_string)
    }

    #[test]
    fn test_plain_round_trip() {
        let message = OutboundMessage::new(["a@x.com"], "Hi", "hello");
        let part = parse_rfc822(&build_outbound(&message));

        assert_eq!(part.mime_type, "text/plain");
        assert_eq!(part.body.data.as_deref(), Some("aGVsbG8"));
        assert_eq!(decode_plain_text(&part), "hello");
        assert_eq!(HeaderMap::from_headers(&part.headers).get("to"), Some("a@x.com"));
    }

    #[test]
    fn test_alternative_round_trip() {
        let message = OutboundMessage::new(["a@x.com"], "Hi", "plain text").with_html("<p>rich</p>");
        let part = parse_rfc822(&build_outbound(&message));

        assert_eq!(part.mime_type, "multipart/alternative");
        assert_eq!(part.parts.len(), 2);
        assert_eq!(part.parts[0].part_id, "0");
        assert_eq!(part.parts[0].mime_type, "text/plain");
        assert_eq!(part.parts[1].mime_type, "text/html");
        assert_eq!(decode_plain_text(&part), "plain text");
    }

    #[test]
    fn test_encoded_subject_round_trip() {
        let text = "Réunion à 10h ☕ ".repeat(4);
        let message = OutboundMessage::new(["a@x.com"], text.clone(), "x");
        let part = parse_rfc822(&build_outbound(&message));
        assert_eq!(subject(&part), Some(text));
    }

    #[test]
    fn test_windows_1252_quoted_printable() {
        let raw = concat!(
            "Subject: quotes\r\n",
            "Content-Type: text/plain; charset=windows-1252\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "=93hi=94 =80",
        );
        let part = parse_rfc822(raw.as_bytes());
        assert_eq!(decode_plain_text(&part), "\u{201c}hi\u{201d} \u{20ac}");
    }

    #[test]
    fn test_latin1_soft_break_and_folded_header() {
        let raw = concat!(
            "Subject: a long\r\n",
            " subject line\r\n",
            "Content-Type: text/plain; charset=iso-8859-1\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "caf=E9 soft=\r\n",
            "break",
        );
        let part = parse_rfc822(raw.as_bytes());
        assert_eq!(subject(&part).as_deref(), Some("a long subject line"));
        assert_eq!(decode_plain_text(&part), "café softbreak");
    }

    #[test]
    fn test_encoded_words_in_header() {
        let raw = concat!(
            "Subject: Re: =?iso-8859-1?q?caf=E9_noir?= ok\r\n",
            "\r\n",
            "x",
        );
        let part = parse_rfc822(raw.as_bytes());
        assert_eq!(subject(&part).as_deref(), Some("Re: café noir ok"));
    }

    #[test]
    fn test_nested_multipart_ids_and_attachment_name() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"outer\"\r\n",
            "\r\n",
            "preamble\r\n",
            "--outer\r\n",
            "Content-Type: multipart/alternative; boundary=inner\r\n",
            "\r\n",
            "--inner\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "deep\r\n",
            "--inner--\r\n",
            "--outer\r\n",
            "Content-Type: application/pdf; name=\"a.pdf\"\r\n",
            "Content-Disposition: attachment; filename=\"report.pdf\"\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "JVBERg==\r\n",
            "--outer--\r\n",
            "epilogue\r\n",
        );
        let part = parse_rfc822(raw.as_bytes());

        assert_eq!(part.parts.len(), 2);
        assert_eq!(part.parts[0].part_id, "0");
        assert_eq!(part.parts[0].parts[0].part_id, "0.0");
        assert_eq!(decode_plain_text(&part).trim(), "deep");
        assert_eq!(part.parts[1].part_id, "1");
        assert_eq!(part.parts[1].filename, "report.pdf");
        assert_eq!(part.parts[1].body.size, 4);
    }
}
