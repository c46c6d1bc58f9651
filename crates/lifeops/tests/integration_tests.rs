//! Integration tests for the lifeops crate
//!
//! These exercise the public surface end to end without network access:
//! credential acquisition over a token file, the service cache, extraction,
//! and the MIME codec.

use chrono::{Duration, Utc};
use lifeops::auth::RefreshError;
use lifeops::extract::{Page, extract_document_text, parse_content, slide_text};
use lifeops::mime::{MessagePart, decode_body_bytes, parse_rfc822};
use lifeops::{
    ConsentFlow, Credential, CredentialStore, Error, FileTokenStorage, OutboundMessage, Result,
    ServiceCache, TokenGrant, TokenRefresher, TokenStorage, TransportConfig, build_outbound,
    decode_body_data, decode_plain_text, parse, scopes,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Refresher that counts calls and always succeeds
struct FakeRefresher {
    calls: Arc<AtomicUsize>,
}

impl TokenRefresher for FakeRefresher {
    fn refresh(&self, _credential: &Credential) -> std::result::Result<TokenGrant, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TokenGrant {
            access_token: "ya29.refreshed".to_string(),
            refresh_token: None,
            expires_in: Some(3599),
            scope: None,
        })
    }
}

/// Consent that counts calls and refuses
struct ForbiddenConsent {
    calls: Arc<AtomicUsize>,
}

impl ConsentFlow for ForbiddenConsent {
    fn authorize(&self, _scopes: &[String]) -> Result<Credential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::auth("consent must not run"))
    }
}

fn expired_credential() -> Credential {
    Credential {
        access_token: "ya29.expired".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expires_at: Some(Utc::now() - Duration::minutes(5)),
        scopes: scopes::all().into_iter().collect(),
        token_uri: lifeops::config::DEFAULT_TOKEN_URI.to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

struct Harness {
    _dir: TempDir,
    token_path: std::path::PathBuf,
    refreshes: Arc<AtomicUsize>,
    consents: Arc<AtomicUsize>,
    store: CredentialStore,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("google-token.json");
    FileTokenStorage::new(&token_path)
        .save(&expired_credential())
        .unwrap();

    let refreshes = Arc::new(AtomicUsize::new(0));
    let consents = Arc::new(AtomicUsize::new(0));
    let store = CredentialStore::new(
        FileTokenStorage::new(&token_path),
        FakeRefresher {
            calls: refreshes.clone(),
        },
    )
    .with_consent(ForbiddenConsent {
        calls: consents.clone(),
    });

    Harness {
        _dir: dir,
        token_path,
        refreshes,
        consents,
        store,
    }
}

#[test]
fn test_expired_token_refreshes_without_consent() {
    let h = harness();

    let acquired = h.store.acquire(scopes::ALL).unwrap();
    assert_eq!(acquired.credential.access_token, "ya29.refreshed");
    assert!(acquired.credential.is_valid(Utc::now()));
    assert!(acquired.persist_warning.is_none());
    assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(h.consents.load(Ordering::SeqCst), 0);

    // Refreshed token was written back; refresh token preserved
    let persisted = FileTokenStorage::new(&h.token_path).load().unwrap().unwrap();
    assert_eq!(persisted.access_token, "ya29.refreshed");
    assert_eq!(persisted.refresh_token.as_deref(), Some("1//refresh"));
}

#[test]
fn test_wider_scope_request_needs_consent() {
    let h = harness();
    let mut requested = scopes::all();
    requested.push(scopes::KEEP.to_string());

    let err = h.store.acquire(&requested).unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
    assert_eq!(h.consents.load(Ordering::SeqCst), 1);
    assert_eq!(h.refreshes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_cache_access_shares_one_handle_and_refresh() {
    let h = harness();
    let refreshes = h.refreshes.clone();
    let cache = ServiceCache::new(Arc::new(h.store), scopes::all(), TransportConfig::default());

    let handles: Vec<_> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..16)
            .map(|_| s.spawn(|| cache.get("gmail", "v1").unwrap()))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert!(handles.iter().all(|handle| Arc::ptr_eq(handle, &handles[0])));
    assert_eq!(handles[0].key().to_string(), "gmail/v1");
    assert_eq!(cache.len(), 1);
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    cache.shutdown().unwrap();
}

#[test]
fn test_unpadded_body_data_decodes() {
    assert_eq!(decode_body_data("aGVsbG8"), "hello");
}

#[test]
fn test_plain_text_found_two_levels_down() {
    let payload: MessagePart = serde_json::from_value(json!({
        "mimeType": "multipart/mixed",
        "parts": [
            {
                "mimeType": "multipart/alternative",
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "aGVsbG8"}},
                    {"mimeType": "text/html", "body": {"data": "PGI-aGk8L2I-"}}
                ]
            },
            {"mimeType": "application/pdf", "filename": "a.pdf", "body": {"attachmentId": "att"}}
        ]
    }))
    .unwrap();
    assert_eq!(decode_plain_text(&payload), "hello");
}

#[test]
fn test_outbound_round_trip_recovers_body() {
    let message = OutboundMessage::new(["someone@example.com"], "greeting", "hello");
    let part = parse_rfc822(&build_outbound(&message));
    assert_eq!(decode_plain_text(&part), "hello");
}

#[test]
fn test_alternative_plain_part_precedes_html() {
    let message = OutboundMessage::new(["someone@example.com"], "s", "plain body")
        .with_html("<p>html body</p>");
    let part = parse_rfc822(&build_outbound(&message));

    assert_eq!(part.essence(), "multipart/alternative");
    assert_eq!(part.parts.len(), 2);
    assert_eq!(part.parts[0].essence(), "text/plain");
    assert_eq!(part.parts[1].essence(), "text/html");
}

#[test]
fn test_raw_field_is_decodable() {
    let message = OutboundMessage::new(["someone@example.com"], "s", "hello");
    let raw = lifeops::mime::encode_raw(&build_outbound(&message));
    let part = parse_rfc822(&decode_body_bytes(&raw).unwrap());
    assert_eq!(decode_plain_text(&part), "hello");
}

#[test]
fn test_message_without_date_header_is_dated_now() {
    let before = Utc::now();
    let message = parse::message(&json!({
        "id": "m1",
        "threadId": "t1",
        "payload": {
            "mimeType": "text/plain",
            "headers": [{"name": "Subject", "value": "no date"}],
            "body": {"data": "aGVsbG8"}
        }
    }))
    .unwrap();
    let after = Utc::now();

    assert!(message.date >= before && message.date <= after);
    assert_eq!(message.body_plain, "hello");
}

#[test]
fn test_document_paragraphs_concatenate() {
    let body = json!({"content": [
        {"paragraph": {"elements": [{"textRun": {"content": "Hello "}}]}},
        {"paragraph": {"elements": [{"textRun": {"content": "World\n"}}]}}
    ]});
    assert_eq!(extract_document_text(&parse_content(&body)), "Hello World\n");
}

#[test]
fn test_blank_table_contributes_nothing() {
    let body = json!({"content": [
        {"table": {"tableRows": [{"tableCells": [
            {"content": [{"paragraph": {"elements": [{"textRun": {"content": "  \n"}}]}}]},
            {"content": []}
        ]}]}}
    ]});
    assert_eq!(extract_document_text(&parse_content(&body)), "");
}

#[test]
fn test_slide_text_joins_shapes() {
    let page = Page::from_value(&json!({
        "objectId": "p1",
        "pageElements": [
            {"shape": {"text": {"textElements": [{"textRun": {"content": "Title\n"}}]}}},
            {"image": {}},
            {"shape": {"text": {"textElements": [{"textRun": {"content": " Body "}}]}}}
        ]
    }));
    assert_eq!(slide_text(&page), "Title Body");
}

#[test]
fn test_windows_1252_message_decodes_to_unicode() {
    let raw = concat!(
        "From: a@example.com\r\n",
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
fn test_valueless_header_keeps_rest_of_message() {
    let message = parse::message(&json!({
        "id": "m1",
        "payload": {
            "mimeType": "text/plain",
            "headers": [
                {"name": "Subject", "value": "Lunch"},
                {"name": "X-Odd"}
            ],
            "body": {"size": 5, "data": "aGVsbG8"}
        }
    }))
    .unwrap();
    assert_eq!(message.subject, "Lunch");
    assert_eq!(message.body_plain, "hello");
}
