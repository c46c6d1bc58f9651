//! lifeops - Google Workspace automation library
//!
//! This crate provides synchronous, typed access to a personal Google
//! account:
//! - One shared OAuth2 credential with silent refresh (`CredentialStore`)
//! - Memoized per-API transports (`ServiceCache`)
//! - Plain-text extraction from Docs and Slides structures
//! - Gmail MIME decoding and outbound message encoding
//! - Tolerant parsers from raw API JSON to typed entities
//! - Thin clients for Gmail, Calendar, Drive, Drive Labels, Sheets, Contacts, Docs,
//!   Slides, Tasks, Keep, and Meet
//!
//! All I/O is blocking; wrap calls in a blocking task when used from async code.

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod extract;
pub mod mime;
pub mod models;
pub mod parse;
pub mod service;

pub use auth::{
    Acquired, ConsentFlow, Credential, CredentialStore, FileTokenStorage, MemoryTokenStorage,
    TokenGrant, TokenRefresher, TokenStorage,
};
pub use clients::{
    CalendarClient, ContactsClient, DocsClient, DriveClient, DriveLabelsClient, GmailClient,
    KeepClient, MeetClient, ShareRole, SheetsClient, SlidesClient, TasksClient,
};
pub use self::config::{ClientSecrets, TransportConfig, scopes};
pub use error::{Error, Result};
pub use mime::{OutboundMessage, build_outbound, decode_body_data, decode_plain_text};
pub use models::{
    CalendarEvent, Contact, DriveFile, DriveLabel, EmailMessage, EmailThread, GoogleDoc,
    KeepNote, MeetingSpace, Presentation, Task, TaskList,
};
pub use parse::{Batch, Skipped};
pub use service::{ServiceCache, ServiceHandle, ServiceKey};
