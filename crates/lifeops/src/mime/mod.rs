//! Gmail message payloads in both directions
//!
//! - `decode`: API payload trees to text, headers, dates, and address lists
//! - `encode`: outbound messages to RFC 2822 bytes and the API's `raw` field
//! - `parse`: raw RFC 2822 bytes back into a payload tree

mod decode;
mod encode;
mod parse;

pub use decode::{
    Header, HeaderMap, MessagePart, PartBody, decode_body_bytes, decode_body_data,
    decode_plain_text, parse_date, split_addresses, try_parse_date,
};
pub use encode::{OutboundMessage, build_outbound, encode_raw};
pub use parse::parse_rfc822;
