//! Decoding of raw `From` and `Subject` header values

use mailparse::MailHeader;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CleanupError, Result};

/// Angle-bracketed address in a `Name <user@example.com>` header
static ANGLE_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^<>]+)>").expect("static regex is valid"));

/// Decode a raw header value into plain text
///
/// RFC 2047 encoded words (`=?utf-8?B?...?=`, `=?iso-8859-1?Q?...?=`) are
/// decoded; plain values pass through untouched.
pub fn decode_header_value(name: &str, raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Ok(String::new());
    }

    let line = format!("{}: {}", name, raw);
    let (header, _) = mailparse::parse_header(line.as_bytes()).map_err(|e| {
        CleanupError::InvalidMessageFormat(format!("Cannot decode {} header: {}", name, e))
    })?;

    Ok(header_value(&header))
}

fn header_value(header: &MailHeader<'_>) -> String {
    header.get_value().trim().to_string()
}

/// Extract the bare address from a decoded `From` value
///
/// `"Jane Smith" <jane@example.com>` becomes `jane@example.com`; values
/// without angle brackets are returned trimmed.
pub fn extract_address(from: &str) -> String {
    match ANGLE_ADDRESS.captures(from).and_then(|c| c.get(1)) {
        Some(address) => address.as_str().trim().to_string(),
        None => from.trim().to_string(),
    }
}

/// Decode a raw `From` header into a bare sender address
pub fn decode_sender(raw: &str) -> Result<String> {
    let decoded = decode_header_value("From", raw)?;
    Ok(extract_address(&decoded))
}

/// Decode a raw `Subject` header
pub fn decode_subject(raw: &str) -> Result<String> {
    decode_header_value("Subject", raw)
}
