//! Decoding of Secret Server response envelopes.
//!
//! Every reply nests its payload as
//! `Envelope/Body/<Op>Response/<Op>Result`, and the result may carry an
//! `Errors` list even when the HTTP call succeeded. Decoding happens once
//! here so callers only ever see `Envelope::Ok` or `Envelope::RemoteError`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::soap::Operation;
use super::xml::XmlElement;
use super::{Attachment, AuthToken, RemoteSecret, SecretItem};

/// Outcome of a call that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Ok(T),
    RemoteError(String),
}

/// Unwrap the result element for `operation`, check it for in-band errors
/// and decode the payload.
///
/// `Err` means the document did not have the expected shape.
pub fn decode<T>(
    root: &XmlElement,
    operation: Operation,
    payload: impl FnOnce(&XmlElement) -> Result<T, String>,
) -> Result<Envelope<T>, String> {
    let response = operation.response_element();
    let result = operation.result_element();
    let node = root
        .path(&["Envelope", "Body", response.as_str(), result.as_str()])
        .ok_or_else(|| format!("malformed {} response: missing {}", operation, result))?;

    if let Some(message) = in_band_error(node) {
        return Ok(Envelope::RemoteError(message));
    }
    payload(node).map(Envelope::Ok)
}

/// The server's error text, if the result carries a non-empty `Errors` list.
pub fn in_band_error(result: &XmlElement) -> Option<String> {
    let errors = result.child("Errors")?;
    let messages: Vec<&str> = errors
        .children
        .iter()
        .map(|e| e.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if !messages.is_empty() {
        return Some(messages.join("; "));
    }
    let text = errors.text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub fn token(result: &XmlElement) -> Result<AuthToken, String> {
    match result.child_text("Token") {
        Some(token) if !token.is_empty() => Ok(AuthToken::new(token)),
        _ => Err("response carried no token".to_string()),
    }
}

pub fn secret(result: &XmlElement) -> Result<RemoteSecret, String> {
    let secret = result
        .child("Secret")
        .ok_or_else(|| "response carried no secret".to_string())?;

    let items = match secret.child("Items") {
        Some(items) => items
            .children_named("SecretItem")
            .map(secret_item)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(RemoteSecret {
        id: parse_id(secret.child_text("Id"), "secret Id")?,
        name: secret.child_text("Name").unwrap_or_default().to_string(),
        items,
    })
}

fn secret_item(item: &XmlElement) -> Result<SecretItem, String> {
    Ok(SecretItem {
        id: parse_id(item.child_text("Id"), "item Id")?,
        field_name: item.child_text("FieldName").unwrap_or_default().to_string(),
        value: item.child("Value").map(|v| v.text.clone()).unwrap_or_default(),
        is_file: item
            .child_text("IsFile")
            .is_some_and(|v| v.eq_ignore_ascii_case("true")),
    })
}

pub fn attachment(result: &XmlElement) -> Result<Attachment, String> {
    let file_name = result
        .child_text("FileName")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "response carried no file name".to_string())?;
    let encoded: String = result
        .child_text("FileAttachment")
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| format!("attachment is not valid base64: {}", e))?;

    Ok(Attachment {
        file_name: file_name.to_string(),
        bytes,
    })
}

fn parse_id(text: Option<&str>, what: &str) -> Result<i64, String> {
    let text = text.ok_or_else(|| format!("missing {}", what))?;
    text.parse()
        .map_err(|_| format!("invalid {} '{}'", what, text))
}
