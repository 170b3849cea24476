//! Payloads for the pass-through messages the relay forwards to the
//! automation backend. Nothing here performs I/O.

use dh_core::host::Canvas;
use dh_core::message::{Outbound, RelayChannel};
use serde_json::{Value, json};

pub const SENDING_MESSAGE: &str = "Sending message to backend...";
pub const SENDING_CREDENTIALS: &str = "Sending credentials...";
pub const MISSING_API_KEY: &str = "Error: API Key was missing.";
pub const UNKNOWN_FILE_TOAST: &str = "Error: Could not identify the current Figma file.";
pub const UNKNOWN_FILE_STATUS: &str = "Error: Could not identify current Figma file.";
pub const FROM_URL: &str = "Manually Entered (from URL)";
pub const AS_KEY: &str = "Manually Entered (as Key)";

/// Forward a chat message with the frames it refers to.
pub fn chat_message(message: &str, figma_frame: Value) -> Vec<Outbound> {
    vec![
        Outbound::notify(SENDING_MESSAGE),
        Outbound::Relay {
            channel: RelayChannel::Chat,
            body: json!({ "message": message, "figmaFrame": figma_frame }),
        },
    ]
}

/// Resolve which document the credentials belong to and forward them.
///
/// A manual key wins over the open document. A manual key that is a design
/// URL contributes the path segment after `file`.
pub fn credentials(
    canvas: &impl Canvas,
    api_key: Option<&str>,
    manual_file_key: Option<&str>,
) -> Vec<Outbound> {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        log::error!("credentials message has no API key");
        return vec![Outbound::CredentialStatus {
            text: MISSING_API_KEY.into(),
            is_error: true,
        }];
    };

    let (file_key, file_name) = match manual_file_key.filter(|k| !k.is_empty()) {
        Some(manual) => match file_key_from_url(manual) {
            Some(key) => (key.to_string(), FROM_URL.to_string()),
            None => (manual.to_string(), AS_KEY.to_string()),
        },
        None => match canvas.file_key() {
            Some(key) => (key, canvas.file_name()),
            None => {
                log::error!("the open document has no file key");
                return vec![
                    Outbound::notify_error(UNKNOWN_FILE_TOAST),
                    Outbound::CredentialStatus {
                        text: UNKNOWN_FILE_STATUS.into(),
                        is_error: true,
                    },
                ];
            }
        },
    };
    log::info!("forwarding credentials for {file_name} ({file_key})");

    vec![
        Outbound::notify(SENDING_CREDENTIALS),
        Outbound::Relay {
            channel: RelayChannel::Credentials,
            body: json!({ "apiKey": api_key, "fileKey": file_key, "fileName": file_name }),
        },
    ]
}

/// The segment after `file` in an absolute URL's path, if there is one.
fn file_key_from_url(input: &str) -> Option<&str> {
    let (scheme, rest) = input.split_once("://")?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
    {
        return None;
    }
    let path = rest.split_once('/').map(|(_, path)| path)?;
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/');
    segments.find(|s| *s == "file")?;
    segments.next().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_key_from_design_urls() {
        assert_eq!(
            file_key_from_url("https://www.figma.com/file/AbC123/My-Design?node-id=1"),
            Some("AbC123")
        );
        assert_eq!(file_key_from_url("https://www.figma.com/design/AbC123/x"), None);
        assert_eq!(file_key_from_url("https://www.figma.com/file/"), None);
        assert_eq!(file_key_from_url("AbC123"), None);
        assert_eq!(file_key_from_url("https://host"), None);
    }
}
