//! Custom-ID encoding for pagination buttons and the jump modal.

const TOKEN_PREFIX: &str = "pg";
const MODAL_TOKEN_PREFIX: &str = "pgm";
/// Custom ID of the page-number text input inside the jump modal.
pub const JUMP_INPUT_ID: &str = "page";

/// Build a button custom ID for a control.
pub fn build_custom_id(control_id: &str) -> String {
    format!("{TOKEN_PREFIX}:{control_id}")
}

/// Extract the control id from a pagination button custom ID.
pub fn parse_custom_id(custom_id: &str) -> Option<&str> {
    let (prefix, control_id) = custom_id.split_once(':')?;
    if prefix != TOKEN_PREFIX || control_id.is_empty() || control_id.contains(':') {
        return None;
    }

    Some(control_id)
}

/// Build the jump modal custom ID for a message.
pub fn build_modal_custom_id(message_id: u64) -> String {
    format!("{MODAL_TOKEN_PREFIX}:{message_id}")
}

/// Extract the message ID from a jump modal custom ID.
pub fn parse_modal_custom_id(custom_id: &str) -> Option<u64> {
    let (prefix, message_id) = custom_id.split_once(':')?;
    if prefix != MODAL_TOKEN_PREFIX {
        return None;
    }

    message_id.parse::<u64>().ok().filter(|id| *id != 0)
}

/// Whether a custom ID belongs to pagination buttons or modals.
pub fn is_pagination_custom_id(custom_id: &str) -> bool {
    parse_custom_id(custom_id).is_some() || parse_modal_custom_id(custom_id).is_some()
}
