use crate::api::error;

#[derive(Debug, Clone)]
pub struct NewContact {
    pub number: String,
    pub name: Option<String>,
}

/// Strips the transport suffixes the gateway appends to raw chat ids.
///
/// `5511999@s.whatsapp.net` and `5511999:12@s.whatsapp.net` (multi-device)
/// both normalize to `5511999`.
pub fn normalize_number(raw: &str) -> Result<String, error::SystemError> {
    let jid = raw.split('@').next().unwrap_or_default();
    let number = jid.split(':').next().unwrap_or_default().trim();

    if number.is_empty() {
        return Err(error::SystemError::bad_request("Chat id does not carry a phone number"));
    }

    Ok(number.to_string())
}
