use serde::Serialize;

use crate::modules::message::schema::MessageType;

#[derive(Debug, Clone, Serialize)]
pub struct SendText {
    pub number: String,
    pub text: String,
}

/// `file` is a URL the gateway can fetch, normally a relayed blob.
#[derive(Debug, Clone, Serialize)]
pub struct SendMedia {
    pub number: String,
    #[serde(rename = "type")]
    pub _type: MessageType,
    pub file: String,
    pub text: String,
}
