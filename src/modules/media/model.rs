use std::str::FromStr;

use crate::api::error;
use crate::modules::message::schema::MessageType;

/// Top-level folder a blob lands in, by media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    Images,
    Audios,
    Documents,
    Videos,
}

impl MediaFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaFolder::Images => "images",
            MediaFolder::Audios => "audios",
            MediaFolder::Documents => "documents",
            MediaFolder::Videos => "videos",
        }
    }
}

impl From<MessageType> for MediaFolder {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Image => MediaFolder::Images,
            MessageType::Audio => MediaFolder::Audios,
            MessageType::Video => MediaFolder::Videos,
            MessageType::Document | MessageType::Text => MediaFolder::Documents,
        }
    }
}

impl FromStr for MediaFolder {
    type Err = error::SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "images" => Ok(MediaFolder::Images),
            "audios" => Ok(MediaFolder::Audios),
            "documents" => Ok(MediaFolder::Documents),
            "videos" => Ok(MediaFolder::Videos),
            _ => Err(error::SystemError::not_found("Unknown media folder")),
        }
    }
}

impl std::fmt::Display for MediaFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
