pub mod contact;
pub mod conversation;
pub mod gateway;
pub mod media;
pub mod message;
pub mod outbound;
pub mod webhook;
