//! Request and response models for the gateway endpoints.

pub mod ask;

pub use ask::{AskRequest, AskResponse};
