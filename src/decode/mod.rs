//! Payload decoder module
//!
//! Supports: JSON, XML
//!
//! # Overview
//!
//! Discovery payloads are decoded by their declared content type. When the
//! type is missing or unrecognised the body is tried as JSON first and then
//! as XML; a body that is neither is a parse error.

mod decoders;
mod types;

pub use decoders::{decode_payload, extract_path, JsonDecoder, XmlDecoder};
pub use types::{PayloadDecoder, PayloadFormat};

#[cfg(test)]
mod tests;
