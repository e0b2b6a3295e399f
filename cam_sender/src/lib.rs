//! Webcam capture and streaming to the pin screen server.
pub mod sensors;

/// Error type.
pub type Error = Box<dyn std::error::Error>;
