pub mod interface;
pub mod client;

pub use interface::{AudioStream, TTSInterface, TtsError};
pub use client::ElevenLabsClient;
