//! Audio file input and output
//!
//! - WAV decoding to a mono [`crate::Signal`] and float WAV writing ([`wav`])

pub mod wav;

pub use wav::{load_wav, write_wav};
