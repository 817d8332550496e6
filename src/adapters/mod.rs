//! Adapter implementations for port traits.
//!
//! - `live/`: Gemini and Cloudinary over HTTP
//! - `recording/`: wrap a live adapter and record each call
//! - `replaying/`: answer calls from a cassette

pub mod live;
pub mod recording;
pub mod replaying;
