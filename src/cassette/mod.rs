//! Cassettes: YAML recordings of upstream calls, replayed for offline runs and tests.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Cassette, Interaction, Port};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;
