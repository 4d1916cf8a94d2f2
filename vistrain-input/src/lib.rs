//! Response channels for training trials.
//!
//! Pointer, keyboard and voice candidates all land in one inbox owned by a
//! [`ResponseAdapter`]; the adapter accepts at most one answer per armed
//! period and discards everything else.

pub mod adapter;
pub mod error;
pub mod hotkeys;
pub mod keywords;
pub mod pointer;
pub mod voice;

pub use adapter::{Candidate, InputSource, ResponseAdapter, ResponseSender};
pub use error::VoiceError;
pub use hotkeys::{map_key, Key, ResponseContext};
pub use keywords::{match_command, match_transcript};
pub use pointer::{distance_zones, hit_test, HitZone};
pub use voice::{TranscriptionService, VoiceChannel, VoiceEvent, VoiceSink, VoiceStatus};
