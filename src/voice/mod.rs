//! Voice call integration

pub mod call;

pub use call::{CallError, CallHandle, CallSession, CallState, VoiceCallProvider};
