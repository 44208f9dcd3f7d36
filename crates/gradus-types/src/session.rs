//! Inference mode flags and the method-call log
//!
//! A [`TypingSession`] is the explicit context one checking run threads
//! through inference. The [`ambient`] module keeps one session per thread
//! for callers that cannot thread it.

use crate::pos::Pos;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Flags that change how inference behaves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceMode {
    /// Record the position and name of every method call seen
    pub accumulate_method_calls: bool,
    /// Infer missing annotations instead of treating them as `Any`
    pub suggest_mode: bool,
}

impl InferenceMode {
    /// Parse a mode from JSON. Missing keys are off.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One recorded method call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Call site
    pub pos: Pos,
    /// Method name
    pub name: String,
}

/// Mode flags plus the calls accumulated so far
#[derive(Debug, Clone, Default)]
pub struct TypingSession {
    mode: InferenceMode,
    method_calls: Vec<MethodCall>,
}

impl TypingSession {
    /// A session with an empty log
    pub fn new(mode: InferenceMode) -> Self {
        Self {
            mode,
            method_calls: Vec::new(),
        }
    }

    /// Current flags
    pub fn mode(&self) -> InferenceMode {
        self.mode
    }

    /// Turning accumulation off keeps what was already recorded.
    pub fn set_accumulate_method_calls(&mut self, on: bool) {
        debug!(on, recorded = self.method_calls.len(), "accumulate_method_calls");
        self.mode.accumulate_method_calls = on;
    }

    /// Whether method calls are being recorded
    pub fn accumulate_method_calls(&self) -> bool {
        self.mode.accumulate_method_calls
    }

    /// Switch suggest mode
    pub fn set_suggest_mode(&mut self, on: bool) {
        debug!(on, "suggest_mode");
        self.mode.suggest_mode = on;
    }

    /// Whether suggest mode is on
    pub fn is_suggest_mode(&self) -> bool {
        self.mode.suggest_mode
    }

    /// Log a call if accumulation is on. Returns whether it was recorded.
    pub fn record_method_call(&mut self, pos: Pos, name: impl Into<String>) -> bool {
        if !self.mode.accumulate_method_calls {
            return false;
        }
        let name = name.into();
        trace!(method = %name, %pos, "method call recorded");
        self.method_calls.push(MethodCall { pos, name });
        true
    }

    /// Recorded calls in the order they were seen
    pub fn method_calls(&self) -> &[MethodCall] {
        &self.method_calls
    }

    /// Drain the log, keeping the flags
    pub fn take_method_calls(&mut self) -> Vec<MethodCall> {
        std::mem::take(&mut self.method_calls)
    }

    /// The log as a JSON array
    pub fn method_calls_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.method_calls)
    }

    /// All flags off, log empty
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-thread session for callers without an explicit context
pub mod ambient {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static SESSION: RefCell<TypingSession> = RefCell::new(TypingSession::default());
    }

    /// Start a new run: the log is cleared and `mode` installed
    pub fn begin_session(mode: InferenceMode) {
        debug!(?mode, "typing session started");
        SESSION.with(|s| *s.borrow_mut() = TypingSession::new(mode));
    }

    /// Run `f` against this thread's session
    pub fn with_session<R>(f: impl FnOnce(&mut TypingSession) -> R) -> R {
        SESSION.with(|s| f(&mut s.borrow_mut()))
    }

    /// Switch method-call recording
    pub fn set_accumulate_method_calls(on: bool) {
        with_session(|s| s.set_accumulate_method_calls(on));
    }

    /// Whether method calls are being recorded
    pub fn accumulate_method_calls() -> bool {
        with_session(|s| s.accumulate_method_calls())
    }

    /// Switch suggest mode
    pub fn set_suggest_mode(on: bool) {
        with_session(|s| s.set_suggest_mode(on));
    }

    /// Whether suggest mode is on
    pub fn is_suggest_mode() -> bool {
        with_session(|s| s.is_suggest_mode())
    }

    /// Log a call if recording is on
    pub fn record_method_call(pos: Pos, name: impl Into<String>) -> bool {
        with_session(|s| s.record_method_call(pos, name))
    }

    /// Copy of the calls recorded so far
    pub fn accumulated_method_calls() -> Vec<MethodCall> {
        with_session(|s| s.method_calls().to_vec())
    }

    /// All flags off, log empty
    pub fn reset() {
        with_session(|s| s.reset());
    }
}
