//! Deferred side-effecting actions.
//!
//! Generators for output, raise and throw matchers produce an [`Action`] value.
//! Producing it has no effect; the effect happens only when the caller invokes it,
//! either against the real process streams or against a [`CapturedEffects`] sink.

use std::fmt;
use std::io::Write;

use thiserror::Error;

use crate::value::Value;

/// A process output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputStream {
    #[default]
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Non-local exit produced by invoking an action
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Interrupt {
    /// An error of the given kind was raised
    #[error("{kind}: {message}")]
    Raised { kind: String, message: String },

    /// A signal was thrown, optionally carrying a payload
    #[error("uncaught throw :{signal}")]
    Thrown {
        signal: String,
        payload: Option<Value>,
    },
}

/// Destination for output written by an action
pub trait EffectSink {
    fn write(&mut self, stream: OutputStream, text: &str);
}

/// Writes to the real process stdout and stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessStreams;

impl EffectSink for ProcessStreams {
    fn write(&mut self, stream: OutputStream, text: &str) {
        // Output actions mirror `print`; a closed pipe is not the action's failure
        let _ = match stream {
            OutputStream::Stdout => std::io::stdout().write_all(text.as_bytes()),
            OutputStream::Stderr => std::io::stderr().write_all(text.as_bytes()),
        };
    }
}

/// In-memory sink recording everything written to each stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedEffects {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedEffects {
    /// Text captured for one stream
    pub fn stream(&self, stream: OutputStream) -> &str {
        match stream {
            OutputStream::Stdout => &self.stdout,
            OutputStream::Stderr => &self.stderr,
        }
    }
}

impl EffectSink for CapturedEffects {
    fn write(&mut self, stream: OutputStream, text: &str) {
        match stream {
            OutputStream::Stdout => self.stdout.push_str(text),
            OutputStream::Stderr => self.stderr.push_str(text),
        }
    }
}

/// A zero-argument action performed only on explicit invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Print `text` to `stream`
    Output { stream: OutputStream, text: Value },
    /// Raise an error of `kind` with `message`
    Raise { kind: String, message: String },
    /// Throw `signal`, optionally with a payload
    Throw {
        signal: String,
        payload: Option<Value>,
    },
}

impl Action {
    /// Perform the action against the real process streams
    pub fn invoke(&self) -> Result<(), Interrupt> {
        self.invoke_with(&mut ProcessStreams)
    }

    /// Perform the action against the given sink
    pub fn invoke_with(&self, sink: &mut dyn EffectSink) -> Result<(), Interrupt> {
        match self {
            Action::Output { stream, text } => {
                sink.write(*stream, &text.to_string());
                Ok(())
            }
            Action::Raise { kind, message } => Err(Interrupt::Raised {
                kind: kind.clone(),
                message: message.clone(),
            }),
            Action::Throw { signal, payload } => Err(Interrupt::Thrown {
                signal: signal.clone(),
                payload: payload.clone(),
            }),
        }
    }

    /// Perform the action against a fresh in-memory sink
    pub fn capture(&self) -> (CapturedEffects, Result<(), Interrupt>) {
        let mut effects = CapturedEffects::default();
        let outcome = self.invoke_with(&mut effects);
        (effects, outcome)
    }

    /// Short description used when inspecting values
    pub fn describe(&self) -> String {
        match self {
            Action::Output { stream, text } => format!("print {} to {}", text.inspect(), stream),
            Action::Raise { kind, message } => format!("raise {}, {:?}", kind, message),
            Action::Throw {
                signal,
                payload: Some(payload),
            } => format!("throw :{}, {}", signal, payload.inspect()),
            Action::Throw {
                signal,
                payload: None,
            } => format!("throw :{}", signal),
        }
    }
}
