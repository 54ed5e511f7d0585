//! Chat script data model
//!
//! Scripts are declarative tables: an ordered list of request/expected-reply
//! pairs, a set of abort patterns, and a timeout budget. The script engine
//! walks the table; this crate never performs I/O itself.

use std::time::Duration;

/// Names the typed field a matched reply updates
///
/// A pattern carrying a handler tells the script engine to tokenize the
/// matched line and feed the fields through the decoders into the modem
/// status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldHandler {
    /// International mobile equipment identity (AT+CGSN reply)
    Imei,
    /// Model identifier (AT+CGMM reply)
    ModelId,
    /// Manufacturer name (AT+CGMI reply)
    Manufacturer,
    /// Firmware revision (AT+CGMR reply)
    FwVersion,
    /// SIM subscriber identity (AT+CIMI reply)
    Imsi,
    /// SIM card identifier (+QCCID / +ICCID reply)
    Iccid,
    /// Signal quality report (+CSQ reply)
    SignalQuality,
    /// Extended signal quality report (+CESQ reply)
    ExtendedSignalQuality,
    /// Network registration report (+CREG / +CGREG / +CEREG, solicited or not)
    Registration,
}

/// A reply line pattern
///
/// A line matches when it starts with `prefix`; the remainder is split on the
/// `separators` characters into fields. By convention the matched prefix is
/// field 0 and the split remainder follows, so a handler sees the same
/// argument layout regardless of which pattern fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPattern {
    /// Required line prefix; empty matches any line
    pub prefix: String,
    /// Characters that split the remainder into fields; empty keeps one field
    pub separators: String,
    /// Typed field this match updates, if any
    pub handler: Option<FieldHandler>,
}

impl MatchPattern {
    /// Match a line equal to `prefix` with no fields to extract
    pub fn exact(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separators: String::new(),
            handler: None,
        }
    }

    /// Match any line; used for replies without a distinguishing prefix
    pub fn any() -> Self {
        Self::exact("")
    }

    /// Set the field separator characters
    pub fn separators(mut self, separators: impl Into<String>) -> Self {
        self.separators = separators.into();
        self
    }

    /// Attach a field handler
    pub fn handler(mut self, handler: FieldHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Whether a line matches this pattern
    pub fn matches(&self, line: &str) -> bool {
        line.starts_with(self.prefix.as_str())
    }

    /// Tokenize a matched line into fields.
    ///
    /// Field 0 is the matched prefix; the remainder is split on the separator
    /// characters. With no separators the remainder is a single field, unless
    /// it is empty.
    pub fn tokenize<'a>(&'a self, line: &'a str) -> Vec<&'a str> {
        let mut argv = vec![self.prefix.as_str()];
        let rest = &line[self.prefix.len()..];

        if self.separators.is_empty() {
            if !rest.is_empty() {
                argv.push(rest);
            }
        } else {
            argv.extend(rest.split(|c| self.separators.contains(c)));
        }

        argv
    }
}

/// Expected reply for one script command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedReply {
    /// Do not wait for a reply; pause before the next command instead
    None {
        /// Settle pause after sending the request
        pause: Duration,
    },
    /// Wait for a line matching one pattern
    Match(MatchPattern),
    /// Wait for a line matching any of several patterns
    AnyOf(Vec<MatchPattern>),
}

/// One request/expected-reply step in a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommand {
    /// Request to transmit; empty sends nothing and only waits for the reply
    pub request: String,
    /// Reply the engine must see before advancing
    pub reply: ExpectedReply,
}

impl ChatCommand {
    /// Send `request` and wait for a line matching `pattern`
    pub fn expect(request: impl Into<String>, pattern: MatchPattern) -> Self {
        Self {
            request: request.into(),
            reply: ExpectedReply::Match(pattern),
        }
    }

    /// Send `request` and wait for a line matching any of `patterns`
    pub fn expect_any(request: impl Into<String>, patterns: Vec<MatchPattern>) -> Self {
        Self {
            request: request.into(),
            reply: ExpectedReply::AnyOf(patterns),
        }
    }

    /// Send nothing, wait for a further reply line from the previous request
    pub fn expect_line(pattern: MatchPattern) -> Self {
        Self::expect("", pattern)
    }

    /// Send `request` without waiting for a reply, then pause
    pub fn no_reply(request: impl Into<String>, pause: Duration) -> Self {
        Self {
            request: request.into(),
            reply: ExpectedReply::None { pause },
        }
    }
}

/// A complete chat script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatScript {
    /// Name used in logs
    pub name: String,
    /// Ordered command steps
    pub commands: Vec<ChatCommand>,
    /// Any of these matching a reply line aborts the script as failed
    pub abort_matches: Vec<MatchPattern>,
    /// Budget for the whole script
    pub timeout: Duration,
}

impl ChatScript {
    /// Create a script
    pub fn new(
        name: impl Into<String>,
        commands: Vec<ChatCommand>,
        abort_matches: Vec<MatchPattern>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            commands,
            abort_matches,
            timeout,
        }
    }

    /// Whether a reply line hits an abort pattern
    pub fn is_abort(&self, line: &str) -> bool {
        self.abort_matches.iter().any(|m| m.matches(line))
    }
}

/// The three scripts a modem vendor profile provides
#[derive(Debug, Clone)]
pub struct ScriptSet {
    /// Run over the raw transport after power-up; configures the modem and
    /// requests multiplexed mode
    pub init: ChatScript,
    /// Run on the data channel in command mode; activates the packet context
    /// and dials out
    pub dial: ChatScript,
    /// Run periodically on the supervision channel to refresh registration
    /// and signal state
    pub periodic: ChatScript,
}
