//! Virtual script engine
//!
//! Walks a chat script against a canned [`ResponseProfile`](crate::profile::ResponseProfile),
//! applying field matches through the shared status block the same way a
//! real pattern-matching engine would, and posts the script result through
//! the event queue.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tracing::{debug, trace};

use cellar_modem::{
    apply_field, CollabError, EventSender, ModemEvent, ScriptRunner, ScriptTarget, SharedStatus,
};
use cellar_script::{unsolicited_matches, ChatScript, ExpectedReply, MatchPattern};

use crate::profile::ResponseProfile;

/// In-memory script engine answering from a response profile
pub struct VirtualScriptRunner {
    events: EventSender,
    status: SharedStatus,
    profile: Mutex<ResponseProfile>,
    attachment: Mutex<Option<ScriptTarget>>,
    runs: Mutex<Vec<String>>,
    forced_failures: Mutex<HashMap<String, usize>>,
    unsolicited: Vec<MatchPattern>,
}

impl VirtualScriptRunner {
    /// Create a detached engine
    pub fn new(events: EventSender, status: SharedStatus, profile: ResponseProfile) -> Self {
        Self {
            events,
            status,
            profile: Mutex::new(profile),
            attachment: Mutex::new(None),
            runs: Mutex::new(Vec::new()),
            forced_failures: Mutex::new(HashMap::new()),
            unsolicited: unsolicited_matches(),
        }
    }

    /// Names of every script run so far, in order
    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().clone()
    }

    /// Current attachment, if any
    pub fn attachment(&self) -> Option<ScriptTarget> {
        *self.attachment.lock()
    }

    /// Make the next `times` runs of the named script fail
    pub fn fail_script(&self, name: &str, times: usize) {
        self.forced_failures.lock().insert(name.to_string(), times);
    }

    /// Replace the response profile
    pub fn set_profile(&self, profile: ResponseProfile) {
        *self.profile.lock() = profile;
    }

    /// Deliver an unsolicited line, as the modem would between script runs
    pub fn inject_unsolicited(&self, line: &str) {
        self.apply_unsolicited(line);
    }

    fn apply_unsolicited(&self, line: &str) {
        for pattern in &self.unsolicited {
            if pattern.matches(line) {
                if let Some(handler) = pattern.handler {
                    let argv = pattern.tokenize(line);
                    apply_field(&mut self.status.lock(), handler, &argv, &self.events);
                }
                return;
            }
        }
    }

    fn take_forced_failure(&self, name: &str) -> bool {
        let mut failures = self.forced_failures.lock();
        match failures.get_mut(name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Consume reply lines until one matches an expected pattern.
    ///
    /// Expected patterns win over abort patterns (a script may explicitly
    /// allow `ERROR`); lines matching neither are fed to the unsolicited
    /// matches. Running out of lines is the simulation's script timeout.
    fn await_match(
        &self,
        script: &ChatScript,
        pending: &mut VecDeque<String>,
        expected: &[MatchPattern],
    ) -> bool {
        while let Some(line) = pending.pop_front() {
            if let Some(pattern) = expected.iter().find(|p| p.matches(&line)) {
                if let Some(handler) = pattern.handler {
                    let argv = pattern.tokenize(&line);
                    apply_field(&mut self.status.lock(), handler, &argv, &self.events);
                }
                trace!("matched {line:?}");
                return true;
            }

            if script.is_abort(&line) {
                debug!("abort pattern hit: {line:?}");
                return false;
            }

            self.apply_unsolicited(&line);
        }

        debug!("script {} ran out of replies", script.name);
        false
    }
}

impl ScriptRunner for VirtualScriptRunner {
    fn attach(&self, target: ScriptTarget) -> Result<(), CollabError> {
        *self.attachment.lock() = Some(target);
        Ok(())
    }

    fn run(&self, script: &ChatScript) -> Result<(), CollabError> {
        if self.attachment.lock().is_none() {
            return Err(CollabError::NotAttached);
        }

        self.runs.lock().push(script.name.clone());
        debug!("running script {}", script.name);

        if self.take_forced_failure(&script.name) {
            self.events.send(ModemEvent::ScriptFailed);
            return Ok(());
        }

        let mut pending: VecDeque<String> = VecDeque::new();

        for command in &script.commands {
            if !command.request.is_empty() {
                let lines = self.profile.lock().lines_for(&command.request);
                trace!("request {:?} -> {lines:?}", command.request);
                pending.extend(lines);
            }

            let matched = match &command.reply {
                ExpectedReply::None { .. } => {
                    pending.clear();
                    true
                }
                ExpectedReply::Match(pattern) => {
                    self.await_match(script, &mut pending, std::slice::from_ref(pattern))
                }
                ExpectedReply::AnyOf(patterns) => self.await_match(script, &mut pending, patterns),
            };

            if !matched {
                self.events.send(ModemEvent::ScriptFailed);
                return Ok(());
            }
        }

        debug!("script {} succeeded", script.name);
        self.events.send(ModemEvent::ScriptSuccess);
        Ok(())
    }

    fn release(&self) {
        *self.attachment.lock() = None;
    }
}
