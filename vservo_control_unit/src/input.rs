//! Operator key sources.
//!
//! - [`StdinKeys`] - reader thread forwarding typed characters over a channel
//! - [`ScriptedKeys`] - fixed per-poll script for headless runs and tests
//! - [`KeyChain`] - a script first, then another source

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::debug;
use vservo_common::vehicle::driver::KeySource;

/// Keys typed on stdin, one character per poll.
///
/// Stdin is line-buffered, so keys arrive after Enter. The reader thread
/// exits at EOF; afterwards every poll returns `None`.
pub struct StdinKeys {
    rx: Receiver<char>,
    closed: bool,
}

impl StdinKeys {
    /// Spawn the reader thread.
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-keys".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    for c in line.chars().filter(|c| !c.is_whitespace()) {
                        if tx.send(c).is_err() {
                            return;
                        }
                    }
                }
                debug!("stdin closed, key reader exiting");
            })?;
        Ok(Self { rx, closed: false })
    }
}

impl KeySource for StdinKeys {
    fn poll_key(&mut self) -> Option<char> {
        if self.closed {
            return None;
        }
        match self.rx.try_recv() {
            Ok(c) => Some(c),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }
}

/// Replays a fixed script: each poll consumes one entry, then `None` forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    script: VecDeque<Option<char>>,
}

impl ScriptedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press `key` on the next unscripted poll.
    pub fn key(mut self, key: char) -> Self {
        self.script.push_back(Some(key));
        self
    }

    /// Report no key for `polls` polls.
    pub fn idle(mut self, polls: usize) -> Self {
        self.script.extend(std::iter::repeat_n(None, polls));
        self
    }

    /// Entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self) -> Option<char> {
        self.script.pop_front().flatten()
    }
}

/// Drains a [`ScriptedKeys`] script, then polls `next`.
pub struct KeyChain<K> {
    script: ScriptedKeys,
    next: K,
}

impl<K: KeySource> KeyChain<K> {
    pub fn new(script: ScriptedKeys, next: K) -> Self {
        Self { script, next }
    }
}

impl<K: KeySource> KeySource for KeyChain<K> {
    fn poll_key(&mut self) -> Option<char> {
        if self.script.remaining() > 0 {
            self.script.poll_key()
        } else {
            self.next.poll_key()
        }
    }
}
