//! Scriptable decode pipeline for controller tests.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::arithmetic_side_effects)] // test double, counters cannot realistically overflow

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use library::EntryKind;
use platform::storage::File;
use platform::Gain;

use crate::decoder::DecodeError;
use crate::pipeline::DecodePipeline;

#[derive(Default)]
struct Script {
    started: Vec<EntryKind>,
    stop_calls: usize,
    failing_starts: usize,
    /// Units per stream; `None` streams forever
    units_per_stream: Option<usize>,
    remaining: Option<usize>,
    running: bool,
    gain: Option<Gain>,
}

/// Pipeline that records calls and never touches audio.
///
/// Clones share state so a test can inspect the pipeline after moving it
/// into a controller.
#[derive(Clone, Default)]
pub struct MockPipeline {
    script: Rc<RefCell<Script>>,
}

impl MockPipeline {
    /// Pipeline whose streams never end
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` starts fail
    pub fn fail_starts(&self, n: usize) {
        self.script.borrow_mut().failing_starts = n;
    }

    /// Streams started from now on end after `units` advances
    pub fn set_units_per_stream(&self, units: usize) {
        self.script.borrow_mut().units_per_stream = Some(units);
    }

    /// Make the current stream report end of stream on the next advance
    pub fn end_current_stream(&self) {
        self.script.borrow_mut().remaining = Some(0);
    }

    /// Kinds passed to successful starts, in order
    pub fn started(&self) -> Vec<EntryKind> {
        self.script.borrow().started.clone()
    }

    /// Number of `stop` calls
    pub fn stop_calls(&self) -> usize {
        self.script.borrow().stop_calls
    }

    /// Whether a stream is active
    pub fn running(&self) -> bool {
        self.script.borrow().running
    }

    /// Gain last applied
    pub fn gain(&self) -> Option<Gain> {
        self.script.borrow().gain
    }
}

impl<F: File> DecodePipeline<F> for MockPipeline {
    type Error = DecodeError;

    async fn start(&mut self, source: F, kind: EntryKind) -> Result<(), Self::Error> {
        drop(source);
        let mut s = self.script.borrow_mut();
        s.running = false;
        if s.failing_starts > 0 {
            s.failing_starts -= 1;
            return Err(DecodeError::InvalidData);
        }
        s.started.push(kind);
        s.remaining = s.units_per_stream;
        s.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.script.borrow().running
    }

    async fn advance(&mut self) -> bool {
        let mut s = self.script.borrow_mut();
        if !s.running {
            return false;
        }
        match s.remaining {
            Some(0) => {
                s.running = false;
                false
            }
            Some(n) => {
                s.remaining = Some(n - 1);
                true
            }
            None => true,
        }
    }

    fn stop(&mut self) {
        let mut s = self.script.borrow_mut();
        s.stop_calls += 1;
        s.running = false;
    }

    fn set_gain(&mut self, gain: Gain) {
        self.script.borrow_mut().gain = Some(gain);
    }
}
