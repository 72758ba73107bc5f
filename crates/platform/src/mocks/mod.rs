//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests across the workspace.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::arithmetic_side_effects)] // test double, counters cannot realistically overflow

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;
use std::string::String as StdString;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::storage::MAX_NAME_LEN;
use crate::*;

/// Error produced by the mock collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Path does not exist
    NotFound,
    /// Failure injected by the test
    Injected,
}

#[derive(Default)]
struct MockFs {
    /// Root entries in listing order: (absolute path, is_dir, contents).
    entries: Vec<(StdString, bool, Vec<u8>)>,
    root_unavailable: bool,
    fail_all_opens: bool,
    failing_paths: BTreeSet<StdString>,
    read_opens: BTreeMap<StdString, usize>,
}

impl MockFs {
    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|(p, _, _)| p == path)
    }
}

/// In-memory card with failure injection.
///
/// Cloning shares the same backing store, so a test can keep a handle after
/// moving the storage into the code under test.
#[derive(Clone, Default)]
pub struct MockStorage {
    fs: Rc<RefCell<MockFs>>,
}

impl MockStorage {
    /// Create an empty card
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file at absolute `path`
    pub fn add_file(&self, path: &str, contents: &[u8]) {
        let mut fs = self.fs.borrow_mut();
        match fs.position(path) {
            Some(i) => {
                if let Some(entry) = fs.entries.get_mut(i) {
                    entry.2 = contents.to_vec();
                }
            }
            None => fs.entries.push((path.to_owned(), false, contents.to_vec())),
        }
    }

    /// Add a file of `size` zero bytes
    pub fn add_sized_file(&self, path: &str, size: usize) {
        self.add_file(path, &vec![0u8; size]);
    }

    /// Add a directory entry to the root listing
    pub fn add_dir(&self, path: &str) {
        self.fs.borrow_mut().entries.push((path.to_owned(), true, Vec::new()));
    }

    /// Delete a file
    pub fn remove(&self, path: &str) {
        let mut fs = self.fs.borrow_mut();
        if let Some(i) = fs.position(path) {
            fs.entries.remove(i);
        }
    }

    /// Contents of `path`, if present
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let fs = self.fs.borrow();
        fs.position(path)
            .and_then(|i| fs.entries.get(i))
            .map(|(_, _, data)| data.clone())
    }

    /// Make `open_root` fail
    pub fn set_root_unavailable(&self, unavailable: bool) {
        self.fs.borrow_mut().root_unavailable = unavailable;
    }

    /// Make every read-mode open fail
    pub fn set_fail_all_opens(&self, fail: bool) {
        self.fs.borrow_mut().fail_all_opens = fail;
    }

    /// Make read-mode opens of `path` fail even though it exists
    pub fn fail_open(&self, path: &str) {
        self.fs.borrow_mut().failing_paths.insert(path.to_owned());
    }

    /// Number of read-mode open attempts on `path`
    pub fn read_opens(&self, path: &str) -> usize {
        self.fs.borrow().read_opens.get(path).copied().unwrap_or(0)
    }

    /// Total read-mode open attempts on every path
    pub fn total_read_opens(&self) -> usize {
        self.fs.borrow().read_opens.values().sum()
    }
}

/// An open mock file.
pub struct MockFile {
    data: Vec<u8>,
    pos: usize,
    writer: Option<(Rc<RefCell<MockFs>>, StdString)>,
}

impl File for MockFile {
    type Error = MockError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let rest = self.data.get(self.pos..).unwrap_or(&[]);
        let n = rest.len().min(buf.len());
        for (dst, src) in buf.iter_mut().zip(rest) {
            *dst = *src;
        }
        self.pos += n;
        Ok(n)
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let Some((fs, path)) = &self.writer else {
            return Err(MockError::Injected);
        };
        let mut fs = fs.borrow_mut();
        let i = fs.position(path).ok_or(MockError::NotFound)?;
        if let Some(entry) = fs.entries.get_mut(i) {
            entry.2.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Root listing snapshot.
pub struct MockDir {
    entries: VecDeque<DirEntry>,
}

impl Directory for MockDir {
    type Error = MockError;

    async fn next_entry(&mut self) -> Result<Option<DirEntry>, Self::Error> {
        Ok(self.entries.pop_front())
    }
}

impl Storage for MockStorage {
    type Error = MockError;
    type File = MockFile;
    type Dir = MockDir;

    async fn open_file(&mut self, path: &str, mode: OpenMode) -> Result<Self::File, Self::Error> {
        match mode {
            OpenMode::Read => {
                let mut fs = self.fs.borrow_mut();
                *fs.read_opens.entry(path.to_owned()).or_insert(0) += 1;
                if fs.fail_all_opens || fs.failing_paths.contains(path) {
                    return Err(MockError::Injected);
                }
                let data = fs
                    .position(path)
                    .and_then(|i| fs.entries.get(i))
                    .filter(|(_, is_dir, _)| !is_dir)
                    .map(|(_, _, data)| data.clone())
                    .ok_or(MockError::NotFound)?;
                Ok(MockFile { data, pos: 0, writer: None })
            }
            OpenMode::Write => {
                self.add_file(path, &[]);
                Ok(MockFile {
                    data: Vec::new(),
                    pos: 0,
                    writer: Some((Rc::clone(&self.fs), path.to_owned())),
                })
            }
        }
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.fs.borrow().position(path).is_some())
    }

    async fn open_root(&mut self) -> Result<Self::Dir, Self::Error> {
        let fs = self.fs.borrow();
        if fs.root_unavailable {
            return Err(MockError::Injected);
        }
        let entries = fs
            .entries
            .iter()
            .filter_map(|(path, is_dir, data)| {
                let name = heapless::String::<MAX_NAME_LEN>::try_from(path.trim_start_matches('/')).ok()?;
                Some(DirEntry {
                    name,
                    is_dir: *is_dir,
                    size: u32::try_from(data.len()).unwrap_or(u32::MAX),
                })
            })
            .collect();
        Ok(MockDir { entries })
    }
}

/// Mock audio sink recording everything written to it
#[derive(Debug, Default)]
pub struct MockAudio {
    /// Last configuration applied
    pub config: Option<AudioConfig>,
    /// Last gain applied
    pub gain: Option<Gain>,
    /// Total samples written
    pub samples_written: usize,
    /// Largest magnitude written, after gain
    pub peak: u16,
}

impl MockAudio {
    /// Create new mock audio sink
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for MockAudio {
    type Error = core::convert::Infallible;

    fn configure(&mut self, config: AudioConfig) {
        self.config = Some(config);
    }

    fn set_gain(&mut self, gain: Gain) {
        self.gain = Some(gain);
    }

    async fn write_samples(&mut self, samples: &[i16]) -> Result<(), Self::Error> {
        self.samples_written += samples.len();
        let gain = self.gain.unwrap_or_default();
        for &sample in samples {
            self.peak = self.peak.max(gain.apply(sample).unsigned_abs());
        }
        Ok(())
    }
}

/// Mock button panel with directly settable levels
#[derive(Debug, Default)]
pub struct MockButtons {
    pressed: [bool; 4],
}

impl MockButtons {
    /// All buttons released
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level of one button
    pub fn set(&mut self, button: Button, pressed: bool) {
        if let Some(level) = self.pressed.get_mut(button.index()) {
            *level = pressed;
        }
    }
}

impl ButtonPanel for MockButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        self.pressed.get(button.index()).copied().unwrap_or(false)
    }
}

/// Console capturing everything written
#[derive(Debug, Default)]
pub struct MockConsole {
    /// Captured text
    pub text: StdString,
}

impl MockConsole {
    /// Empty console
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConsoleWriter for MockConsole {
    fn write_str(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

/// Queue of pending command lines
#[derive(Debug, Default)]
pub struct MockLines {
    lines: VecDeque<Line>,
}

impl MockLines {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a line (truncated to [`MAX_LINE_LEN`])
    pub fn push(&mut self, text: &str) {
        let mut line = Line::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        self.lines.push_back(line);
    }

    /// Lines not yet polled
    pub fn pending(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for MockLines {
    fn poll_line(&mut self) -> Option<Line> {
        self.lines.pop_front()
    }
}

/// Remote transport capturing sent chunks
#[derive(Debug)]
pub struct MockTransport {
    /// Whether a peer is connected
    pub connected: bool,
    /// Whether advertising is active
    pub advertising: bool,
    /// Every chunk passed to `send_chunk`
    pub chunks: Vec<Vec<u8>>,
    /// Incoming lines from the peer
    pub incoming: MockLines,
    max_chunk: usize,
}

impl MockTransport {
    /// Disconnected transport with the given chunk limit
    pub fn new(max_chunk: usize) -> Self {
        Self {
            connected: false,
            advertising: false,
            chunks: Vec::new(),
            incoming: MockLines::new(),
            max_chunk,
        }
    }

    /// All sent chunks concatenated
    pub fn received_text(&self) -> StdString {
        let bytes: Vec<u8> = self.chunks.iter().flatten().copied().collect();
        StdString::from_utf8_lossy(&bytes).into_owned()
    }
}

impl RemoteTransport for MockTransport {
    type Error = MockError;

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn max_chunk_len(&self) -> usize {
        self.max_chunk
    }

    async fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), Self::Error> {
        if !self.connected || chunk.len() > self.max_chunk {
            return Err(MockError::Injected);
        }
        self.chunks.push(chunk.to_vec());
        Ok(())
    }

    async fn start_advertising(&mut self) -> Result<(), Self::Error> {
        self.advertising = true;
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<(), Self::Error> {
        self.advertising = false;
        Ok(())
    }
}

impl LineSource for MockTransport {
    fn poll_line(&mut self) -> Option<Line> {
        self.incoming.poll_line()
    }
}

/// Delay that returns immediately and records what was requested
#[derive(Debug, Default, Clone)]
pub struct NoopDelay {
    calls: Rc<RefCell<Vec<u32>>>,
}

impl NoopDelay {
    /// New recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested delays in milliseconds, in call order
    pub fn calls_ms(&self) -> Vec<u32> {
        self.calls.borrow().iter().map(|ns| ns / 1_000_000).collect()
    }
}

impl DelayNs for NoopDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls.borrow_mut().push(ns);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls.borrow_mut().push(ms.saturating_mul(1_000_000));
    }
}
