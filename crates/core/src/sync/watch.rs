//! Filesystem watch source with per-path coalescing.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::error::SyncError;

/// A vault file change, as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The file was created or its content changed.
    Changed(PathBuf),
    /// The file is gone.
    Removed(PathBuf),
}

impl ChangeEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(p) | Self::Removed(p) => p,
        }
    }
}

/// Translate a raw notify event into change events.
pub fn change_events(event: Event) -> Vec<ChangeEvent> {
    let Event { kind, mut paths, .. } = event;
    match kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => {
            let to = paths.pop().unwrap_or_default();
            let from = paths.pop().unwrap_or_default();
            vec![ChangeEvent::Removed(from), ChangeEvent::Changed(to)]
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
            paths.into_iter().map(ChangeEvent::Removed).collect()
        }
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any => {
            paths.into_iter().map(ChangeEvent::Changed).collect()
        }
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

/// Pending events keyed by path.
///
/// A path is released once no event for it has arrived for `debounce`; a
/// newer event replaces the pending one, so bursts collapse into their last
/// event.
#[derive(Debug)]
pub struct Coalescer {
    debounce: Duration,
    pending: HashMap<PathBuf, (ChangeEvent, Instant)>,
}

impl Coalescer {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce, pending: HashMap::new() }
    }

    pub fn push(&mut self, event: ChangeEvent, now: Instant) {
        self.pending.insert(event.path().to_path_buf(), (event, now));
    }

    /// Earliest instant at which some pending path becomes ready.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, seen)| *seen + self.debounce).min()
    }

    /// Remove and return the events whose path has been quiet long enough.
    pub fn drain_ready(&mut self, now: Instant) -> Vec<ChangeEvent> {
        let ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, (_, seen))| now.saturating_duration_since(*seen) >= self.debounce)
            .map(|(path, _)| path.clone())
            .collect();
        self.take(ready)
    }

    /// Remove and return every pending event.
    pub fn drain_all(&mut self) -> Vec<ChangeEvent> {
        let all: Vec<PathBuf> = self.pending.keys().cloned().collect();
        self.take(all)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn take(&mut self, paths: Vec<PathBuf>) -> Vec<ChangeEvent> {
        let mut taken: Vec<(ChangeEvent, Instant)> =
            paths.into_iter().filter_map(|p| self.pending.remove(&p)).collect();
        taken.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.path().cmp(b.0.path())));
        taken.into_iter().map(|(event, _)| event).collect()
    }
}

/// Recursive watch over the vault root.
///
/// Iterating yields coalesced [`ChangeEvent`]s, one at a time, until the
/// underlying watcher goes away.
pub struct VaultWatcher {
    _watcher: Option<RecommendedWatcher>,
    events: CoalescedEvents,
}

impl VaultWatcher {
    pub fn start(root: &Path, debounce: Duration) -> Result<Self, SyncError> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(tx, NotifyConfig::default())
            .map_err(|e| SyncError::Watch { path: root.to_path_buf(), source: e })?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| SyncError::Watch { path: root.to_path_buf(), source: e })?;

        Ok(Self { _watcher: Some(watcher), events: CoalescedEvents::new(rx, debounce) })
    }

    /// Coalesce events from an existing channel instead of a live watcher.
    pub fn from_channel(rx: Receiver<notify::Result<Event>>, debounce: Duration) -> Self {
        Self { _watcher: None, events: CoalescedEvents::new(rx, debounce) }
    }
}

impl Iterator for VaultWatcher {
    type Item = ChangeEvent;

    fn next(&mut self) -> Option<ChangeEvent> {
        self.events.next()
    }
}

struct CoalescedEvents {
    rx: Receiver<notify::Result<Event>>,
    pending: Coalescer,
    ready: VecDeque<ChangeEvent>,
    closed: bool,
}

impl CoalescedEvents {
    fn new(rx: Receiver<notify::Result<Event>>, debounce: Duration) -> Self {
        Self { rx, pending: Coalescer::new(debounce), ready: VecDeque::new(), closed: false }
    }

    fn receive(&mut self) {
        let received = match self.pending.next_deadline() {
            Some(deadline) => {
                self.rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Ok(event)) => {
                let now = Instant::now();
                for change in change_events(event) {
                    self.pending.push(change, now);
                }
            }
            Ok(Err(e)) => tracing::warn!("watch error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => self.closed = true,
        }
    }
}

impl Iterator for CoalescedEvents {
    type Item = ChangeEvent;

    fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(event);
            }
            if self.closed {
                if self.pending.is_empty() {
                    return None;
                }
                self.ready.extend(self.pending.drain_all());
                continue;
            }

            self.receive();
            self.ready.extend(self.pending.drain_ready(Instant::now()));
        }
    }
}
