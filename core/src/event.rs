//! Change notification
//!
//! Statements that modify a table deposit a [`ChangeEvent`] with the
//! connection. The connection fans events out through an [`EventHub`] to every
//! subscriber, and [`Observable`] turns one subscription into a filtered,
//! mapped stream for a single table.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Kind of modification that touched a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        })
    }
}

/// "Table changed" signal raised after a modifying statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            table: table.into(),
            kind,
        }
    }
}

/// A change event paired with the selector it concerns.
#[derive(Debug, Clone)]
pub struct DataSetChangedEvent<S> {
    pub kind: ChangeKind,
    pub selector: S,
}

//------------------------------------------------------------------------------
// EventHub
//------------------------------------------------------------------------------

/// Fan-out of change events to any number of channel subscribers.
#[derive(Default)]
pub struct EventHub {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. Only events published afterwards are received.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }

    /// Delivers `event` to every live subscriber and forgets the ones whose
    /// receiver has been dropped.
    pub fn publish(&self, event: &ChangeEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

//------------------------------------------------------------------------------
// Observable
//------------------------------------------------------------------------------

/// Hot stream of values derived from change events on one table.
///
/// Nothing is emitted until a change happens after the observable was
/// created. Iterating blocks until the next relevant event arrives and ends
/// when the source connection is gone.
pub struct Observable<T> {
    receiver: Receiver<ChangeEvent>,
    table: &'static str,
    map: Box<dyn FnMut(ChangeEvent) -> T + Send>,
}

impl<T> Observable<T> {
    pub fn new(
        receiver: Receiver<ChangeEvent>,
        table: &'static str,
        map: impl FnMut(ChangeEvent) -> T + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            table,
            map: Box::new(map),
        }
    }

    #[inline]
    pub fn table(&self) -> &'static str {
        self.table
    }

    fn accept(&mut self, event: ChangeEvent) -> Option<T> {
        (event.table == self.table).then(|| (self.map)(event))
    }

    /// Returns the next pending value without blocking.
    pub fn try_next(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if let Some(value) = self.accept(event) {
                        return Some(value);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Waits up to `timeout` for the next value.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<T> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(event) => {
                    if let Some(value) = self.accept(event) {
                        return Some(value);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

impl<T> Iterator for Observable<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let event = self.receiver.recv().ok()?;
            if let Some(value) = self.accept(event) {
                return Some(value);
            }
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
