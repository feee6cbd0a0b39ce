//! Narration queue state machine
//!
//! One utterance in flight at a time, a small FIFO of normal-priority
//! entries behind it, and unconditional preemption for high priority.
//! This type only decides; `Narrator` carries the decisions out.

use drishti_core::{Language, Priority};
use std::collections::VecDeque;
use std::fmt;

/// How an entry left the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceOutcome {
    Spoken,
    /// The language had no voice; the fallback phrase was spoken instead
    Substituted,
    Failed,
    /// Interrupted while speaking
    Cancelled,
    /// Never spoken: shed, deduplicated or discarded by preemption
    Dropped,
}

pub type CompletionCallback = Box<dyn FnOnce(UtteranceOutcome) + Send + 'static>;

/// A narration request
pub struct QueueEntry {
    pub text: String,
    pub language: Language,
    pub priority: Priority,
    on_complete: Option<CompletionCallback>,
}

impl QueueEntry {
    pub fn new(text: impl Into<String>, language: Language, priority: Priority) -> Self {
        Self {
            text: text.into(),
            language,
            priority,
            on_complete: None,
        }
    }

    pub fn with_callback<F>(mut self, on_complete: F) -> Self
    where
        F: FnOnce(UtteranceOutcome) + Send + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Consume the entry, firing its callback
    pub fn complete(mut self, outcome: UtteranceOutcome) {
        if let Some(callback) = self.on_complete.take() {
            callback(outcome);
        }
    }
}

impl fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEntry")
            .field("text", &self.text)
            .field("language", &self.language)
            .field("priority", &self.priority)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

/// What the engine should be told to say
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub language: Language,
    pub priority: Priority,
    /// Distinguishes this utterance from any it replaced
    pub generation: u64,
}

#[derive(Debug)]
pub enum QueueDecision {
    /// Channel was idle; start speaking now
    Start(Utterance),
    /// High priority arrived while speaking: stop the current utterance,
    /// discard everything pending, start the new one
    Preempt {
        start: Utterance,
        interrupted: QueueEntry,
        discarded: Vec<QueueEntry>,
    },
    /// Waiting at this zero-based pending position
    Queued(usize),
    /// Identical text already pending
    Duplicate(QueueEntry),
    /// Pending list full
    Shed(QueueEntry),
}

pub struct NarrationQueue {
    speaking: Option<(QueueEntry, u64)>,
    pending: VecDeque<QueueEntry>,
    capacity: usize,
    generation: u64,
}

impl NarrationQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            speaking: None,
            pending: VecDeque::with_capacity(capacity),
            capacity,
            generation: 0,
        }
    }

    pub fn submit(&mut self, entry: QueueEntry) -> QueueDecision {
        if self.speaking.is_none() {
            return QueueDecision::Start(self.begin(entry));
        }

        if entry.priority == Priority::High {
            let discarded: Vec<QueueEntry> = self.pending.drain(..).collect();
            let interrupted = self.speaking.take().map(|(e, _)| e);
            let start = self.begin(entry);
            return match interrupted {
                Some(interrupted) => QueueDecision::Preempt {
                    start,
                    interrupted,
                    discarded,
                },
                None => QueueDecision::Start(start),
            };
        }

        if self.pending.iter().any(|p| p.text == entry.text) {
            return QueueDecision::Duplicate(entry);
        }

        if self.pending.len() >= self.capacity {
            return QueueDecision::Shed(entry);
        }

        self.pending.push_back(entry);
        QueueDecision::Queued(self.pending.len() - 1)
    }

    /// The utterance with `generation` finished. Returns its entry and the
    /// next utterance to start, or `None` if that utterance was already
    /// replaced.
    pub fn finish(&mut self, generation: u64) -> Option<(QueueEntry, Option<Utterance>)> {
        match &self.speaking {
            Some((_, current)) if *current == generation => {}
            _ => return None,
        }
        let (done, _) = self.speaking.take()?;
        let next = self.pending.pop_front().map(|entry| self.begin(entry));
        Some((done, next))
    }

    /// Empty the channel: the entry in flight (if any) and everything pending
    pub fn clear(&mut self) -> (Option<QueueEntry>, Vec<QueueEntry>) {
        let interrupted = self.speaking.take().map(|(e, _)| e);
        (interrupted, self.pending.drain(..).collect())
    }

    fn begin(&mut self, entry: QueueEntry) -> Utterance {
        self.generation = self.generation.wrapping_add(1);
        let utterance = Utterance {
            text: entry.text.clone(),
            language: entry.language,
            priority: entry.priority,
            generation: self.generation,
        };
        self.speaking = Some((entry, self.generation));
        utterance
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.is_some()
    }

    pub fn current_generation(&self) -> Option<u64> {
        self.speaking.as_ref().map(|(_, g)| *g)
    }

    pub fn current_text(&self) -> Option<&str> {
        self.speaking.as_ref().map(|(e, _)| e.text.as_str())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_texts(&self) -> Vec<String> {
        self.pending.iter().map(|e| e.text.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn normal(text: &str) -> QueueEntry {
        QueueEntry::new(text, Language::English, Priority::Normal)
    }

    fn high(text: &str) -> QueueEntry {
        QueueEntry::new(text, Language::English, Priority::High)
    }

    #[test]
    fn test_idle_starts_immediately() {
        let mut queue = NarrationQueue::new(2);
        match queue.submit(normal("Chair on your left")) {
            QueueDecision::Start(u) => {
                assert_eq!(u.text, "Chair on your left");
                assert_eq!(u.generation, 1);
            }
            other => panic!("Expected Start, got {:?}", other),
        }
        assert!(queue.is_speaking());
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_normal_queues_behind_speech() {
        let mut queue = NarrationQueue::new(2);
        queue.submit(normal("one"));
        assert!(matches!(queue.submit(normal("two")), QueueDecision::Queued(0)));
        assert!(matches!(queue.submit(normal("three")), QueueDecision::Queued(1)));
        assert_eq!(queue.pending_texts(), vec!["two", "three"]);
    }

    #[test]
    fn test_third_pending_is_shed() {
        let mut queue = NarrationQueue::new(2);
        queue.submit(normal("one"));
        queue.submit(normal("two"));
        queue.submit(normal("three"));
        match queue.submit(normal("four")) {
            QueueDecision::Shed(entry) => assert_eq!(entry.text, "four"),
            other => panic!("Expected Shed, got {:?}", other),
        }
        assert_eq!(queue.pending_texts(), vec!["two", "three"]);
    }

    #[test]
    fn test_duplicate_pending_text_dropped() {
        let mut queue = NarrationQueue::new(2);
        queue.submit(normal("one"));
        queue.submit(normal("two"));
        assert!(matches!(queue.submit(normal("two")), QueueDecision::Duplicate(_)));
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_high_priority_preempts() {
        let mut queue = NarrationQueue::new(2);
        queue.submit(normal("one"));
        queue.submit(normal("two"));
        queue.submit(normal("three"));

        match queue.submit(high("Warning! Stop.")) {
            QueueDecision::Preempt {
                start,
                interrupted,
                discarded,
            } => {
                assert_eq!(start.text, "Warning! Stop.");
                assert_eq!(start.priority, Priority::High);
                assert_eq!(interrupted.text, "one");
                assert_eq!(discarded.len(), 2);
            }
            other => panic!("Expected Preempt, got {:?}", other),
        }
        assert_eq!(queue.current_text(), Some("Warning! Stop."));
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_high_preempts_high() {
        let mut queue = NarrationQueue::new(2);
        queue.submit(high("first danger"));
        assert!(matches!(queue.submit(high("second danger")), QueueDecision::Preempt { .. }));
        assert_eq!(queue.current_text(), Some("second danger"));
    }

    #[test]
    fn test_finish_advances_fifo() {
        let mut queue = NarrationQueue::new(2);
        let first = match queue.submit(normal("one")) {
            QueueDecision::Start(u) => u,
            other => panic!("Expected Start, got {:?}", other),
        };
        queue.submit(normal("two"));
        queue.submit(normal("three"));

        let (done, next) = queue.finish(first.generation).unwrap();
        assert_eq!(done.text, "one");
        let next = next.unwrap();
        assert_eq!(next.text, "two");

        let (_, next) = queue.finish(next.generation).unwrap();
        let next = next.unwrap();
        assert_eq!(next.text, "three");

        let (_, next) = queue.finish(next.generation).unwrap();
        assert!(next.is_none());
        assert!(!queue.is_speaking());
    }

    #[test]
    fn test_stale_finish_ignored() {
        let mut queue = NarrationQueue::new(2);
        let first = match queue.submit(normal("one")) {
            QueueDecision::Start(u) => u,
            other => panic!("Expected Start, got {:?}", other),
        };
        queue.submit(high("danger"));
        assert!(queue.finish(first.generation).is_none());
        assert_eq!(queue.current_text(), Some("danger"));
    }

    #[test]
    fn test_clear_returns_everything() {
        let mut queue = NarrationQueue::new(2);
        queue.submit(normal("one"));
        queue.submit(normal("two"));
        let (interrupted, pending) = queue.clear();
        assert_eq!(interrupted.unwrap().text, "one");
        assert_eq!(pending.len(), 1);
        assert!(!queue.is_speaking());
    }

    #[test]
    fn test_entry_callback_fires_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let entry = normal("hello").with_callback(move |outcome| {
            assert_eq!(outcome, UtteranceOutcome::Spoken);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        entry.complete(UtteranceOutcome::Spoken);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
