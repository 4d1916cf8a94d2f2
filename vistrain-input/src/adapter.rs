use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::debug;
use vistrain_core::{Answer, AnswerSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Pointer,
    Keyboard,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub source: InputSource,
    pub answer: Answer,
}

/// Producer handle for the adapter inbox. Cheap to clone and safe to move
/// onto the thread that delivers voice results.
#[derive(Debug, Clone)]
pub struct ResponseSender {
    tx: Sender<Candidate>,
}

impl ResponseSender {
    /// Returns false once the adapter has been dropped.
    pub fn submit(&self, source: InputSource, answer: Answer) -> bool {
        self.tx.send(Candidate { source, answer }).is_ok()
    }
}

/// Single consumer of all response channels.
#[derive(Debug)]
pub struct ResponseAdapter {
    tx: Sender<Candidate>,
    rx: Receiver<Candidate>,
    armed: Option<AnswerSet>,
    accepted: u64,
    discarded: u64,
}

impl ResponseAdapter {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            armed: None,
            accepted: 0,
            discarded: 0,
        }
    }

    pub fn sender(&self) -> ResponseSender {
        ResponseSender {
            tx: self.tx.clone(),
        }
    }

    /// Open a response window for `valid`. Anything already queued belongs
    /// to an earlier window and is dropped.
    pub fn arm(&mut self, valid: AnswerSet) {
        let stale = self.discard_pending();
        if stale > 0 {
            debug!(stale, "dropped candidates queued before arming");
        }
        self.armed = Some(valid);
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_set(&self) -> Option<&AnswerSet> {
        self.armed.as_ref()
    }

    /// Drain the inbox in arrival order. The first candidate inside the armed
    /// set is accepted and disarms the adapter; the rest are discarded.
    pub fn poll(&mut self) -> Option<Candidate> {
        while let Ok(candidate) = self.rx.try_recv() {
            let Some(valid) = &self.armed else {
                self.discarded += 1;
                debug!(?candidate, "dropped candidate while disarmed");
                continue;
            };
            if !valid.contains(&candidate.answer) {
                self.discarded += 1;
                debug!(?candidate, "dropped candidate outside armed set");
                continue;
            }
            self.armed = None;
            self.accepted += 1;
            let late = self.discard_pending();
            if late > 0 {
                debug!(late, "dropped candidates racing an accepted answer");
            }
            return Some(candidate);
        }
        None
    }

    /// Disarm and empty the inbox.
    pub fn reset(&mut self) {
        self.armed = None;
        self.discard_pending();
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }

    pub fn discarded_count(&self) -> u64 {
        self.discarded
    }

    fn discard_pending(&mut self) -> usize {
        let n = self.rx.try_iter().count();
        self.discarded += n as u64;
        n
    }
}

impl Default for ResponseAdapter {
    fn default() -> Self {
        Self::new()
    }
}
