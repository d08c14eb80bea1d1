use crate::transport::CandidateSink;
use roomcast_core::IceCandidate;
use std::collections::VecDeque;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferState {
    /// No remote description yet: candidates are held back.
    Buffering,
    /// Flushed once; candidates go straight to the connection.
    Flushed,
}

/// Holds remote ICE candidates that arrive before the remote description.
#[derive(Debug)]
pub struct CandidateBuffer {
    pending: VecDeque<IceCandidate>,
    state: BufferState,
}

impl Default for CandidateBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            state: BufferState::Buffering,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_flushed(&self) -> bool {
        self.state == BufferState::Flushed
    }

    /// Stores `candidate` until the flush, or applies it right away once flushed.
    pub async fn enqueue<S>(&mut self, sink: &S, candidate: IceCandidate)
    where
        S: CandidateSink + ?Sized,
    {
        match self.state {
            BufferState::Buffering => {
                debug!("Buffering remote candidate ({} pending)", self.pending.len() + 1);
                self.pending.push_back(candidate);
            }
            BufferState::Flushed => apply(sink, candidate).await,
        }
    }

    /// Applies every buffered candidate in arrival order and retires the buffer.
    ///
    /// Returns the number of candidates applied; a second flush applies nothing.
    pub async fn flush<S>(&mut self, sink: &S) -> usize
    where
        S: CandidateSink + ?Sized,
    {
        if self.state == BufferState::Flushed {
            return 0;
        }
        self.state = BufferState::Flushed;

        let count = self.pending.len();
        while let Some(candidate) = self.pending.pop_front() {
            apply(sink, candidate).await;
        }
        if count > 0 {
            debug!("Flushed {} buffered candidates", count);
        }
        count
    }

    pub fn discard(&mut self) {
        if !self.pending.is_empty() {
            debug!("Discarding {} buffered candidates", self.pending.len());
        }
        self.pending.clear();
    }
}

async fn apply<S>(sink: &S, candidate: IceCandidate)
where
    S: CandidateSink + ?Sized,
{
    let text = candidate.candidate.clone();
    if let Err(e) = sink.add_ice_candidate(candidate).await {
        warn!("Remote candidate rejected ({}): {:#}", text, e);
    }
}
