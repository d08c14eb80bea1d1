use async_trait::async_trait;
use roomcast_core::{IceCandidate, PeerId, SessionDescription};
use roomcast_engine::SignalingOutput;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Offer(PeerId, SessionDescription),
    Answer(PeerId, SessionDescription),
    Candidate(PeerId, IceCandidate),
}

#[derive(Default)]
pub struct MockSignalingOutput {
    sent: Mutex<Vec<Sent>>,
}

impl MockSignalingOutput {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn offers(&self) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Offer(..)))
            .count()
    }

    pub fn answers(&self) -> Vec<(PeerId, SessionDescription)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Answer(to, answer) => Some((to, answer)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send_offer(&self, to: &PeerId, offer: SessionDescription) {
        self.sent.lock().unwrap().push(Sent::Offer(to.clone(), offer));
    }

    async fn send_answer(&self, to: &PeerId, answer: SessionDescription) {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Answer(to.clone(), answer));
    }

    async fn send_candidate(&self, to: &PeerId, candidate: IceCandidate) {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Candidate(to.clone(), candidate));
    }
}
