mod peer_outbox;

pub use peer_outbox::PeerOutbox;
