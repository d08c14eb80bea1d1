pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Room capacity: the relay only ever pairs two peers.
pub const ROOM_CAPACITY: usize = 2;
