mod peer_connection;
mod webrtc_connection;

pub use peer_connection::*;
pub use webrtc_connection::*;
