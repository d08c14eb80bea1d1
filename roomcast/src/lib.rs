pub use roomcast_core::{Envelope, PeerId, RoomId};

pub mod model {
    pub use roomcast_core::model::*;
    pub use roomcast_core::utils::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use roomcast_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use roomcast_engine::*;
}
