mod config;
mod error;
mod room;
mod signaling;
mod transport;

pub use config::RelayConfig;
pub use error::RelayError;
pub use room::*;
pub use signaling::*;
pub use transport::*;
