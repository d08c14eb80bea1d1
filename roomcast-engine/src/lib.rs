mod candidate;
mod config;
mod error;
mod media;
mod negotiation;
mod orchestrator;
mod relay;
mod signaling;
mod transport;

pub use candidate::*;
pub use config::EngineConfig;
pub use error::EngineError;
pub use media::*;
pub use negotiation::*;
pub use orchestrator::*;
pub use relay::*;
pub use signaling::*;
pub use transport::*;
