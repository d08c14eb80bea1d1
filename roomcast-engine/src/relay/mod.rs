mod relay_link;
mod ws_relay;

pub use relay_link::*;
pub use ws_relay::*;
