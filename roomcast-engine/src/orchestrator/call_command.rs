/// Commands queued to the call loop. Leaving is signalled separately so it can
/// interrupt a step in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCommand {
    MuteAudio(bool),
    MuteVideo(bool),
    Retry,
}
