mod local_media;
mod sample_track;

pub use local_media::*;
pub use sample_track::*;
