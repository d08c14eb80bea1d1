mod candidate_buffer;

pub use candidate_buffer::*;
