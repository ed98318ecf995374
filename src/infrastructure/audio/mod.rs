pub mod transcoder;
pub mod wav;

pub use transcoder::{AudioTranscoder, FfmpegTranscoder};
pub use wav::{encode_wav, merge_wav};
