use super::audio_segment::AudioSegment;
use std::path::Path;

/// Domain interface for decoding a recorded attempt from an audio file.
pub trait AudioReader: Send + Sync {
    /// Decode the file to a mono PCM AudioSegment at the given sample rate.
    /// Returns None if the file has no audio stream.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;
}
