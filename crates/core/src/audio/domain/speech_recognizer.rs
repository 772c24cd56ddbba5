use super::audio_segment::AudioSegment;

/// Domain interface for speech-to-text transcription.
///
/// Implementations turn recorded audio into plain text. Silence or an
/// unintelligible recording yields an empty string rather than an error;
/// errors are reserved for engine failures.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, audio: &AudioSegment) -> Result<String, Box<dyn std::error::Error>>;
}
