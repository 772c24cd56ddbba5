use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::shared::constants::{WHISPER_MAX_THREADS, WHISPER_SAMPLE_RATE};

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded once at construction and shared by every call, so a
/// single recognizer can serve several evaluation workers.
pub struct WhisperRecognizer {
    model_path: PathBuf,
    context: WhisperContext,
    language: String,
    threads: usize,
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        let context = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;
        log::info!("Loaded Whisper model from {}", model_path.display());

        Ok(Self {
            model_path: model_path.to_path_buf(),
            context,
            language: "en".to_string(),
            threads: threads_per_worker(1),
        })
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Inference threads used by each `transcribe` call.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

impl std::fmt::Debug for WhisperRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperRecognizer")
            .field("model_path", &self.model_path)
            .field("language", &self.language)
            .field("threads", &self.threads)
            .finish()
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, audio: &AudioSegment) -> Result<String, Box<dyn std::error::Error>> {
        if audio.sample_rate() != WHISPER_SAMPLE_RATE || audio.channels() != 1 {
            return Err(format!(
                "Whisper expects {WHISPER_SAMPLE_RATE} Hz mono audio, got {} Hz with {} channels",
                audio.sample_rate(),
                audio.channels()
            )
            .into());
        }
        if audio.is_empty() {
            return Ok(String::new());
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));
        params.set_translate(false);
        params.set_no_context(true);
        params.set_single_segment(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(self.threads as i32);

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut pieces = Vec::new();
        for seg_idx in 0..state.full_n_segments() {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };
            let text = match segment.to_str() {
                Ok(t) => t.trim(),
                Err(_) => continue,
            };
            // Non-speech markers such as "[BLANK_AUDIO]" or "(music)".
            if text.is_empty() || text.starts_with('[') || text.starts_with('(') {
                continue;
            }
            pieces.push(text.to_string());
        }

        let transcript = pieces.join(" ");
        log::debug!("Whisper transcript: '{transcript}'");
        Ok(transcript)
    }
}

/// Thread budget for one of `workers` concurrent recognizers, so that
/// together they do not oversubscribe the machine.
pub fn threads_per_worker(workers: usize) -> usize {
    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    split_threads(cpus, workers)
}

fn split_threads(cpus: usize, workers: usize) -> usize {
    (cpus / workers.max(1)).clamp(1, WHISPER_MAX_THREADS)
}
