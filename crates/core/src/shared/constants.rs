/// Minimum score (percent) for an attempt to count as correct.
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 70.0;
/// Minimum score (percent) for an attempt to count as perfect.
pub const DEFAULT_PERFECT_THRESHOLD: f64 = 99.99;

pub const WHISPER_MODEL_NAME: &str = "ggml-tiny.en.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin";
pub const WHISPER_SAMPLE_RATE: u32 = 16000;
/// Inference threads per transcription; whisper.cpp gains little beyond this.
pub const WHISPER_MAX_THREADS: usize = 4;

pub const DEFAULT_DATASET_PATH: &str = "LJSpeech-1.1";
pub const DATASET_METADATA_FILE: &str = "metadata.csv";
pub const DATASET_AUDIO_DIR: &str = "wavs";
pub const DATASET_AUDIO_EXTENSION: &str = "wav";
/// Number of dataset entries scored when no limit is given.
pub const DEFAULT_EVALUATION_LIMIT: usize = 50;
