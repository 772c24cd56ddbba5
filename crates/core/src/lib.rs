//! Pronunciation scoring.
//!
//! The heart of the crate is [`scoring`]: text normalization, word
//! similarity and the greedy word-accuracy scorer. Around it sit the speech
//! recognition and audio decoding adapters ([`audio`]), the record →
//! transcribe → score session ([`practice`]) and the offline dataset
//! evaluator ([`evaluation`]).

pub mod audio;
pub mod evaluation;
pub mod practice;
pub mod scoring;
pub mod shared;

pub use scoring::domain::normalizer::{normalize, NormalizationMode};
pub use scoring::domain::word_accuracy_scorer::score_word_accuracy;
