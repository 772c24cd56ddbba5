use super::normalizer::{normalize, NormalizationMode};
use super::word_similarity::similarity;

/// Alignment decision for one transcribed word.
#[derive(Clone, Debug, PartialEq)]
pub struct WordMatch {
    pub transcribed: String,
    /// Index into the expected sequence, or `None` when nothing was matched.
    pub expected_index: Option<usize>,
    /// Similarity credited to the score; 0 when unmatched.
    pub similarity: f64,
}

/// Result of greedily aligning a transcription against a reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Alignment {
    matches: Vec<WordMatch>,
    transcribed_len: usize,
    expected_len: usize,
}

impl Alignment {
    /// One entry per transcribed word, in transcription order.
    pub fn matches(&self) -> &[WordMatch] {
        &self.matches
    }

    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Expected word indices that no transcribed word claimed.
    pub fn missed_expected(&self) -> Vec<usize> {
        let mut claimed = vec![false; self.expected_len];
        for i in self.matches.iter().filter_map(|m| m.expected_index) {
            claimed[i] = true;
        }
        (0..self.expected_len).filter(|i| !claimed[*i]).collect()
    }

    /// Percentage in `[0, 100]`.
    ///
    /// An empty reference scores 100 only against an empty transcription.
    pub fn score(&self) -> f64 {
        if self.expected_len == 0 {
            return if self.transcribed_len == 0 { 100.0 } else { 0.0 };
        }
        if self.transcribed_len == 0 {
            return 0.0;
        }
        let total: f64 = self.matches.iter().map(|m| m.similarity).sum();
        (total / self.expected_len as f64) * 100.0
    }
}

/// Scores a transcription against a reference by greedy one-to-one word
/// alignment on edit-distance similarity.
///
/// Each transcribed word, in order, claims the still-unclaimed expected word
/// it is most similar to (earliest index on ties), provided the similarity
/// is strictly positive. Unclaimed expected words contribute nothing, and
/// extra transcribed words are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordAccuracyScorer {
    mode: NormalizationMode,
}

impl WordAccuracyScorer {
    pub fn new(mode: NormalizationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }

    /// Normalizes both texts, then scores them.
    pub fn score_text(&self, transcribed: &str, expected: &str) -> f64 {
        self.align_text(transcribed, expected).score()
    }

    pub fn align_text(&self, transcribed: &str, expected: &str) -> Alignment {
        let transcribed_words = normalize(transcribed, self.mode);
        let expected_words = normalize(expected, self.mode);
        align(&transcribed_words, &expected_words)
    }
}

/// Scores already-normalized word sequences.
pub fn score(transcribed: &[String], expected: &[String]) -> f64 {
    align(transcribed, expected).score()
}

/// Greedily aligns `transcribed` against `expected`.
pub fn align(transcribed: &[String], expected: &[String]) -> Alignment {
    let mut matched = vec![false; expected.len()];
    let mut matches = Vec::with_capacity(transcribed.len());

    for word in transcribed {
        let mut best_similarity = 0.0;
        let mut best_index = None;

        for (i, candidate) in expected.iter().enumerate() {
            if matched[i] {
                continue;
            }
            let s = similarity(word, candidate);
            if s > best_similarity {
                best_similarity = s;
                best_index = Some(i);
            }
        }

        let entry = match best_index {
            Some(i) => {
                matched[i] = true;
                WordMatch {
                    transcribed: word.clone(),
                    expected_index: Some(i),
                    similarity: best_similarity,
                }
            }
            None => WordMatch {
                transcribed: word.clone(),
                expected_index: None,
                similarity: 0.0,
            },
        };
        matches.push(entry);
    }

    Alignment {
        matches,
        transcribed_len: transcribed.len(),
        expected_len: expected.len(),
    }
}

/// Scores `transcribed` against `expected` after basic normalization.
pub fn score_word_accuracy(transcribed: &str, expected: &str) -> f64 {
    WordAccuracyScorer::new(NormalizationMode::Basic).score_text(transcribed, expected)
}
