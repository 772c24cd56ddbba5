use thiserror::Error;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::practice::recording_state::{RecordingEvent, RecordingState, TransitionError};
use crate::scoring::domain::accuracy_grade::{AccuracyGrade, GradeThresholds};
use crate::scoring::domain::word_accuracy_scorer::{Alignment, WordAccuracyScorer};

#[derive(Error, Debug)]
pub enum PracticeError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("no recorded audio to process")]
    NoRecording,
    #[error("speech recognition failed: {0}")]
    Recognition(String),
}

/// Outcome of one graded attempt.
#[derive(Debug, Clone)]
pub struct AttemptResult {
    pub expected: String,
    pub transcript: String,
    pub score: f64,
    pub grade: AccuracyGrade,
    pub alignment: Alignment,
}

impl AttemptResult {
    pub fn feedback(&self) -> String {
        self.grade.feedback(self.score, &self.expected)
    }
}

/// Drives a single learner through record → transcribe → score attempts.
///
/// Audio capture itself happens outside the session; the caller reports
/// when it starts and hands over the captured segment when it ends.
pub struct PracticeSession {
    recognizer: Box<dyn SpeechRecognizer>,
    scorer: WordAccuracyScorer,
    thresholds: GradeThresholds,
    state: RecordingState,
    captured: Option<AudioSegment>,
    last_result: Option<AttemptResult>,
}

impl PracticeSession {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        scorer: WordAccuracyScorer,
        thresholds: GradeThresholds,
    ) -> Self {
        Self {
            recognizer,
            scorer,
            thresholds,
            state: RecordingState::Stopped,
            captured: None,
            last_result: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn last_result(&self) -> Option<&AttemptResult> {
        self.last_result.as_ref()
    }

    pub fn start_recording(&mut self) -> Result<(), PracticeError> {
        self.apply(RecordingEvent::Start)?;
        self.captured = None;
        Ok(())
    }

    pub fn finish_recording(&mut self, audio: AudioSegment) -> Result<(), PracticeError> {
        self.apply(RecordingEvent::CaptureFinished)?;
        log::debug!("Captured {:.2}s of audio", audio.duration());
        self.captured = Some(audio);
        Ok(())
    }

    /// Transcribes the captured audio and grades it against `expected`.
    ///
    /// A recognizer failure aborts the attempt and returns the session to
    /// `Stopped`.
    pub fn process(&mut self, expected: &str) -> Result<&AttemptResult, PracticeError> {
        if self.state != RecordingState::Processing {
            return Err(TransitionError {
                state: self.state,
                event: RecordingEvent::TranscriptionFinished,
            }
            .into());
        }
        let audio = match self.captured.take() {
            Some(audio) => audio,
            None => {
                self.reset();
                return Err(PracticeError::NoRecording);
            }
        };

        let transcript = match self.recognizer.transcribe(&audio) {
            Ok(text) => text,
            Err(e) => {
                self.reset();
                return Err(PracticeError::Recognition(e.to_string()));
            }
        };

        let alignment = self.scorer.align_text(&transcript, expected);
        let score = alignment.score();
        let grade = AccuracyGrade::classify(score, &self.thresholds);
        log::info!("Recognized '{transcript}' for '{expected}': {score:.2}% ({grade})");

        self.apply(RecordingEvent::TranscriptionFinished)?;
        Ok(self.last_result.insert(AttemptResult {
            expected: expected.to_string(),
            transcript,
            score,
            grade,
            alignment,
        }))
    }

    /// Convenience for callers that already hold the whole recording.
    pub fn attempt(
        &mut self,
        audio: AudioSegment,
        expected: &str,
    ) -> Result<&AttemptResult, PracticeError> {
        self.start_recording()?;
        self.finish_recording(audio)?;
        self.process(expected)
    }

    pub fn reset(&mut self) {
        self.state = RecordingState::Stopped;
        self.captured = None;
    }

    fn apply(&mut self, event: RecordingEvent) -> Result<(), TransitionError> {
        let next = self.state.transition(event)?;
        log::debug!("Recording state: {} -> {next}", self.state);
        self.state = next;
        Ok(())
    }
}
