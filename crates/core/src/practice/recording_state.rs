use thiserror::Error;

/// Where a practice attempt is in the record → transcribe → score cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Stopped,
    Recording,
    Processing,
}

/// Externally triggered inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingEvent {
    /// The user asked to record an attempt.
    Start,
    /// Audio capture ended (normally or not).
    CaptureFinished,
    /// Transcription and scoring completed.
    TranscriptionFinished,
    /// Abort whatever is in progress.
    Reset,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot apply {event:?} while {state}")]
pub struct TransitionError {
    pub state: RecordingState,
    pub event: RecordingEvent,
}

impl RecordingState {
    /// Total transition function: every (state, event) pair either yields
    /// the next state or a [`TransitionError`].
    pub fn transition(self, event: RecordingEvent) -> Result<RecordingState, TransitionError> {
        use RecordingEvent::*;
        use RecordingState::*;

        match (self, event) {
            (_, Reset) => Ok(Stopped),
            (Stopped, Start) => Ok(Recording),
            (Recording, CaptureFinished) => Ok(Processing),
            (Processing, TranscriptionFinished) => Ok(Stopped),
            (state, event) => Err(TransitionError { state, event }),
        }
    }
}

impl std::fmt::Display for RecordingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingState::Stopped => write!(f, "stopped"),
            RecordingState::Recording => write!(f, "recording"),
            RecordingState::Processing => write!(f, "processing"),
        }
    }
}
