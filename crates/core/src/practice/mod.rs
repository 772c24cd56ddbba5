pub mod practice_session;
pub mod recording_state;
