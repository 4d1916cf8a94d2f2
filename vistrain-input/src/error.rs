use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("transcription service unavailable: {0}")]
    Unavailable(String),
    #[error("transcription service already running")]
    AlreadyRunning,
}
