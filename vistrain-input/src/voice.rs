use crate::adapter::{InputSource, ResponseSender};
use crate::error::VoiceError;
use crate::hotkeys::ResponseContext;
use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};
use vistrain_core::Answer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Listening,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    Result {
        answer: Option<Answer>,
        raw: String,
    },
    Status {
        status: VoiceStatus,
        message: Option<String>,
    },
    Speech(bool),
}

/// Callback surface handed to a transcription service. Each method may be
/// called from any thread.
#[derive(Debug, Clone)]
pub struct VoiceSink {
    tx: Sender<VoiceEvent>,
}

impl VoiceSink {
    pub fn on_result(&self, answer: Option<Answer>, raw: impl Into<String>) {
        let _ = self.tx.send(VoiceEvent::Result {
            answer,
            raw: raw.into(),
        });
    }

    pub fn on_status_change(&self, status: VoiceStatus, message: Option<String>) {
        let _ = self.tx.send(VoiceEvent::Status { status, message });
    }

    pub fn on_speech_change(&self, speaking: bool) {
        let _ = self.tx.send(VoiceEvent::Speech(speaking));
    }
}

/// External speech-to-intent service. Implementations map audio to an
/// answer for `context` and report through the sink.
pub trait TranscriptionService {
    fn start(&mut self, context: ResponseContext, sink: VoiceSink) -> Result<(), VoiceError>;
    fn stop(&mut self);
}

/// Receives service callbacks on the interaction loop and forwards
/// recognised answers into the response inbox.
///
/// An `Error` status disables forwarding for the rest of the session;
/// pointer and keyboard input are unaffected.
#[derive(Debug)]
pub struct VoiceChannel {
    tx: Sender<VoiceEvent>,
    rx: Receiver<VoiceEvent>,
    status: VoiceStatus,
    speaking: bool,
    disabled: bool,
    last_transcript: Option<String>,
}

impl VoiceChannel {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            status: VoiceStatus::Idle,
            speaking: false,
            disabled: false,
            last_transcript: None,
        }
    }

    pub fn sink(&self) -> VoiceSink {
        VoiceSink {
            tx: self.tx.clone(),
        }
    }

    pub fn start<S: TranscriptionService + ?Sized>(
        &mut self,
        service: &mut S,
        context: ResponseContext,
    ) -> Result<(), VoiceError> {
        if let Err(e) = service.start(context, self.sink()) {
            warn!(error = %e, "voice input unavailable; continuing without it");
            self.disable();
            return Err(e);
        }
        info!(?context, "voice input started");
        Ok(())
    }

    pub fn stop<S: TranscriptionService + ?Sized>(&mut self, service: &mut S) {
        service.stop();
        self.status = VoiceStatus::Idle;
        self.speaking = false;
    }

    /// Drain pending callbacks. Returns how many answers were forwarded.
    pub fn pump(&mut self, responder: &ResponseSender) -> usize {
        let mut forwarded = 0;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                VoiceEvent::Result { answer, raw } => {
                    debug!(transcript = %raw, ?answer, "voice result");
                    self.last_transcript = Some(raw);
                    if self.disabled {
                        continue;
                    }
                    if let Some(answer) = answer {
                        if responder.submit(InputSource::Voice, answer) {
                            forwarded += 1;
                        }
                    }
                }
                VoiceEvent::Status { status, message } => {
                    self.status = status;
                    if status == VoiceStatus::Error {
                        warn!(message = message.as_deref().unwrap_or(""), "transcription service failed");
                        self.disable();
                    } else {
                        debug!(?status, "voice status");
                    }
                }
                VoiceEvent::Speech(speaking) => self.speaking = speaking,
            }
        }
        forwarded
    }

    fn disable(&mut self) {
        self.disabled = true;
        self.status = VoiceStatus::Error;
        self.speaking = false;
    }

    pub fn is_available(&self) -> bool {
        !self.disabled
    }

    pub fn status(&self) -> VoiceStatus {
        self.status
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn last_transcript(&self) -> Option<&str> {
        self.last_transcript.as_deref()
    }
}

impl Default for VoiceChannel {
    fn default() -> Self {
        Self::new()
    }
}
