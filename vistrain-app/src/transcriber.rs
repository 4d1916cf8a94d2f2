use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use tracing::debug;
use vistrain_input::{
    match_transcript, ResponseContext, TranscriptionService, VoiceError, VoiceSink, VoiceStatus,
};

/// Treats each line typed on stdin as a finished utterance. Stands in for a
/// speech recogniser so the voice path can be driven from a terminal.
pub struct StdinTranscriber {
    context: Arc<RwLock<ResponseContext>>,
    running: Arc<AtomicBool>,
    spawned: bool,
}

impl StdinTranscriber {
    pub fn new() -> Self {
        Self {
            context: Arc::new(RwLock::new(ResponseContext::Tilt)),
            running: Arc::new(AtomicBool::new(false)),
            spawned: false,
        }
    }

    /// Vocabulary used for lines read from now on.
    pub fn set_context(&self, context: ResponseContext) {
        if let Ok(mut current) = self.context.write() {
            *current = context;
        }
    }
}

fn recognise(line: &str, context: &RwLock<ResponseContext>, sink: &VoiceSink) {
    let Ok(context) = context.read().map(|c| *c) else {
        sink.on_status_change(VoiceStatus::Error, Some("context lock poisoned".into()));
        return;
    };
    sink.on_speech_change(true);
    sink.on_result(match_transcript(line, context), line.trim());
    sink.on_speech_change(false);
}

impl TranscriptionService for StdinTranscriber {
    fn start(&mut self, context: ResponseContext, sink: VoiceSink) -> Result<(), VoiceError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(VoiceError::AlreadyRunning);
        }
        self.set_context(context);
        if self.spawned {
            // The reader thread outlives stop(); it resumes forwarding.
            sink.on_status_change(VoiceStatus::Listening, None);
            return Ok(());
        }

        sink.on_status_change(VoiceStatus::Loading, None);
        let shared = Arc::clone(&self.context);
        let running = Arc::clone(&self.running);
        thread::Builder::new()
            .name("stdin-transcriber".into())
            .spawn(move || {
                sink.on_status_change(VoiceStatus::Listening, None);
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) if running.load(Ordering::SeqCst) => {
                            recognise(&line, &shared, &sink)
                        }
                        Ok(_) => continue,
                        Err(e) => {
                            sink.on_status_change(VoiceStatus::Error, Some(e.to_string()));
                            return;
                        }
                    }
                }
                debug!("stdin closed");
                sink.on_status_change(VoiceStatus::Idle, None);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                VoiceError::Unavailable(e.to_string())
            })?;
        self.spawned = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Default for StdinTranscriber {
    fn default() -> Self {
        Self::new()
    }
}
