use vistrain_core::{AnswerSet, Direction, Letter};
use vistrain_input::{
    match_transcript, InputSource, ResponseAdapter, ResponseContext, TranscriptionService,
    VoiceChannel, VoiceError, VoiceSink, VoiceStatus,
};

/// Service that hands its sink back to the test so callbacks can be
/// scripted.
#[derive(Default)]
struct ScriptedService {
    sink: Option<VoiceSink>,
    fail_start: bool,
    stopped: bool,
}

impl ScriptedService {
    fn say(&self, transcript: &str, context: ResponseContext) {
        let sink = self.sink.as_ref().unwrap();
        sink.on_speech_change(true);
        sink.on_result(match_transcript(transcript, context), transcript);
        sink.on_speech_change(false);
    }
}

impl TranscriptionService for ScriptedService {
    fn start(&mut self, _context: ResponseContext, sink: VoiceSink) -> Result<(), VoiceError> {
        if self.fail_start {
            return Err(VoiceError::Unavailable("no microphone".into()));
        }
        sink.on_status_change(VoiceStatus::Listening, None);
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[test]
fn tap_then_voice_yields_one_answer() {
    let mut adapter = ResponseAdapter::new();
    let mut voice = VoiceChannel::new();
    let mut service = ScriptedService::default();
    voice.start(&mut service, ResponseContext::ChartDirections).unwrap();

    adapter.arm(AnswerSet::directions());
    adapter
        .sender()
        .submit(InputSource::Pointer, Direction::Up.into());
    service.say("down", ResponseContext::ChartDirections);
    assert_eq!(voice.pump(&adapter.sender()), 1);

    let accepted = adapter.poll().unwrap();
    assert_eq!(accepted.source, InputSource::Pointer);
    assert_eq!(accepted.answer, Direction::Up.into());
    assert_eq!(adapter.poll(), None);
    assert!(!voice.is_speaking());
    assert_eq!(voice.last_transcript(), Some("down"));
}

#[test]
fn voice_answer_accepted_when_first() {
    let mut adapter = ResponseAdapter::new();
    let mut voice = VoiceChannel::new();
    let mut service = ScriptedService::default();
    voice.start(&mut service, ResponseContext::ChartLetters).unwrap();

    let k = Letter::new('K').unwrap();
    let choices = [k, Letter::new('X').unwrap(), Letter::new('R').unwrap(), Letter::new('V').unwrap()];
    adapter.arm(AnswerSet::letters(&choices));
    service.say("kay", ResponseContext::ChartLetters);
    voice.pump(&adapter.sender());
    adapter
        .sender()
        .submit(InputSource::Keyboard, choices[1].into());

    let accepted = adapter.poll().unwrap();
    assert_eq!(accepted.source, InputSource::Voice);
    assert_eq!(accepted.answer, k.into());
    assert_eq!(voice.status(), VoiceStatus::Listening);
}

#[test]
fn service_error_disables_voice_only() {
    let mut adapter = ResponseAdapter::new();
    let mut voice = VoiceChannel::new();
    let mut service = ScriptedService::default();
    voice.start(&mut service, ResponseContext::Tilt).unwrap();

    service
        .sink
        .as_ref()
        .unwrap()
        .on_status_change(VoiceStatus::Error, Some("worker crashed".into()));
    service.say("left", ResponseContext::Tilt);
    adapter.arm(AnswerSet::tilt());
    assert_eq!(voice.pump(&adapter.sender()), 0);
    assert!(!voice.is_available());

    adapter
        .sender()
        .submit(InputSource::Keyboard, Direction::Right.into());
    assert_eq!(
        adapter.poll().map(|c| c.source),
        Some(InputSource::Keyboard)
    );

    voice.stop(&mut service);
    assert!(service.stopped);
}

#[test]
fn failed_start_leaves_voice_disabled() {
    let mut voice = VoiceChannel::new();
    let mut service = ScriptedService {
        fail_start: true,
        ..Default::default()
    };
    assert!(voice.start(&mut service, ResponseContext::Tilt).is_err());
    assert!(!voice.is_available());
    assert_eq!(voice.status(), VoiceStatus::Error);
}
