use std::time::Instant;

use crate::content::sets::{DICTATION_PAUSE, DICTATION_RATE};
use crate::speech::engine::{SpeechEngine, SpeechSeq};
use crate::speech::voice::select_voice;

/// Handle for one logical speech request (a word, or a number+word dictation
/// pair). Completion is reported at most once per token; a token from a
/// cancelled request never completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpeechToken(u64);

#[cfg(test)]
impl SpeechToken {
    pub(crate) fn test_token(id: u64) -> Self {
        SpeechToken(id)
    }
}

enum Active {
    Idle,
    /// Single word (practice dictation or summary replay).
    Word { token: SpeechToken, seq: SpeechSeq },
    /// Competition dictation, phase 1: the question number.
    Number {
        token: SpeechToken,
        seq: SpeechSeq,
        word: String,
    },
    /// Competition dictation, phase 2: fixed gap before the word.
    Pause {
        token: SpeechToken,
        word: String,
        until: Instant,
    },
    /// Competition dictation, phase 3: the target word.
    DictatedWord { token: SpeechToken, seq: SpeechSeq },
}

/// Sole owner of the speech engine. Serializes all spoken output: at most
/// one utterance is live in the engine, new requests displace the old one
/// (which then never completes), and the number -> pause -> word dictation
/// protocol is explicit state, not chained callbacks.
pub struct SpeechDispatcher {
    engine: Box<dyn SpeechEngine>,
    active: Active,
    /// Completion that could not be delivered from within a speak call
    /// (speak failures complete immediately); drained on the next tick.
    pending_done: Option<SpeechToken>,
    next_token: u64,
    next_seq: u64,
}

impl SpeechDispatcher {
    pub fn new(mut engine: Box<dyn SpeechEngine>) -> Self {
        let voices = engine.voices();
        match select_voice(&voices) {
            Some(voice) => {
                tracing::info!(voice = %voice.name, language = %voice.language, "voice selected");
                if let Err(e) = engine.set_voice(voice) {
                    tracing::warn!(error = %e, "setting voice failed, using engine default");
                }
            }
            None => tracing::warn!("no voices reported, using engine default"),
        }

        Self {
            engine,
            active: Active::Idle,
            pending_done: None,
            next_token: 0,
            next_seq: 0,
        }
    }

    fn token(&mut self) -> SpeechToken {
        self.next_token += 1;
        SpeechToken(self.next_token)
    }

    fn seq(&mut self) -> SpeechSeq {
        self.next_seq += 1;
        SpeechSeq(self.next_seq)
    }

    /// First half of the double-cancel discipline; the engine applies the
    /// second cancel as part of issuing the new utterance.
    fn clear_channel(&mut self) {
        if self.engine.is_speaking() {
            self.engine.cancel();
        }
        self.active = Active::Idle;
        self.pending_done = None;
    }

    /// Speak a single word. Used by practice dictation (at the configured
    /// rate) and by the summary view's replay (at the competition rate).
    pub fn speak_word(&mut self, text: &str, rate: f64) -> SpeechToken {
        self.clear_channel();

        let token = self.token();
        let seq = self.seq();
        match self.engine.speak(text, rate, seq) {
            Ok(()) => self.active = Active::Word { token, seq },
            Err(e) => {
                // Best-effort audio: a rejected utterance counts as spoken.
                tracing::warn!(error = %e, "utterance rejected, continuing silently");
                self.pending_done = Some(token);
            }
        }
        token
    }

    /// Competition dictation: the question number at normal rate, a fixed
    /// pause, then the word slightly slowed. Completion fires once, after
    /// the word finishes or errors; a failed number skips the word.
    pub fn speak_dictation(&mut self, number: usize, word: &str) -> SpeechToken {
        self.clear_channel();

        let token = self.token();
        let seq = self.seq();
        match self.engine.speak(&number.to_string(), 1.0, seq) {
            Ok(()) => {
                self.active = Active::Number {
                    token,
                    seq,
                    word: word.to_string(),
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "number utterance rejected, skipping word");
                self.pending_done = Some(token);
            }
        }
        token
    }

    /// Engine completion for utterance `seq`. Returns the token whose whole
    /// request just finished, if any. Stale seqs are no-ops.
    pub fn on_utterance_end(&mut self, seq: SpeechSeq, now: Instant) -> Option<SpeechToken> {
        match std::mem::replace(&mut self.active, Active::Idle) {
            Active::Word { token, seq: active } if active == seq => Some(token),
            Active::Number {
                token,
                seq: active,
                word,
            } if active == seq => {
                self.active = Active::Pause {
                    token,
                    word,
                    until: now + DICTATION_PAUSE,
                };
                None
            }
            Active::DictatedWord { token, seq: active } if active == seq => Some(token),
            other => {
                // Not ours (stale completion of displaced speech): restore.
                self.active = other;
                None
            }
        }
    }

    /// Advance time-driven phases. Returns a completed token when a speak
    /// failure had to finish a request without engine help.
    pub fn tick(&mut self, now: Instant) -> Option<SpeechToken> {
        if let Some(token) = self.pending_done.take() {
            return Some(token);
        }

        let pause_over = matches!(&self.active, Active::Pause { until, .. } if now >= *until);
        if pause_over {
            let Active::Pause { token, word, .. } =
                std::mem::replace(&mut self.active, Active::Idle)
            else {
                unreachable!()
            };
            let seq = self.seq();
            match self.engine.speak(&word, DICTATION_RATE, seq) {
                Ok(()) => self.active = Active::DictatedWord { token, seq },
                Err(e) => {
                    tracing::warn!(error = %e, "word utterance rejected, completing dictation");
                    return Some(token);
                }
            }
        }

        None
    }

    /// Cancel whatever is in flight. The displaced request never completes.
    pub fn cancel(&mut self) {
        self.engine.cancel();
        self.active = Active::Idle;
        self.pending_done = None;
    }

    pub fn is_speaking(&self) -> bool {
        !matches!(self.active, Active::Idle) || self.pending_done.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::speech::engine::SpeechError;
    use crate::speech::voice::VoiceInfo;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Cancel,
        Speak { text: String, rate: f64, seq: SpeechSeq },
    }

    #[derive(Default)]
    struct Script {
        calls: Vec<Call>,
        fail_texts: Vec<String>,
        speaking: bool,
    }

    #[derive(Clone, Default)]
    struct MockEngine {
        script: Rc<RefCell<Script>>,
    }

    impl MockEngine {
        fn last_seq(&self) -> SpeechSeq {
            self.script
                .borrow()
                .calls
                .iter()
                .rev()
                .find_map(|c| match c {
                    Call::Speak { seq, .. } => Some(*seq),
                    _ => None,
                })
                .expect("no utterance issued")
        }

        fn spoken(&self) -> Vec<String> {
            self.script
                .borrow()
                .calls
                .iter()
                .filter_map(|c| match c {
                    Call::Speak { text, .. } => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl SpeechEngine for MockEngine {
        fn voices(&self) -> Vec<VoiceInfo> {
            Vec::new()
        }

        fn set_voice(&mut self, _voice: &VoiceInfo) -> Result<(), SpeechError> {
            Ok(())
        }

        fn speak(&mut self, text: &str, rate: f64, seq: SpeechSeq) -> Result<(), SpeechError> {
            let mut script = self.script.borrow_mut();
            script.calls.push(Call::Speak {
                text: text.to_string(),
                rate,
                seq,
            });
            if script.fail_texts.iter().any(|t| t == text) {
                return Err(SpeechError::Utterance("scripted failure".to_string()));
            }
            script.speaking = true;
            Ok(())
        }

        fn cancel(&mut self) {
            let mut script = self.script.borrow_mut();
            script.calls.push(Call::Cancel);
            script.speaking = false;
        }

        fn is_speaking(&self) -> bool {
            self.script.borrow().speaking
        }
    }

    fn dispatcher() -> (SpeechDispatcher, MockEngine) {
        let engine = MockEngine::default();
        (SpeechDispatcher::new(Box::new(engine.clone())), engine)
    }

    #[test]
    fn word_completes_once_on_engine_end() {
        let (mut dispatcher, engine) = dispatcher();
        let t0 = Instant::now();

        let token = dispatcher.speak_word("ship", 0.75);
        assert!(dispatcher.is_speaking());

        let seq = engine.last_seq();
        assert_eq!(dispatcher.on_utterance_end(seq, t0), Some(token));
        assert!(!dispatcher.is_speaking());
        // A duplicate end for the same seq is a no-op.
        assert_eq!(dispatcher.on_utterance_end(seq, t0), None);
    }

    #[test]
    fn dictation_speaks_number_then_pauses_then_word() {
        let (mut dispatcher, engine) = dispatcher();
        let t0 = Instant::now();

        let token = dispatcher.speak_dictation(7, "sheep");
        assert_eq!(engine.spoken(), vec!["7".to_string()]);

        let number_seq = engine.last_seq();
        assert_eq!(dispatcher.on_utterance_end(number_seq, t0), None);

        // Pause not yet elapsed: nothing spoken, nothing completed.
        assert_eq!(dispatcher.tick(t0 + Duration::from_millis(200)), None);
        assert_eq!(engine.spoken(), vec!["7".to_string()]);

        assert_eq!(dispatcher.tick(t0 + DICTATION_PAUSE), None);
        assert_eq!(engine.spoken(), vec!["7".to_string(), "sheep".to_string()]);

        let word_seq = engine.last_seq();
        assert_ne!(word_seq, number_seq);
        assert_eq!(
            dispatcher.on_utterance_end(word_seq, t0 + Duration::from_secs(1)),
            Some(token)
        );
    }

    #[test]
    fn dictated_word_uses_the_slowed_rate() {
        let (mut dispatcher, engine) = dispatcher();
        let t0 = Instant::now();

        dispatcher.speak_dictation(1, "boat");
        let number_seq = engine.last_seq();
        dispatcher.on_utterance_end(number_seq, t0);
        dispatcher.tick(t0 + DICTATION_PAUSE);

        let script = engine.script.borrow();
        let rates: Vec<f64> = script
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Speak { rate, .. } => Some(*rate),
                _ => None,
            })
            .collect();
        assert_eq!(rates, vec![1.0, DICTATION_RATE]);
    }

    #[test]
    fn failed_number_skips_word_and_completes_on_next_tick() {
        let engine = MockEngine::default();
        engine.script.borrow_mut().fail_texts.push("3".to_string());
        let mut dispatcher = SpeechDispatcher::new(Box::new(engine.clone()));

        let token = dispatcher.speak_dictation(3, "coat");
        assert_eq!(dispatcher.tick(Instant::now()), Some(token));
        // Only the number was ever attempted.
        assert_eq!(engine.spoken(), vec!["3".to_string()]);
        assert_eq!(dispatcher.tick(Instant::now()), None);
    }

    #[test]
    fn failed_word_completes_dictation_at_pause_end() {
        let engine = MockEngine::default();
        engine.script.borrow_mut().fail_texts.push("goat".to_string());
        let mut dispatcher = SpeechDispatcher::new(Box::new(engine.clone()));
        let t0 = Instant::now();

        let token = dispatcher.speak_dictation(2, "goat");
        dispatcher.on_utterance_end(engine.last_seq(), t0);
        assert_eq!(dispatcher.tick(t0 + DICTATION_PAUSE), Some(token));
    }

    #[test]
    fn new_request_displaces_old_without_completing_it() {
        let (mut dispatcher, engine) = dispatcher();
        let t0 = Instant::now();

        let first = dispatcher.speak_word("pin", 1.0);
        let first_seq = engine.last_seq();
        let second = dispatcher.speak_word("pen", 1.0);
        assert_ne!(first, second);

        // The in-progress engine utterance was cancelled before the new one.
        let calls = engine.script.borrow().calls.clone();
        assert!(matches!(calls[1], Call::Cancel));

        // The displaced token never completes, even if its end leaks in.
        assert_eq!(dispatcher.on_utterance_end(first_seq, t0), None);
        assert_eq!(
            dispatcher.on_utterance_end(engine.last_seq(), t0),
            Some(second)
        );
    }

    #[test]
    fn cancel_drops_in_flight_dictation_silently() {
        let (mut dispatcher, engine) = dispatcher();
        let t0 = Instant::now();

        dispatcher.speak_dictation(9, "moon");
        let seq = engine.last_seq();
        dispatcher.cancel();

        assert!(!dispatcher.is_speaking());
        assert_eq!(dispatcher.on_utterance_end(seq, t0), None);
        assert_eq!(dispatcher.tick(t0 + Duration::from_secs(5)), None);
    }
}
