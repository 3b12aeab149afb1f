use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::speech::voice::VoiceInfo;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("utterance rejected: {0}")]
    Utterance(String),
}

/// Monotonic id of one utterance issued through an engine. Completion
/// signals carry it back so stale completions can be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpeechSeq(pub u64);

/// Invoked (possibly from an engine-owned thread) when an utterance finishes
/// speaking. The app wires this to its event channel.
pub type CompletionFn = Arc<dyn Fn(SpeechSeq) + Send + Sync>;

/// The single process-wide speech channel. Implementations report completion
/// through the `CompletionFn` they were constructed with; cancellation must
/// never report completion.
pub trait SpeechEngine {
    fn voices(&self) -> Vec<VoiceInfo>;
    fn set_voice(&mut self, voice: &VoiceInfo) -> Result<(), SpeechError>;
    /// Start speaking, replacing any utterance still in the engine. `rate`
    /// is a scale where 1.0 is the engine's normal speaking rate.
    fn speak(&mut self, text: &str, rate: f64, seq: SpeechSeq) -> Result<(), SpeechError>;
    fn cancel(&mut self);
    fn is_speaking(&self) -> bool;
}

/// Production engine over the platform speech-synthesis service.
pub struct PlatformSpeech {
    tts: tts::Tts,
    // The one utterance whose completion we still want. Cleared on cancel so
    // late engine callbacks for cancelled speech resolve to nothing.
    current: Arc<Mutex<Option<SpeechSeq>>>,
}

impl PlatformSpeech {
    pub fn new(on_complete: CompletionFn) -> Result<Self, SpeechError> {
        let mut tts = tts::Tts::default().map_err(|e| SpeechError::Unavailable(e.to_string()))?;

        let features = tts.supported_features();
        if !features.utterance_callbacks {
            return Err(SpeechError::Unavailable(
                "engine does not report utterance completion".to_string(),
            ));
        }

        let current: Arc<Mutex<Option<SpeechSeq>>> = Arc::new(Mutex::new(None));

        let cb_current = Arc::clone(&current);
        let cb_complete = on_complete;
        tts.on_utterance_end(Some(Box::new(move |_utterance| {
            // Exactly one utterance is live at a time, so the ended one is
            // whatever we last issued, if it has not been cancelled since.
            let seq = cb_current.lock().ok().and_then(|mut cur| cur.take());
            if let Some(seq) = seq {
                cb_complete(seq);
            }
        })))
        .map_err(|e| SpeechError::Unavailable(e.to_string()))?;

        // A stopped utterance is a cancellation, not a completion, but clear
        // the slot so is-it-still-ours checks cannot go stale.
        let stop_current = Arc::clone(&current);
        tts.on_utterance_stop(Some(Box::new(move |_utterance| {
            if let Ok(mut cur) = stop_current.lock() {
                cur.take();
            }
        })))
        .map_err(|e| SpeechError::Unavailable(e.to_string()))?;

        Ok(Self { tts, current })
    }

    fn scaled_rate(&self, scale: f64) -> f32 {
        let normal = self.tts.normal_rate();
        let min = self.tts.min_rate();
        let max = self.tts.max_rate();
        // The settings slider spans 0.5x..1.5x; map that linearly onto the
        // engine's own range on each side of normal, since rate units are
        // not multiplicative on every platform.
        let scale = scale.clamp(0.5, 1.5) as f32;
        let rate = if scale >= 1.0 {
            normal + (max - normal) * (scale - 1.0) * 2.0
        } else {
            normal - (normal - min) * (1.0 - scale) * 2.0
        };
        rate.clamp(min, max)
    }
}

impl SpeechEngine for PlatformSpeech {
    fn voices(&self) -> Vec<VoiceInfo> {
        match self.tts.voices() {
            Ok(voices) => voices
                .into_iter()
                .map(|v| VoiceInfo {
                    id: v.id(),
                    name: v.name(),
                    language: v.language().to_string(),
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "listing voices failed");
                Vec::new()
            }
        }
    }

    fn set_voice(&mut self, voice: &VoiceInfo) -> Result<(), SpeechError> {
        let platform_voices = self
            .tts
            .voices()
            .map_err(|e| SpeechError::Unavailable(e.to_string()))?;
        let chosen = platform_voices
            .into_iter()
            .find(|v| v.id() == voice.id)
            .ok_or_else(|| SpeechError::Unavailable(format!("voice {} vanished", voice.id)))?;
        self.tts
            .set_voice(&chosen)
            .map_err(|e| SpeechError::Unavailable(e.to_string()))
    }

    fn speak(&mut self, text: &str, rate: f64, seq: SpeechSeq) -> Result<(), SpeechError> {
        if let Err(e) = self.tts.set_rate(self.scaled_rate(rate)) {
            tracing::warn!(error = %e, "set_rate failed, speaking at current rate");
        }

        if let Ok(mut cur) = self.current.lock() {
            *cur = Some(seq);
        }

        // interrupt=true is the second cancel of the double-cancel
        // discipline: it clears a queued-but-not-started utterance that
        // would otherwise stall the engine.
        match self.tts.speak(text, true) {
            Ok(_) => Ok(()),
            Err(e) => {
                if let Ok(mut cur) = self.current.lock() {
                    cur.take();
                }
                Err(SpeechError::Utterance(e.to_string()))
            }
        }
    }

    fn cancel(&mut self) {
        if let Ok(mut cur) = self.current.lock() {
            cur.take();
        }
        if let Err(e) = self.tts.stop() {
            tracing::warn!(error = %e, "stopping speech failed");
        }
    }

    fn is_speaking(&self) -> bool {
        self.tts.is_speaking().unwrap_or(false)
    }
}

/// Fallback when the platform engine is unusable: stays silent and reports
/// every utterance complete immediately, so game flow never blocks on audio.
pub struct SilentSpeech {
    on_complete: CompletionFn,
}

impl SilentSpeech {
    pub fn new(on_complete: CompletionFn) -> Self {
        Self { on_complete }
    }
}

impl SpeechEngine for SilentSpeech {
    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn set_voice(&mut self, _voice: &VoiceInfo) -> Result<(), SpeechError> {
        Ok(())
    }

    fn speak(&mut self, _text: &str, _rate: f64, seq: SpeechSeq) -> Result<(), SpeechError> {
        (self.on_complete)(seq);
        Ok(())
    }

    fn cancel(&mut self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}
