pub mod dispatcher;
pub mod engine;
pub mod voice;

pub use dispatcher::{SpeechDispatcher, SpeechToken};
pub use engine::{CompletionFn, PlatformSpeech, SilentSpeech, SpeechEngine, SpeechError, SpeechSeq};
pub use voice::{VoiceInfo, select_voice};
