use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle};

use crate::session::Tone;

const SAMPLE_RATE: u32 = 44_100;

/// Gameplay tone player. One output stream, created on first use and reused
/// for every tone; platforms cap how many concurrent audio handles a process
/// may hold. Playback is best-effort: with no output device the game is
/// simply silent.
pub struct Sfx {
    stream: Option<(OutputStream, OutputStreamHandle)>,
    unavailable: bool,
    rng: SmallRng,
}

impl Sfx {
    pub fn new() -> Self {
        Self {
            stream: None,
            unavailable: false,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn play(&mut self, tone: Tone) {
        let samples = match tone {
            Tone::StartBuzz => start_buzz(),
            Tone::Click => decaying(Wave::Sine, 1200.0, 0.15, 0.08),
            Tone::Correct => correct_chirp(),
            Tone::Incorrect => decaying(Wave::Sawtooth, 200.0, 0.2, 0.3),
            Tone::Pop => {
                let freq = 600.0 + self.rng.gen_range(0.0..400.0);
                decaying(Wave::Sine, freq, 0.25, 0.15)
            }
        };

        let Some(handle) = self.handle() else {
            return;
        };
        let buffer = SamplesBuffer::new(1, SAMPLE_RATE, samples);
        if let Err(e) = handle.play_raw(buffer) {
            tracing::warn!(error = %e, "tone playback failed");
        }
    }

    fn handle(&mut self) -> Option<&OutputStreamHandle> {
        if self.unavailable {
            return None;
        }
        if self.stream.is_none() {
            match OutputStream::try_default() {
                Ok(pair) => self.stream = Some(pair),
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output, tones disabled");
                    self.unavailable = true;
                    return None;
                }
            }
        }
        self.stream.as_ref().map(|(_, handle)| handle)
    }
}

#[derive(Clone, Copy)]
enum Wave {
    Sine,
    Square,
    Sawtooth,
}

fn sample(wave: Wave, freq: f32, t: f32) -> f32 {
    let phase = (t * freq).fract();
    match wave {
        Wave::Sine => (phase * std::f32::consts::TAU).sin(),
        Wave::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Wave::Sawtooth => 2.0 * phase - 1.0,
    }
}

/// Exponential gain ramp from `gain` down to 0.01 over `duration` seconds.
fn envelope(gain: f32, duration: f32, t: f32) -> f32 {
    gain * (0.01f32 / gain).powf(t / duration)
}

fn decaying(wave: Wave, freq: f32, gain: f32, duration: f32) -> Vec<f32> {
    let count = (SAMPLE_RATE as f32 * duration) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            sample(wave, freq, t) * envelope(gain, duration, t)
        })
        .collect()
}

/// Two detuned square waves, the start-of-competition buzzer.
fn start_buzz() -> Vec<f32> {
    let duration = 0.4;
    let count = (SAMPLE_RATE as f32 * duration) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let mix = sample(Wave::Square, 440.0, t) + sample(Wave::Square, 554.0, t);
            0.5 * mix * envelope(0.2, duration, t)
        })
        .collect()
}

/// Two-note rising chirp for a correct answer (C5 then E5).
fn correct_chirp() -> Vec<f32> {
    let duration = 0.25;
    let count = (SAMPLE_RATE as f32 * duration) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let freq = if t < 0.1 { 523.0 } else { 659.0 };
            sample(Wave::Sine, freq, t) * envelope(0.25, duration, t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_are_finite_and_decay_to_silence() {
        for samples in [
            start_buzz(),
            correct_chirp(),
            decaying(Wave::Sine, 1200.0, 0.15, 0.08),
            decaying(Wave::Sawtooth, 200.0, 0.2, 0.3),
        ] {
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
            let tail = &samples[samples.len() - 100..];
            assert!(tail.iter().all(|s| s.abs() < 0.05), "tone does not decay");
        }
    }
}
