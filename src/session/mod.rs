pub mod competition;
pub mod practice;
pub mod result;
pub mod settings;

use std::time::{Duration, Instant};

pub use competition::CompetitionSession;
pub use practice::PracticeSession;
pub use result::{ResultDetail, ResultItem, ResultLog};
pub use settings::{GameMode, GameSettings};

pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// Audio effect requested by a session. Playback is best-effort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    StartBuzz,
    Click,
    Correct,
    Incorrect,
    Pop,
}

/// Side effects a session asks its host to perform. Sessions never touch the
/// speech engine or audio output themselves; they only transition state and
/// emit these.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionCmd {
    PlayTone(Tone),
    /// Competition dictation: number, pause, word.
    Dictate { number: usize, word: String },
    /// Single practice word at the configured rate.
    SpeakWord { word: String, rate: f64 },
    CancelSpeech,
}

/// The shared 3-2-1-Go lead-in. The start buzz is the action attached to
/// entering the final step, so it cannot replay on a redraw.
#[derive(Clone, Copy, Debug)]
struct Countdown {
    /// 3, 2, 1 are the digits; 0 is "Go!".
    step: u8,
    next_step_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CountdownTick {
    Waiting,
    /// Just entered "Go!": play the start buzz.
    Go,
    Done,
}

impl Countdown {
    fn new(now: Instant) -> Self {
        Self {
            step: 3,
            next_step_at: now + COUNTDOWN_STEP,
        }
    }

    fn display(&self) -> &'static str {
        match self.step {
            3 => "3",
            2 => "2",
            1 => "1",
            _ => "Go!",
        }
    }

    fn tick(&mut self, now: Instant) -> CountdownTick {
        if now < self.next_step_at {
            return CountdownTick::Waiting;
        }
        self.next_step_at += COUNTDOWN_STEP;
        if self.step == 0 {
            return CountdownTick::Done;
        }
        self.step -= 1;
        if self.step == 0 {
            CountdownTick::Go
        } else {
            CountdownTick::Waiting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_three_two_one_go_at_one_second_cadence() {
        let t0 = Instant::now();
        let mut countdown = Countdown::new(t0);
        assert_eq!(countdown.display(), "3");

        assert_eq!(countdown.tick(t0 + Duration::from_millis(900)), CountdownTick::Waiting);
        assert_eq!(countdown.display(), "3");

        assert_eq!(countdown.tick(t0 + Duration::from_secs(1)), CountdownTick::Waiting);
        assert_eq!(countdown.display(), "2");
        assert_eq!(countdown.tick(t0 + Duration::from_secs(2)), CountdownTick::Waiting);
        assert_eq!(countdown.display(), "1");

        assert_eq!(countdown.tick(t0 + Duration::from_secs(3)), CountdownTick::Go);
        assert_eq!(countdown.display(), "Go!");

        assert_eq!(countdown.tick(t0 + Duration::from_secs(4)), CountdownTick::Done);
    }

    #[test]
    fn go_fires_once_even_with_dense_ticks() {
        let t0 = Instant::now();
        let mut countdown = Countdown::new(t0);
        let mut go_count = 0;
        for ms in (0..5000).step_by(50) {
            if countdown.tick(t0 + Duration::from_millis(ms)) == CountdownTick::Go {
                go_count += 1;
            }
        }
        assert_eq!(go_count, 1);
    }
}
