use std::time::{Duration, Instant};

use crate::content::select::PoolEntry;
use crate::session::result::{ResultDetail, ResultItem, ResultLog};
use crate::session::{Countdown, CountdownTick, SessionCmd, Tone};
use crate::speech::SpeechToken;

/// Settle time between a question becoming current and its dictation.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);
/// How long the correct/incorrect flash stays up before advancing.
pub const FEEDBACK_DURATION: Duration = Duration::from_millis(800);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticePhase {
    Countdown,
    /// Waiting out the settle delay before speaking.
    AwaitingSpeech,
    /// First dictation of the current word is in flight; input locked.
    Speaking,
    /// Input unlocked. Replay is allowed here (only while not speaking).
    AwaitingAnswer,
    /// Transient verdict flash; input locked again.
    Feedback,
    Finished,
}

/// Self-paced practice: settle, speak, await a tap, flash the verdict,
/// advance. Answers are judged by choice index, never by string equality,
/// so duplicate-looking choices cannot be credited from the wrong card.
pub struct PracticeSession {
    sequence: Vec<PoolEntry>,
    speed: f64,
    results: ResultLog,
    phase: PracticePhase,
    countdown: Countdown,
    current: usize,
    /// Deadline for the phase that owns one: settle end or feedback end.
    phase_deadline: Option<Instant>,
    /// Utterance we are waiting on (first dictation or replay).
    awaiting: Option<SpeechToken>,
    /// Verdict of the current feedback flash, and the tapped index.
    feedback: Option<(bool, usize)>,
}

impl PracticeSession {
    pub fn new(sequence: Vec<PoolEntry>, speed: f64, now: Instant) -> Self {
        Self {
            sequence,
            speed,
            results: ResultLog::default(),
            phase: PracticePhase::Countdown,
            countdown: Countdown::new(now),
            current: 0,
            phase_deadline: None,
            awaiting: None,
            feedback: None,
        }
    }

    pub fn phase(&self) -> PracticePhase {
        self.phase
    }

    pub fn countdown_display(&self) -> &'static str {
        self.countdown.display()
    }

    pub fn current_question(&self) -> Option<&PoolEntry> {
        self.sequence.get(self.current)
    }

    pub fn question_number(&self) -> usize {
        self.current + 1
    }

    pub fn question_count(&self) -> usize {
        self.sequence.len()
    }

    pub fn results(&self) -> &[ResultItem] {
        self.results.items()
    }

    pub fn correct_count(&self) -> usize {
        self.results.correct_count()
    }

    pub fn can_answer(&self) -> bool {
        self.phase == PracticePhase::AwaitingAnswer
    }

    /// Verdict to render during the feedback flash: (correct, tapped index).
    pub fn feedback(&self) -> Option<(bool, usize)> {
        if self.phase == PracticePhase::Feedback {
            self.feedback
        } else {
            None
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<SessionCmd> {
        let mut cmds = Vec::new();

        match self.phase {
            PracticePhase::Countdown => match self.countdown.tick(now) {
                CountdownTick::Go => cmds.push(SessionCmd::PlayTone(Tone::StartBuzz)),
                CountdownTick::Done => {
                    if self.sequence.is_empty() {
                        self.phase = PracticePhase::Finished;
                    } else {
                        self.settle(now);
                    }
                }
                CountdownTick::Waiting => {}
            },
            PracticePhase::AwaitingSpeech => {
                if self.phase_deadline.is_some_and(|at| now >= at) {
                    self.phase_deadline = None;
                    self.phase = PracticePhase::Speaking;
                    let entry = &self.sequence[self.current];
                    cmds.push(SessionCmd::SpeakWord {
                        word: entry.sound().to_string(),
                        rate: self.speed,
                    });
                }
            }
            PracticePhase::Feedback => {
                if self.phase_deadline.is_some_and(|at| now >= at) {
                    self.phase_deadline = None;
                    self.feedback = None;
                    self.current += 1;
                    if self.current >= self.sequence.len() {
                        self.phase = PracticePhase::Finished;
                        cmds.push(SessionCmd::CancelSpeech);
                    } else {
                        self.settle(now);
                    }
                }
            }
            _ => {}
        }

        cmds
    }

    fn settle(&mut self, now: Instant) {
        self.phase = PracticePhase::AwaitingSpeech;
        self.phase_deadline = Some(now + SETTLE_DELAY);
        self.awaiting = None;
    }

    /// The host reports the dispatcher token for the `SpeakWord` it issued.
    pub fn speech_started(&mut self, token: SpeechToken) {
        if matches!(self.phase, PracticePhase::Speaking | PracticePhase::AwaitingAnswer) {
            self.awaiting = Some(token);
        }
    }

    /// Word dictation finished; unlock input if this was the first dictation
    /// of the current question. Stale tokens are ignored.
    pub fn word_done(&mut self, token: SpeechToken) {
        if self.awaiting != Some(token) {
            return;
        }
        self.awaiting = None;
        if self.phase == PracticePhase::Speaking {
            self.phase = PracticePhase::AwaitingAnswer;
        }
    }

    /// A tap on choice `index`. Ignored unless input is unlocked; judged by
    /// index against the pool entry's own correct index.
    pub fn answer(&mut self, index: usize, now: Instant) -> Vec<SessionCmd> {
        if self.phase != PracticePhase::AwaitingAnswer || index >= 3 {
            return Vec::new();
        }

        let entry = &self.sequence[self.current];
        let correct = index == entry.correct;

        self.results.push(ResultItem {
            question_id: entry.id,
            question_number: self.current + 1,
            sound: entry.sound().to_string(),
            detail: ResultDetail::Practice {
                correct,
                user_answer: entry.choices[index].clone(),
                correct_answer: entry.choices[entry.correct].clone(),
            },
        });

        self.feedback = Some((correct, index));
        self.phase = PracticePhase::Feedback;
        self.phase_deadline = Some(now + FEEDBACK_DURATION);

        vec![
            SessionCmd::PlayTone(Tone::Click),
            SessionCmd::PlayTone(if correct { Tone::Correct } else { Tone::Incorrect }),
        ]
    }

    /// Replay the current word. Permitted only while awaiting an answer and
    /// not already speaking: replay never interrupts the first dictation and
    /// never unlocks an answered question.
    pub fn replay(&mut self) -> Vec<SessionCmd> {
        if self.phase != PracticePhase::AwaitingAnswer || self.awaiting.is_some() {
            return Vec::new();
        }
        let entry = &self.sequence[self.current];
        vec![SessionCmd::SpeakWord {
            word: entry.sound().to_string(),
            rate: self.speed,
        }]
    }

    /// Exit teardown; practice exits without confirmation.
    pub fn abort(&mut self) -> Vec<SessionCmd> {
        self.phase = PracticePhase::Finished;
        self.phase_deadline = None;
        self.awaiting = None;
        vec![SessionCmd::CancelSpeech]
    }

    pub fn into_results(self) -> Vec<ResultItem> {
        self.results.into_items()
    }
}
