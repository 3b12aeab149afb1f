use std::time::{Duration, Instant};

use crate::content::select::ResolvedQuestion;
use crate::content::sets::{QUESTION_CYCLE, SetLetter, TOTAL_TIME};
use crate::session::result::{ResultDetail, ResultItem, ResultLog};
use crate::session::{Countdown, CountdownTick, SessionCmd, Tone};
use crate::speech::SpeechToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompetitionPhase {
    Countdown,
    Playing,
    Finished,
}

/// The fixed-cadence competition machine. Two independent clocks drive it:
/// the 240 s master clock, which alone decides when the session dies, and
/// the per-question 4 s cycle, which paces dictation. Neither is derived
/// from the other, so speech-engine latency can never drift the displayed
/// timer.
///
/// All waiting is expressed as stored deadlines checked in `tick`; the host
/// calls `tick` from its event loop and executes the returned commands.
pub struct CompetitionSession {
    set: SetLetter,
    sequence: Vec<ResolvedQuestion>,
    results: ResultLog,
    phase: CompetitionPhase,
    countdown: Countdown,
    session_start: Option<Instant>,
    /// Index of the question currently being presented.
    current: usize,
    cycle_start: Option<Instant>,
    /// Dictation we are waiting on. Completions for any other token are
    /// stale (displaced or cancelled speech) and ignored.
    awaiting: Option<SpeechToken>,
    next_question_at: Option<Instant>,
}

impl CompetitionSession {
    pub fn new(set: SetLetter, sequence: Vec<ResolvedQuestion>, now: Instant) -> Self {
        Self {
            set,
            sequence,
            results: ResultLog::default(),
            phase: CompetitionPhase::Countdown,
            countdown: Countdown::new(now),
            session_start: None,
            current: 0,
            cycle_start: None,
            awaiting: None,
            next_question_at: None,
        }
    }

    pub fn set_letter(&self) -> SetLetter {
        self.set
    }

    pub fn phase(&self) -> CompetitionPhase {
        self.phase
    }

    pub fn countdown_display(&self) -> &'static str {
        self.countdown.display()
    }

    pub fn current_question(&self) -> Option<&ResolvedQuestion> {
        self.sequence.get(self.current.min(self.sequence.len().saturating_sub(1)))
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

    /// Master-clock time left, for display. Full before play starts, zero
    /// after the session finishes.
    pub fn remaining(&self, now: Instant) -> Duration {
        match (self.phase, self.session_start) {
            (CompetitionPhase::Finished, _) => Duration::ZERO,
            (_, Some(start)) => TOTAL_TIME.saturating_sub(now - start),
            _ => TOTAL_TIME,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<SessionCmd> {
        let mut cmds = Vec::new();

        match self.phase {
            CompetitionPhase::Countdown => match self.countdown.tick(now) {
                CountdownTick::Go => cmds.push(SessionCmd::PlayTone(Tone::StartBuzz)),
                CountdownTick::Done => {
                    self.phase = CompetitionPhase::Playing;
                    self.session_start = Some(now);
                    if self.sequence.is_empty() {
                        self.finish(&mut cmds);
                    } else {
                        self.present(now, &mut cmds);
                    }
                }
                CountdownTick::Waiting => {}
            },
            CompetitionPhase::Playing => {
                // The master clock is the sole termination authority: the
                // instant it hits zero the session ends, mid-utterance or
                // not.
                if self.remaining(now).is_zero() {
                    self.finish(&mut cmds);
                    return cmds;
                }

                if self.next_question_at.is_some_and(|at| now >= at) {
                    self.next_question_at = None;
                    self.current += 1;
                    if self.current >= self.sequence.len() {
                        // Out of questions: end now, do not wait out the
                        // clock.
                        self.finish(&mut cmds);
                    } else {
                        self.present(now, &mut cmds);
                    }
                }
            }
            CompetitionPhase::Finished => {}
        }

        cmds
    }

    fn present(&mut self, now: Instant, cmds: &mut Vec<SessionCmd>) {
        let question = &self.sequence[self.current];
        self.cycle_start = Some(now);

        // Recorded at presentation time, before dictation; clock expiry
        // mid-utterance does not retract it.
        self.results.push(ResultItem {
            question_id: question.id,
            question_number: self.current + 1,
            sound: question.sound().to_string(),
            detail: ResultDetail::Competition {
                choices: question.choices.clone(),
                target: question.target,
            },
        });

        cmds.push(SessionCmd::Dictate {
            number: self.current + 1,
            word: question.sound().to_string(),
        });
    }

    /// The host reports the token it got back from the dispatcher for the
    /// `Dictate` command it just executed.
    pub fn dictation_started(&mut self, token: SpeechToken) {
        if self.phase == CompetitionPhase::Playing {
            self.awaiting = Some(token);
        }
    }

    /// Dictation finished (or errored; callers cannot tell, by design).
    /// Schedules the next question on the 4-second boundary of the current
    /// cycle, with zero extra wait when dictation overran the slot.
    pub fn dictation_done(&mut self, token: SpeechToken, now: Instant) {
        if self.phase != CompetitionPhase::Playing || self.awaiting != Some(token) {
            return;
        }
        self.awaiting = None;

        let cycle_start = self.cycle_start.unwrap_or(now);
        self.next_question_at = Some((cycle_start + QUESTION_CYCLE).max(now));
    }

    fn finish(&mut self, cmds: &mut Vec<SessionCmd>) {
        self.phase = CompetitionPhase::Finished;
        self.next_question_at = None;
        self.awaiting = None;
        cmds.push(SessionCmd::CancelSpeech);
    }

    /// User-confirmed exit: tear down timers and speech; the results are
    /// discarded by dropping the session.
    pub fn abort(&mut self) -> Vec<SessionCmd> {
        self.phase = CompetitionPhase::Finished;
        self.next_question_at = None;
        self.awaiting = None;
        vec![SessionCmd::CancelSpeech]
    }

    pub fn into_results(self) -> Vec<ResultItem> {
        self.results.into_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{QuestionBank, competition_sequence};

    const TICK: Duration = Duration::from_millis(100);

    fn sequence() -> Vec<ResolvedQuestion> {
        competition_sequence(SetLetter::A, &QuestionBank::load())
    }

    /// Drive countdown to completion; returns (session, play_start, first cmds).
    fn started(now: Instant) -> (CompetitionSession, Instant, Vec<SessionCmd>) {
        let mut session = CompetitionSession::new(SetLetter::A, sequence(), now);
        let mut at = now;
        loop {
            at += TICK;
            let cmds = session.tick(at);
            if session.phase() == CompetitionPhase::Playing {
                return (session, at, cmds);
            }
            assert!(at - now < Duration::from_secs(10), "countdown never finished");
        }
    }

    fn dictate_token(cmds: &[SessionCmd]) -> bool {
        cmds.iter().any(|c| matches!(c, SessionCmd::Dictate { .. }))
    }

    #[test]
    fn countdown_plays_buzz_once_then_enters_playing() {
        let t0 = Instant::now();
        let mut session = CompetitionSession::new(SetLetter::A, sequence(), t0);
        assert_eq!(session.phase(), CompetitionPhase::Countdown);

        let mut buzzes = 0;
        let mut at = t0;
        while session.phase() == CompetitionPhase::Countdown {
            at += TICK;
            buzzes += session
                .tick(at)
                .iter()
                .filter(|c| **c == SessionCmd::PlayTone(Tone::StartBuzz))
                .count();
        }
        assert_eq!(buzzes, 1);
        // 3 digit steps + the Go! step at one second each.
        assert_eq!(at - t0, Duration::from_secs(4));
    }

    #[test]
    fn first_question_is_presented_and_recorded_before_dictation_completes() {
        let t0 = Instant::now();
        let (session, _, cmds) = started(t0);

        assert!(dictate_token(&cmds));
        assert_eq!(session.results().len(), 1);
        let first = &session.results()[0];
        assert_eq!(first.question_id, 47);
        assert_eq!(first.question_number, 1);
        match &first.detail {
            ResultDetail::Competition { target, .. } => assert_eq!(*target, 2),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn fast_dictation_still_fills_the_four_second_slot() {
        let t0 = Instant::now();
        let (mut session, play_start, _) = started(t0);
        let token = crate::speech::SpeechToken::test_token(1);
        session.dictation_started(token);

        // Dictation done after 1.5s; next question must wait until 4s.
        session.dictation_done(token, play_start + Duration::from_millis(1500));

        let mut at = play_start;
        let mut presented_at = None;
        while presented_at.is_none() {
            at += TICK;
            if dictate_token(&session.tick(at)) {
                presented_at = Some(at);
            }
        }
        let gap = presented_at.unwrap() - play_start;
        assert!(gap >= QUESTION_CYCLE, "advanced early: {gap:?}");
        assert!(gap <= QUESTION_CYCLE + TICK, "advanced late: {gap:?}");
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn slow_dictation_advances_with_zero_extra_wait() {
        let t0 = Instant::now();
        let (mut session, play_start, _) = started(t0);
        let token = crate::speech::SpeechToken::test_token(1);
        session.dictation_started(token);

        // Dictation overran the slot by 1.2s.
        let done_at = play_start + Duration::from_millis(5200);
        session.dictation_done(token, done_at);

        let cmds = session.tick(done_at + Duration::from_millis(1));
        assert!(dictate_token(&cmds), "must advance immediately after overrun");
    }

    #[test]
    fn stale_dictation_token_is_ignored() {
        let t0 = Instant::now();
        let (mut session, play_start, _) = started(t0);
        let live = crate::speech::SpeechToken::test_token(2);
        session.dictation_started(live);

        let stale = crate::speech::SpeechToken::test_token(1);
        session.dictation_done(stale, play_start + Duration::from_secs(1));
        // No advance deadline was scheduled by the stale completion.
        let cmds = session.tick(play_start + Duration::from_secs(5));
        assert!(!dictate_token(&cmds));
    }

    #[test]
    fn master_clock_finishes_the_session_within_one_tick_of_expiry() {
        let t0 = Instant::now();
        let (mut session, play_start, _) = started(t0);

        // Never complete any dictation: the master clock must still kill the
        // session on schedule.
        let mut at = play_start;
        while session.phase() != CompetitionPhase::Finished {
            at += TICK;
            let cmds = session.tick(at);
            if session.phase() == CompetitionPhase::Finished {
                assert!(cmds.contains(&SessionCmd::CancelSpeech));
            }
            assert!(at - play_start <= TOTAL_TIME + TICK, "clock overran");
        }
        let elapsed = at - play_start;
        assert!(elapsed >= TOTAL_TIME);
        assert!(elapsed <= TOTAL_TIME + TICK);
        // Only the first question was ever recorded.
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn full_run_presents_sixty_questions_in_schedule_order_then_finishes() {
        let t0 = Instant::now();
        let (mut session, play_start, _) = started(t0);
        let mut token_id = 1;
        let mut at = play_start;

        // Complete each dictation 2s into its cycle; 60 questions at 4s each
        // is exactly the 240s budget, so the sequence exhausts right as the
        // clock runs out -- drive on half-tick offsets to keep the exhaustion
        // check ahead of the expiry check.
        session.dictation_started(crate::speech::SpeechToken::test_token(token_id));
        loop {
            at += Duration::from_millis(50);
            session.tick(at);
            match session.phase() {
                CompetitionPhase::Finished => break,
                CompetitionPhase::Playing => {
                    if session.results().len() == token_id as usize {
                        let token = crate::speech::SpeechToken::test_token(token_id);
                        // Two seconds into the cycle, report dictation done.
                        let cycle_start = play_start
                            + QUESTION_CYCLE * (token_id as u32 - 1);
                        if at >= cycle_start + Duration::from_secs(2)
                            && session.results().len() == token_id as usize
                        {
                            session.dictation_done(token, at);
                            if session.results().len() < 60 {
                                token_id += 1;
                                session.dictation_started(
                                    crate::speech::SpeechToken::test_token(token_id),
                                );
                            }
                        }
                    }
                }
                CompetitionPhase::Countdown => unreachable!(),
            }
            assert!(at - play_start < TOTAL_TIME + Duration::from_secs(1));
        }

        let results = session.into_results();
        assert_eq!(results.len(), 60);
        for (idx, item) in results.iter().enumerate() {
            assert_eq!(item.question_number, idx + 1);
            assert!(item.is_competition());
        }
    }

    #[test]
    fn abort_discards_nothing_but_caller_drops_the_session() {
        let t0 = Instant::now();
        let (mut session, _, _) = started(t0);
        let cmds = session.abort();
        assert!(cmds.contains(&SessionCmd::CancelSpeech));
        assert_eq!(session.phase(), CompetitionPhase::Finished);
    }

    #[test]
    fn empty_sequence_finishes_immediately_on_play() {
        let t0 = Instant::now();
        let mut session = CompetitionSession::new(SetLetter::A, Vec::new(), t0);
        let mut at = t0;
        while session.phase() == CompetitionPhase::Countdown {
            at += TICK;
            session.tick(at);
        }
        assert_eq!(session.phase(), CompetitionPhase::Finished);
        assert!(session.results().is_empty());
    }
}
