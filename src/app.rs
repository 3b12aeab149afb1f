use std::sync::{Arc, Mutex, mpsc};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::audio::Sfx;
use crate::config::Config;
use crate::content::bank::QuestionBank;
use crate::content::select::{competition_sequence, practice_pool, select_unique_targets};
use crate::content::sets::{DICTATION_RATE, SetLetter};
use crate::event::AppEvent;
use crate::session::competition::{CompetitionPhase, CompetitionSession};
use crate::session::practice::{PracticePhase, PracticeSession};
use crate::session::result::ResultItem;
use crate::session::settings::{
    GameMode, GameSettings, QUESTION_COUNT_OPTIONS, SPEED_MAX, SPEED_MIN, SPEED_STEP,
};
use crate::session::{SessionCmd, Tone};
use crate::speech::engine::{CompletionFn, SpeechEngine};
use crate::speech::{PlatformSpeech, SilentSpeech, SpeechDispatcher, SpeechSeq};
use crate::ui::theme::Theme;

/// Cadence of the summary screen's row-by-row reveal.
const REVEAL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Settings,
    Game,
    Summary,
}

pub enum GameSession {
    Practice(PracticeSession),
    Competition(CompetitionSession),
}

pub struct SummaryState {
    pub results: Vec<ResultItem>,
    pub revealed: usize,
    pub selected: usize,
    next_reveal_at: Option<Instant>,
}

impl SummaryState {
    pub fn reveal_complete(&self) -> bool {
        self.revealed >= self.results.len()
    }
}

/// Settings-form fields, top to bottom.
pub const SETTINGS_FIELDS: [&str; 5] = ["Mode", "Questions", "Speed", "Set", "Theme"];

pub struct App {
    pub screen: Screen,
    pub settings: GameSettings,
    pub settings_selected: usize,
    pub session: Option<GameSession>,
    pub exit_modal: bool,
    pub summary: Option<SummaryState>,
    pub theme: &'static Theme,
    pub config: Config,
    pub should_quit: bool,
    bank: QuestionBank,
    dispatcher: SpeechDispatcher,
    sfx: Sfx,
    rng: SmallRng,
}

impl App {
    pub fn new(event_tx: mpsc::Sender<AppEvent>) -> Self {
        let config = Config::load().unwrap_or_default();
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let tx = Mutex::new(event_tx);
        let on_complete: CompletionFn = Arc::new(move |seq| {
            if let Ok(tx) = tx.lock() {
                let _ = tx.send(AppEvent::SpeechEnded(seq));
            }
        });

        let engine: Box<dyn SpeechEngine> = match PlatformSpeech::new(Arc::clone(&on_complete)) {
            Ok(engine) => Box::new(engine),
            Err(e) => {
                tracing::warn!(error = %e, "platform speech unavailable, running silent");
                Box::new(SilentSpeech::new(on_complete))
            }
        };
        let dispatcher = SpeechDispatcher::new(engine);

        let settings = config.game_settings();

        Self {
            screen: Screen::Settings,
            settings,
            settings_selected: 0,
            session: None,
            exit_modal: false,
            summary: None,
            theme,
            config,
            should_quit: false,
            bank: QuestionBank::load(),
            dispatcher,
            sfx: Sfx::new(),
            rng: SmallRng::from_entropy(),
        }
    }

    // ---- event plumbing -------------------------------------------------

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(token) = self.dispatcher.tick(now) {
            self.on_speech_done(token, now);
        }

        let cmds = match self.session.as_mut() {
            Some(GameSession::Competition(session)) => session.tick(now),
            Some(GameSession::Practice(session)) => session.tick(now),
            None => Vec::new(),
        };
        self.execute(cmds);

        // Practice hands off to the summary by itself; competition waits on
        // its finished screen for the teacher to reveal the answers.
        let practice_done = matches!(
            &self.session,
            Some(GameSession::Practice(session)) if session.phase() == PracticePhase::Finished
        );
        if practice_done {
            self.finish_game(now);
        }

        self.tick_summary_reveal(now);
    }

    pub fn on_speech_end(&mut self, seq: SpeechSeq, now: Instant) {
        if let Some(token) = self.dispatcher.on_utterance_end(seq, now) {
            self.on_speech_done(token, now);
        }
    }

    fn on_speech_done(&mut self, token: crate::speech::SpeechToken, now: Instant) {
        match self.session.as_mut() {
            Some(GameSession::Competition(session)) => session.dictation_done(token, now),
            Some(GameSession::Practice(session)) => session.word_done(token),
            // Summary replay; nothing tracks its completion.
            None => {}
        }
    }

    fn execute(&mut self, cmds: Vec<SessionCmd>) {
        for cmd in cmds {
            match cmd {
                SessionCmd::PlayTone(tone) => self.sfx.play(tone),
                SessionCmd::Dictate { number, word } => {
                    let token = self.dispatcher.speak_dictation(number, &word);
                    if let Some(GameSession::Competition(session)) = self.session.as_mut() {
                        session.dictation_started(token);
                    }
                }
                SessionCmd::SpeakWord { word, rate } => {
                    let token = self.dispatcher.speak_word(&word, rate);
                    if let Some(GameSession::Practice(session)) = self.session.as_mut() {
                        session.speech_started(token);
                    }
                }
                SessionCmd::CancelSpeech => self.dispatcher.cancel(),
            }
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.dispatcher.is_speaking()
    }

    // ---- game lifecycle -------------------------------------------------

    pub fn start_game(&mut self, now: Instant) {
        if !self.settings.is_startable() {
            return;
        }

        self.config.remember(&self.settings);
        if let Err(e) = self.config.save() {
            tracing::warn!(error = %e, "saving settings failed");
        }

        let session = match self.settings.mode {
            GameMode::Competition => {
                // is_startable guarantees a letter in competition mode.
                let Some(letter) = self.settings.set_letter else {
                    return;
                };
                let sequence = competition_sequence(letter, &self.bank);
                GameSession::Competition(CompetitionSession::new(letter, sequence, now))
            }
            GameMode::Practice => {
                let pool = practice_pool(&self.bank);
                let count = self.settings.effective_question_count();
                let targets = select_unique_targets(&pool, count, &mut self.rng);
                GameSession::Practice(PracticeSession::new(targets, self.settings.speed, now))
            }
        };

        tracing::info!(mode = self.settings.mode.as_str(), "session started");

        self.session = Some(session);
        self.exit_modal = false;
        self.summary = None;
        self.screen = Screen::Game;
    }

    /// Session over: hand the result log to the summary screen.
    pub fn finish_game(&mut self, now: Instant) {
        let Some(session) = self.session.take() else {
            return;
        };
        let results = match session {
            GameSession::Practice(session) => session.into_results(),
            GameSession::Competition(session) => session.into_results(),
        };

        tracing::info!(questions = results.len(), "session finished");
        self.summary = Some(SummaryState {
            results,
            revealed: 0,
            selected: 0,
            next_reveal_at: Some(now + REVEAL_INTERVAL),
        });
        self.exit_modal = false;
        self.screen = Screen::Summary;
    }

    /// Esc during a game. Competition play requires confirmation; everything
    /// else exits straight back to settings.
    pub fn request_exit(&mut self) {
        match &self.session {
            Some(GameSession::Competition(session))
                if session.phase() == CompetitionPhase::Playing =>
            {
                self.exit_modal = true;
            }
            _ => self.exit_game(),
        }
    }

    pub fn confirm_exit(&mut self) {
        self.exit_modal = false;
        self.exit_game();
    }

    pub fn cancel_exit(&mut self) {
        self.exit_modal = false;
    }

    /// Discard the session. The settings value the form holds is untouched,
    /// so the player returns to exactly what they started with.
    fn exit_game(&mut self) {
        if let Some(mut session) = self.session.take() {
            let cmds = match &mut session {
                GameSession::Practice(session) => session.abort(),
                GameSession::Competition(session) => session.abort(),
            };
            self.execute(cmds);
        }
        self.exit_modal = false;
        self.screen = Screen::Settings;
    }

    // ---- practice input -------------------------------------------------

    pub fn answer(&mut self, index: usize, now: Instant) {
        if self.exit_modal {
            return;
        }
        if let Some(GameSession::Practice(session)) = self.session.as_mut() {
            let cmds = session.answer(index, now);
            self.execute(cmds);
        }
    }

    pub fn replay(&mut self) {
        if self.exit_modal {
            return;
        }
        // The dispatcher knows about replays the session does not (summary
        // speech etc.), so gate on it too.
        if self.dispatcher.is_speaking() {
            return;
        }
        if let Some(GameSession::Practice(session)) = self.session.as_mut() {
            let cmds = session.replay();
            self.execute(cmds);
        }
    }

    // ---- summary --------------------------------------------------------

    fn tick_summary_reveal(&mut self, now: Instant) {
        let Some(summary) = self.summary.as_mut() else {
            return;
        };
        let Some(at) = summary.next_reveal_at else {
            return;
        };
        if now < at {
            return;
        }

        if summary.revealed < summary.results.len() {
            summary.revealed += 1;
            summary.next_reveal_at = Some(now + REVEAL_INTERVAL);
            self.sfx.play(Tone::Pop);
        } else {
            summary.next_reveal_at = None;
        }
    }

    pub fn summary_select_next(&mut self) {
        if let Some(summary) = self.summary.as_mut() {
            if summary.reveal_complete() && !summary.results.is_empty() {
                summary.selected = (summary.selected + 1).min(summary.results.len() - 1);
            }
        }
    }

    pub fn summary_select_prev(&mut self) {
        if let Some(summary) = self.summary.as_mut() {
            summary.selected = summary.selected.saturating_sub(1);
        }
    }

    /// Re-speak the selected result's word, competition-rate, same voice and
    /// serialization contract as in-session dictation.
    pub fn summary_speak_selected(&mut self) {
        let Some(summary) = self.summary.as_ref() else {
            return;
        };
        if !summary.reveal_complete() {
            return;
        }
        if let Some(item) = summary.results.get(summary.selected) {
            let word = item.sound.clone();
            self.dispatcher.speak_word(&word, DICTATION_RATE);
        }
    }

    pub fn restart_game(&mut self, now: Instant) {
        self.summary = None;
        self.start_game(now);
    }

    pub fn go_home(&mut self) {
        self.dispatcher.cancel();
        self.summary = None;
        self.screen = Screen::Settings;
    }

    // ---- settings form --------------------------------------------------

    pub fn settings_select_prev(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_select_next(&mut self) {
        self.settings_selected = (self.settings_selected + 1).min(SETTINGS_FIELDS.len() - 1);
    }

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                self.settings.mode = match self.settings.mode {
                    GameMode::Practice => GameMode::Competition,
                    GameMode::Competition => GameMode::Practice,
                };
            }
            1 => {
                let options = QUESTION_COUNT_OPTIONS;
                let idx = options
                    .iter()
                    .position(|&c| c == self.settings.question_count)
                    .unwrap_or(0);
                let next = if forward {
                    (idx + 1) % options.len()
                } else if idx == 0 {
                    options.len() - 1
                } else {
                    idx - 1
                };
                self.settings.question_count = options[next];
            }
            2 => {
                let step = if forward { SPEED_STEP } else { -SPEED_STEP };
                self.settings.speed = (self.settings.speed + step).clamp(SPEED_MIN, SPEED_MAX);
            }
            3 => {
                let all = SetLetter::ALL;
                let next = match self.settings.set_letter {
                    None => {
                        if forward {
                            Some(all[0])
                        } else {
                            Some(all[all.len() - 1])
                        }
                    }
                    Some(letter) => {
                        let idx = all.iter().position(|&l| l == letter).unwrap_or(0);
                        if forward {
                            all.get(idx + 1).copied()
                        } else if idx == 0 {
                            None
                        } else {
                            Some(all[idx - 1])
                        }
                    }
                };
                self.settings.set_letter = next;
            }
            4 => self.cycle_theme(forward),
            _ => {}
        }
    }

    /// Direct set selection with a letter key, like tapping a set card.
    pub fn select_set(&mut self, ch: char) {
        if let Some(letter) = SetLetter::from_char(ch) {
            self.settings.set_letter = Some(letter);
        }
    }

    fn cycle_theme(&mut self, forward: bool) {
        let mut themes = Theme::available_themes();
        themes.sort();
        if themes.is_empty() {
            return;
        }
        let idx = themes
            .iter()
            .position(|t| *t == self.config.theme)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % themes.len()
        } else if idx == 0 {
            themes.len() - 1
        } else {
            idx - 1
        };
        self.config.theme = themes[next].clone();
        if let Some(new_theme) = Theme::load(&self.config.theme) {
            let theme: &'static Theme = Box::leak(Box::new(new_theme));
            self.theme = theme;
        }
    }

    pub fn save_config(&mut self) {
        self.config.remember(&self.settings);
        if let Err(e) = self.config.save() {
            tracing::warn!(error = %e, "saving config failed");
        }
    }
}
