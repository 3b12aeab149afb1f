mod app;
mod audio;
mod config;
mod content;
mod event;
mod session;
mod sheet;
mod speech;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, GameSession, Screen};
use content::bank::QuestionBank;
use content::sets::SetLetter;
use event::{AppEvent, EventHandler};
use session::competition::CompetitionPhase;
use session::practice::PracticePhase;
use session::settings::GameMode;
use ui::components::board::GameBoard;
use ui::components::modal::ExitModal;
use ui::components::progress_bar::ProgressBar;
use ui::components::summary::SummaryList;
use ui::layout::{AppLayout, centered_rect};

#[derive(Parser)]
#[command(name = "phonodrill", version, about = "Terminal phonics quiz with spoken dictation")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the A4 answer sheet for a competition set as HTML
    Sheet {
        /// Set letter A-J
        set: String,
        /// Mark the spoken targets (teacher's answer key)
        #[arg(long)]
        answers: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Sheet { set, answers, output }) = cli.command {
        return run_sheet(&set, answers, output.as_deref());
    }

    init_logging();

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(events.sender());

    if let Some(theme_name) = cli.theme {
        if let Some(theme) = ui::theme::Theme::load(&theme_name) {
            app.theme = Box::leak(Box::new(theme));
            app.config.theme = theme_name;
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Generate the printable sheet without touching the terminal UI. The sheet
/// and a live session resolve the same sequence, so they cannot diverge.
fn run_sheet(set: &str, answers: bool, output: Option<&Path>) -> Result<()> {
    let letter = set
        .chars()
        .next()
        .filter(|_| set.len() == 1)
        .and_then(SetLetter::from_char);
    let Some(letter) = letter else {
        bail!("'{set}' is not a set letter (expected A-J)");
    };

    let bank = QuestionBank::load();
    let html = sheet::render_sheet(letter, &bank, answers);
    match output {
        Some(path) => fs::write(path, html)?,
        None => print!("{html}"),
    }
    Ok(())
}

/// The TUI owns the terminal, so logs go to a file under the data dir.
/// Filter with RUST_LOG as usual.
fn init_logging() {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phonodrill");
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::File::create(dir.join("phonodrill.log")) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .try_init();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::SpeechEnded(seq) => app.on_speech_end(seq, Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            app.save_config();
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Settings => handle_settings_key(app, key),
        Screen::Game => handle_game_key(app, key),
        Screen::Summary => handle_summary_key(app, key),
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up => app.settings_select_prev(),
        KeyCode::Down => app.settings_select_next(),
        KeyCode::Right => app.settings_cycle(true),
        KeyCode::Left => app.settings_cycle(false),
        KeyCode::Enter => app.start_game(Instant::now()),
        KeyCode::Char(ch) if ch.is_ascii_alphabetic() => {
            // Direct set pick, like tapping a set card.
            if app.settings.mode == GameMode::Competition {
                app.select_set(ch);
            }
        }
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent) {
    if app.exit_modal {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_exit(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_exit(),
            _ => {}
        }
        return;
    }

    // Competition finished screen waits for the reveal.
    let competition_finished = matches!(
        &app.session,
        Some(GameSession::Competition(session))
            if session.phase() == CompetitionPhase::Finished
    );
    if competition_finished {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.finish_game(Instant::now()),
            KeyCode::Esc => app.request_exit(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.request_exit(),
        KeyCode::Char(ch @ '1'..='3') => {
            let index = ch as usize - '1' as usize;
            app.answer(index, Instant::now());
        }
        KeyCode::Char('r') | KeyCode::Char(' ') => app.replay(),
        _ => {}
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Char('h') => app.go_home(),
        KeyCode::Down | KeyCode::Char('j') => app.summary_select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.summary_select_prev(),
        KeyCode::Enter | KeyCode::Char(' ') => app.summary_speak_selected(),
        KeyCode::Char('r') => app.restart_game(Instant::now()),
        _ => {}
    }
}

// ---- rendering ---------------------------------------------------------

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        Screen::Settings => render_settings(frame, app),
        Screen::Game => render_game(frame, app),
        Screen::Summary => render_summary(frame, app),
    }
}

fn header_line(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " phonodrill ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());

    header_line(frame, app, layout.header, " pick a word you hear");

    let centered = centered_rect(60, 80, layout.main);
    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    frame.render_widget(block, centered);

    let competition = app.settings.mode == GameMode::Competition;
    let fields: Vec<(String, String)> = vec![
        ("Mode".to_string(), match app.settings.mode {
            GameMode::Practice => "Practice - tap to answer".to_string(),
            GameMode::Competition => "Competition - timed dictation".to_string(),
        }),
        (
            "Questions".to_string(),
            if competition {
                "60 (fixed by the set)".to_string()
            } else {
                format!("{}", app.settings.question_count)
            },
        ),
        (
            "Speed".to_string(),
            if competition {
                "0.85x (fixed)".to_string()
            } else {
                format!("{:.2}x", app.settings.speed)
            },
        ),
        (
            "Set".to_string(),
            if competition {
                match app.settings.set_letter {
                    Some(letter) => format!("Set {letter}"),
                    None => "pick one (A-J)".to_string(),
                }
            } else {
                "practice draws at random".to_string()
            },
        ),
        ("Theme".to_string(), app.config.theme.clone()),
    ];

    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(2)));
    constraints.push(Constraint::Length(2));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, (label, value)) in fields.iter().enumerate() {
        let selected = i == app.settings_selected;
        let indicator = if selected { " > " } else { "   " };
        let label_style = Style::default()
            .fg(if selected { colors.accent() } else { colors.fg() })
            .add_modifier(if selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if selected {
            colors.accent_alt()
        } else {
            colors.muted()
        });

        let line = Line::from(vec![
            Span::styled(format!("{indicator}{label:<10}"), label_style),
            Span::styled(format!("< {value} >"), value_style),
        ]);
        frame.render_widget(Paragraph::new(line), rows[i + 1]);
    }

    // Set letter strip, competition only.
    if competition {
        let mut spans = vec![Span::styled("   Sets: ", Style::default().fg(colors.fg()))];
        for letter in SetLetter::ALL {
            let chosen = app.settings.set_letter == Some(letter);
            let style = if chosen {
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.timer_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted())
            };
            spans.push(Span::styled(format!(" {letter} "), style));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)),
            rows[fields.len() + 1],
        );
    }

    let hint = if !app.settings.is_startable() {
        "Pick a set before starting the competition".to_string()
    } else if competition {
        let letter = app.settings.set_letter.map(SetLetter::as_char).unwrap_or('A');
        format!("Print the answer sheet with: phonodrill sheet {letter}")
    } else {
        String::new()
    };
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            " [Enter] Start  [Arrows] Change  [q] Quit   ",
            Style::default().fg(colors.muted()),
        ),
        Span::styled(hint, Style::default().fg(colors.accent())),
    ]));
    frame.render_widget(footer, layout.footer);
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    let Some(session) = &app.session else {
        return;
    };

    match session {
        GameSession::Competition(session) => match session.phase() {
            CompetitionPhase::Countdown => render_countdown(
                frame,
                app,
                session.countdown_display(),
                &format!("Get Ready! Set {}", session.set_letter()),
            ),
            CompetitionPhase::Playing => render_competition_board(frame, app, session),
            CompetitionPhase::Finished => render_competition_finished(frame, app, session),
        },
        GameSession::Practice(session) => {
            if session.phase() == PracticePhase::Countdown {
                render_countdown(frame, app, session.countdown_display(), "Get Ready!");
            } else {
                render_practice_board(frame, app, session);
            }
        }
    }

    if app.exit_modal {
        frame.render_widget(ExitModal { theme: app.theme }, frame.area());
    }
}

fn render_countdown(frame: &mut ratatui::Frame, app: &App, step: &str, title: &str) {
    let colors = &app.theme.colors;
    let centered = centered_rect(50, 50, frame.area());

    let go = step == "Go!";
    let lines = vec![
        Line::from(Span::styled(title.to_string(), Style::default().fg(colors.muted()))),
        Line::from(""),
        Line::from(Span::styled(
            step.to_string(),
            Style::default()
                .fg(if go { colors.accent_alt() } else { colors.accent() })
                .add_modifier(Modifier::BOLD),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered,
    );
}

fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn render_competition_board(
    frame: &mut ratatui::Frame,
    app: &App,
    session: &session::competition::CompetitionSession,
) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());
    let now = Instant::now();

    header_line(
        frame,
        app,
        layout.header,
        &format!(
            " Q{} / {}  |  Set {}",
            session.question_number(),
            session.question_count(),
            session.set_letter()
        ),
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
        ])
        .split(layout.main);

    let ratio = session.question_number() as f64 / session.question_count().max(1) as f64;
    frame.render_widget(ProgressBar::new(ratio, app.theme), rows[0]);

    // The displayed countdown; urgent styling in the last ten seconds.
    let remaining = session.remaining(now);
    let urgent = remaining <= Duration::from_secs(10);
    let timer_style = if urgent {
        Style::default()
            .fg(colors.timer_fg())
            .bg(colors.timer_warn())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(colors.timer_fg())
            .bg(colors.timer_bg())
            .add_modifier(Modifier::BOLD)
    };
    let timer = Paragraph::new(Line::from(Span::styled(
        format!("  {}  ", format_time(remaining)),
        timer_style,
    )));
    frame.render_widget(timer, rows[2]);

    if let Some(question) = session.current_question() {
        let board = GameBoard {
            choices: &question.choices,
            feedback: None,
            correct_index: question.target,
            can_answer: false,
            is_speaking: app.is_speaking(),
            competition: true,
            theme: app.theme,
        };
        frame.render_widget(board, rows[3]);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        " Listen and mark your paper sheet  [ESC] Exit ",
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, layout.footer);
}

fn render_competition_finished(
    frame: &mut ratatui::Frame,
    app: &App,
    session: &session::competition::CompetitionSession,
) {
    let colors = &app.theme.colors;
    let centered = centered_rect(60, 60, frame.area());

    let lines = vec![
        Line::from(Span::styled(
            "Time's Up!",
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Set {} complete", session.set_letter()),
            Style::default().fg(colors.muted()),
        )),
        Line::from(Span::styled(
            format!("{} questions played", session.results().len()),
            Style::default().fg(colors.accent_alt()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Students can now check their answer sheets",
            Style::default().fg(colors.muted()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Show answers",
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered,
    );
}

fn render_practice_board(
    frame: &mut ratatui::Frame,
    app: &App,
    session: &session::practice::PracticeSession,
) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());

    header_line(
        frame,
        app,
        layout.header,
        &format!(
            " Q{} / {}  |  Practice  |  {} correct",
            session.question_number().min(session.question_count()),
            session.question_count(),
            session.correct_count()
        ),
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(5)])
        .split(layout.main);

    let ratio = session.question_number() as f64 / session.question_count().max(1) as f64;
    frame.render_widget(ProgressBar::new(ratio, app.theme), rows[0]);

    if let Some(entry) = session.current_question() {
        let board = GameBoard {
            choices: &entry.choices,
            feedback: session.feedback(),
            correct_index: entry.correct,
            can_answer: session.can_answer(),
            is_speaking: app.is_speaking(),
            competition: false,
            theme: app.theme,
        };
        frame.render_widget(board, rows[2]);
    }

    let replay_hint = if session.can_answer() && !app.is_speaking() {
        "[r] Replay  "
    } else {
        ""
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" [1-3] Answer  {replay_hint}[ESC] Exit "),
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, layout.footer);
}

fn render_summary(frame: &mut ratatui::Frame, app: &App) {
    let Some(summary) = &app.summary else {
        return;
    };
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());

    // The score appears only once every row has been revealed.
    let competition = summary.results.first().is_some_and(|r| r.is_competition());
    let score = if !summary.reveal_complete() {
        " ...".to_string()
    } else if competition {
        format!(" {} questions played", summary.results.len())
    } else {
        let correct = summary
            .results
            .iter()
            .filter(|r| r.is_correct() == Some(true))
            .count();
        let total = summary.results.len();
        let percent = if total > 0 { correct * 100 / total } else { 0 };
        format!(" {correct} / {total} correct ({percent}%)")
    };
    header_line(frame, app, layout.header, &score);

    let list = SummaryList {
        items: &summary.results,
        revealed: summary.revealed,
        selected: summary.selected,
        theme: app.theme,
    };
    frame.render_widget(list, layout.main);

    let hint = if summary.reveal_complete() {
        " [j/k] Select  [Enter] Speak word  [r] Restart  [h] Home  [q] Quit "
    } else {
        " ... "
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, layout.footer);
}
