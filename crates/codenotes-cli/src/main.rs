mod app;
mod inspect;
mod render;

use anyhow::{Context, Result};
use app::{App, Mode};
use codenotes_config::Config;
use codenotes_engine::io;
use codenotes_engine::persistence::NoteField;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::{
    env,
    fs::OpenOptions,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
    time::{Duration, Instant},
};

/// Longest the event loop sleeps with no save due.
const IDLE_POLL: Duration = Duration::from_millis(250);

const LOG_FILE: &str = ".codenotes.log";

fn usage(program: &str) {
    eprintln!("Usage: {program} [notes-folder-path]");
    eprintln!("       {program} inspect <file>");
    eprintln!("       {program} convert <file> [--to flat|nested]");
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("codenotes", String::as_str);

    match args.get(1).map(String::as_str) {
        Some("inspect") => {
            init_logging(None);
            let Some(file) = args.get(2) else {
                usage(program);
                process::exit(1);
            };
            let raw = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
            print!("{}", inspect::inspect(&raw));
            Ok(())
        }
        Some("convert") => {
            init_logging(None);
            let Some(file) = args.get(2) else {
                usage(program);
                process::exit(1);
            };
            let format = target_format(args.get(3..).unwrap_or_default());
            let raw = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
            let grouping = Config::load()
                .ok()
                .flatten()
                .map(|c| c.storage.list_grouping)
                .unwrap_or_default();
            println!("{}", inspect::convert(&raw, &format, grouping)?);
            Ok(())
        }
        _ => run_tui(&args),
    }
}

/// Value of `--to`, defaulting to the notes field's format.
fn target_format(rest: &[String]) -> String {
    match rest {
        [flag, value, ..] if flag == "--to" => value.clone(),
        _ => NoteField::Notes.default_format().as_str().to_string(),
    }
}

/// Logs go to stderr, or to a file under the notes directory while the TUI
/// owns the terminal.
fn init_logging(log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(log::LevelFilter::Info);

    if let Some(path) = log_file
        && let Ok(file) = OpenOptions::new().create(true).append(true).open(path)
    {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
}

fn run_tui(args: &[String]) -> Result<()> {
    // Determine notes path from CLI args or config file
    let config_path = Config::config_path();
    let program = args.first().map_or("codenotes", String::as_str);

    let (config, from_config) = match args.len() {
        2 => {
            let notes_path = PathBuf::from(&args[1]);
            let config = match Config::load() {
                Ok(Some(config)) => Config {
                    notes_path,
                    ..config
                },
                _ => Config::new(notes_path),
            };
            (config, false)
        }
        1 => match Config::load() {
            Ok(Some(config)) => (config, true),
            Ok(None) => {
                eprintln!("Error: No notes path provided and no config file found");
                usage(program);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                usage(program);
                process::exit(1);
            }
        },
        _ => {
            usage(program);
            process::exit(1);
        }
    };

    // Validate notes directory using engine
    if let Err(e) = io::validate_notes_dir(&config.notes_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Notes path '{}'{} is invalid: {e}",
            config.notes_path.display(),
            source
        );
        process::exit(1);
    }

    init_logging(Some(&config.notes_path.join(LOG_FILE)));
    log::info!("codenotes starting in {}", config.notes_path.display());

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .next_deadline()
            .map_or(IDLE_POLL, |due| due.saturating_duration_since(Instant::now()))
            .min(IDLE_POLL);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.on_key(key, Instant::now());
                }
                Event::Paste(text) => app.on_paste(text, Instant::now()),
                _ => {}
            }
        }
        app.tick(Instant::now());
    }

    // Flush whatever is still waiting out the debounce
    let mut remaining = 0;
    while app.next_deadline().is_some() && remaining < 3 {
        app.tick(Instant::now() + Duration::from_secs(60));
        remaining += 1;
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    // Note list panel
    let note_items: Vec<ListItem> = app
        .notes
        .iter()
        .map(|note| ListItem::new(Line::from(note.as_str().to_string())))
        .collect();

    let notes_list = List::new(note_items)
        .block(Block::default().borders(Borders::ALL).title("Notes"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(notes_list, chunks[0], &mut app.list_state);

    // Document panel, with the command menu below it while open
    let menu = app
        .editor
        .as_ref()
        .map(|e| render::menu_lines(e.menu()))
        .unwrap_or_default();
    let menu_height = if menu.is_empty() {
        0
    } else {
        u16::try_from(menu.len() + 2).unwrap_or(u16::MAX)
    };
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(menu_height)])
        .split(chunks[1]);

    let title = match (app.field, app.mode) {
        (NoteField::Notes, Mode::Browse) => "Notes",
        (NoteField::Solution, Mode::Browse) => "Solution",
        (NoteField::Notes, Mode::Edit) => "Notes (editing)",
        (NoteField::Solution, Mode::Edit) => "Solution (editing)",
    };
    let content_text = match app.editor.as_ref() {
        Some(editor) => {
            let active = (app.mode == Mode::Edit).then(|| editor.active());
            render::document_lines(editor.document(), active)
        }
        None => vec![Line::from("Select a note to view its content")],
    };
    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(content, right[0]);

    if !menu.is_empty() {
        let menu_widget =
            Paragraph::new(menu).block(Block::default().borders(Borders::ALL).title("Commands"));
        f.render_widget(menu_widget, right[1]);
    }

    // Status and instructions
    let help = match (app.mode, app.link_prompt.as_ref()) {
        (_, Some(prompt)) => format!("Link URL: {}", prompt.url),
        (Mode::Browse, None) => {
            "q: Quit | ↑/k ↓/j: Select | Tab: Notes/Solution | Enter: Edit".to_string()
        }
        (Mode::Edit, None) => {
            "Esc: Done | Ctrl+B/I: Bold/Italic | Ctrl+K: Link | Ctrl+T: Check | Ctrl+S: Save"
                .to_string()
        }
    };
    let status = Paragraph::new(vec![
        Line::from(Span::styled(
            app.status.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(help),
    ]);
    f.render_widget(status, rows[1]);
}
