use std::{io, time::Duration};

use color_eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notelens_core::{
    model::{NoteTable, Quality},
    source::NoteSource,
    stats::{self, QualityCounts},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};

const EMPTY_KEY_MESSAGE: &str = "Please paste the encryption key to load the data.";
const TAB_TITLES: [&str; 4] = ["Overview", "Quality", "Stages", "Recruiters"];

/// Dashboard TUI. Starts on the unlock screen; a successful load swaps in
/// the dashboard wholesale. Esc quits from the unlock screen, `q` or Esc
/// from the dashboard.
pub fn launch(source: &dyn NoteSource) -> Result<()> {
    // Guard restores the terminal even if we early-return.
    let _guard = TerminalGuard::enter()?;
    let mut terminal = _guard.terminal()?;
    let mut app = App::new(source);

    loop {
        terminal.draw(|frame| draw(frame, &app))?;

        if event::poll(Duration::from_millis(150))? {
            if let Event::Key(key) = event::read()? {
                if !app.on_key(key.code) {
                    break;
                }
            }
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Screen {
    Unlock,
    Dashboard,
}

/// Aggregations computed once per successful load. Chart renderers only
/// ever see a fully built value, never a partial update.
struct Dashboard {
    note_count: usize,
    distribution: QualityCounts,
    stages: Vec<(&'static str, QualityCounts)>,
    recruiters: Vec<(String, QualityCounts)>,
}

impl Dashboard {
    fn build(table: &NoteTable) -> Self {
        Self {
            note_count: table.len(),
            distribution: stats::quality_distribution(table),
            stages: stats::quality_by_stage(table),
            recruiters: stats::quality_by_recruiter(table),
        }
    }
}

struct App<'a> {
    source: &'a dyn NoteSource,
    screen: Screen,
    key_input: String,
    error: Option<String>,
    dashboard: Option<Dashboard>,
    tab: usize,
}

impl<'a> App<'a> {
    fn new(source: &'a dyn NoteSource) -> Self {
        Self {
            source,
            screen: Screen::Unlock,
            key_input: String::new(),
            error: None,
            dashboard: None,
            tab: 0,
        }
    }

    /// Handle a key press; returns false when the app should exit.
    /// On the unlock screen every printable character belongs to the key,
    /// so only Esc quits there.
    fn on_key(&mut self, code: KeyCode) -> bool {
        match self.screen {
            Screen::Unlock => match code {
                KeyCode::Esc => return false,
                KeyCode::Enter => self.submit_key(),
                KeyCode::Backspace => {
                    self.key_input.pop();
                }
                KeyCode::Char(c) => self.key_input.push(c),
                _ => {}
            },
            Screen::Dashboard => match code {
                KeyCode::Char('q') | KeyCode::Esc => return false,
                KeyCode::Right | KeyCode::Tab => self.tab = (self.tab + 1) % TAB_TITLES.len(),
                KeyCode::Left | KeyCode::BackTab => {
                    self.tab = (self.tab + TAB_TITLES.len() - 1) % TAB_TITLES.len()
                }
                KeyCode::Char(c @ '1'..='4') => self.tab = (c as usize) - ('1' as usize),
                KeyCode::Char('u') => self.lock(),
                _ => {}
            },
        }
        true
    }

    fn submit_key(&mut self) {
        let key = self.key_input.trim();
        if key.is_empty() {
            self.error = Some(EMPTY_KEY_MESSAGE.to_string());
            return;
        }
        match self.source.load(key) {
            Ok(table) => {
                self.dashboard = Some(Dashboard::build(&table));
                self.screen = Screen::Dashboard;
                self.tab = 0;
                self.error = None;
                self.key_input.clear();
            }
            Err(err) => self.error = Some(format!("Failed to decrypt data: {err}")),
        }
    }

    fn lock(&mut self) {
        self.screen = Screen::Unlock;
        self.dashboard = None;
        self.key_input.clear();
        self.error = None;
    }
}

fn draw(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Unlock => draw_unlock(frame, app),
        Screen::Dashboard => draw_dashboard(frame, app),
    }
}

fn draw_unlock(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Notelens",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" — recruiter note quality, unlocked in the terminal"),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(
                "Security",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(header, chunks[0]);

    let masked: String = "*".repeat(app.key_input.chars().count());
    let input = Paragraph::new(masked).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Encryption key"),
    );
    frame.render_widget(input, chunks[1]);

    let status = match &app.error {
        Some(message) => Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true }),
        None => Paragraph::new("Press Enter to load the data, Esc to quit.")
            .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(
        status.block(Block::default().borders(Borders::ALL).title("Status")),
        chunks[2],
    );
}

fn draw_dashboard(frame: &mut Frame, app: &App) {
    let Some(dash) = app.dashboard.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let tabs = Tabs::new(TAB_TITLES)
        .select(app.tab)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("Notelens"));
    frame.render_widget(tabs, chunks[0]);

    match app.tab {
        0 => draw_overview(frame, chunks[1], dash),
        1 => draw_quality(frame, chunks[1], dash),
        2 => draw_stages(frame, chunks[1], dash),
        _ => draw_recruiters(frame, chunks[1], dash),
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::raw("Switch tabs with "),
        Span::styled("←/→", Style::default().fg(Color::Cyan)),
        Span::raw(" or "),
        Span::styled("1-4", Style::default().fg(Color::Cyan)),
        Span::raw(", re-enter the key with "),
        Span::styled("u", Style::default().fg(Color::Cyan)),
        Span::raw(", quit with "),
        Span::styled("q", Style::default().fg(Color::Cyan)),
        Span::raw("."),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Controls"));
    frame.render_widget(footer, chunks[2]);
}

fn draw_overview(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let mut lines = vec![
        Line::from(
            "Analysis of the quality of notes taken during the recruitment process \
             and of the data attributes extracted from them.",
        ),
        Line::from(
            "It shows how much depth and relevance the captured candidate information \
             has, to support informed hiring decisions.",
        ),
        Line::from(""),
        Line::from(format!("Notes loaded: {}", dash.note_count)),
        Line::from(format!("Recruiters: {}", dash.recruiters.len())),
    ];
    let mut summary = vec![Span::raw("Quality totals: ")];
    for quality in Quality::ORDERED {
        summary.push(Span::styled(
            format!("{} {}  ", quality.label(), dash.distribution.get(quality)),
            Style::default().fg(quality_color(quality)),
        ));
    }
    lines.push(Line::from(summary));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Overview"));
    frame.render_widget(body, area);
}

fn draw_quality(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(5)])
        .split(area);

    let bars = quality_bars(&dash.distribution);
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Distribution of note quality"),
        )
        .bar_width(9)
        .bar_gap(2)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, chunks[0]);

    let total = dash.distribution.total();
    let lines: Vec<Line> = Quality::ORDERED
        .iter()
        .map(|quality| {
            let count = dash.distribution.get(*quality);
            Line::from(Span::styled(
                format!("{:<6} {:>5}  ({})", quality.label(), count, percentage(count, total)),
                Style::default().fg(quality_color(*quality)),
            ))
        })
        .collect();
    let summary =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Share"));
    frame.render_widget(summary, chunks[1]);
}

fn draw_stages(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    if dash.stages.is_empty() {
        let empty = Paragraph::new("No action stages recorded in this dataset.").block(
            Block::default()
                .borders(Borders::ALL)
                .title("Quality across action stages"),
        );
        frame.render_widget(empty, area);
        return;
    }

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Quality across action stages"),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3);
    for (stage, counts) in &dash.stages {
        chart = chart.data(quality_group(stage, counts));
    }
    frame.render_widget(chart, area);
}

fn draw_recruiters(frame: &mut Frame, area: Rect, dash: &Dashboard) {
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Note quality per recruiter"),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3);
    for (recruiter, counts) in &dash.recruiters {
        chart = chart.data(quality_group(recruiter, counts));
    }
    frame.render_widget(chart, area);
}

fn quality_group(label: &str, counts: &QualityCounts) -> BarGroup<'static> {
    BarGroup::default()
        .label(Line::from(label.to_string()))
        .bars(&quality_bars(counts))
}

fn quality_bars(counts: &QualityCounts) -> Vec<Bar<'static>> {
    Quality::ORDERED
        .iter()
        .map(|quality| {
            Bar::default()
                .value(counts.get(*quality))
                .label(Line::from(quality.label()))
                .style(Style::default().fg(quality_color(*quality)))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(quality_color(*quality)),
                )
        })
        .collect()
}

fn quality_color(quality: Quality) -> Color {
    match quality {
        Quality::Good => Color::Green,
        Quality::Ok => Color::Yellow,
        Quality::Bad => Color::Red,
    }
}

fn percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors are logged but not propagated from Drop.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}
