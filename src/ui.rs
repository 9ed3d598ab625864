use anyhow::Result;
use bmi_tracker::{
    gauge_percent, trend_series, Assessment, BmiRecord, Category, HeightUnit, HistoryStats,
    HistoryStore, Measurement, Severity, WeightUnit,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, Gauge, GraphType, Paragraph, Row, Table,
        TableState,
    },
    Frame, Terminal,
};
use std::io;
use tracing::{error, info};

/// Category lines drawn behind the trend
const THRESHOLDS: [f64; 3] = [18.5, 25.0, 30.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Calculator,
    History,
    Statistics,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Calculator => Page::History,
            Page::History => Page::Statistics,
            Page::Statistics => Page::Calculator,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Calculator => Page::Statistics,
            Page::History => Page::Calculator,
            Page::Statistics => Page::History,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Calculator => "Calculator",
            Page::History => "History",
            Page::Statistics => "Statistics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Weight,
    Height,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub weight: String,
    pub height: String,
    pub weight_unit: WeightUnit,
    pub height_unit: HeightUnit,
    pub focus: Field,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

pub struct App {
    pub store: HistoryStore,
    pub current_page: Page,
    pub form: Form,
    pub result: Option<Assessment>,
    pub message: Option<StatusMessage>,
    pub history_state: TableState,
    pub pending_clear: bool,
}

impl App {
    pub fn new(store: HistoryStore, weight_unit: WeightUnit, height_unit: HeightUnit) -> Self {
        let mut history_state = TableState::default();
        if !store.is_empty() {
            history_state.select(Some(store.len() - 1));
        }

        Self {
            store,
            current_page: Page::Calculator,
            form: Form {
                weight: String::new(),
                height: String::new(),
                weight_unit,
                height_unit,
                focus: Field::Weight,
            },
            result: None,
            message: None,
            history_state,
            pending_clear: false,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    // ------------------------------------------------------------------------
    // Calculator form
    // ------------------------------------------------------------------------

    fn focused_input(&mut self) -> &mut String {
        match self.form.focus {
            Field::Weight => &mut self.form.weight,
            Field::Height => &mut self.form.height,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || (c == '.' && !self.focused_input().contains('.')) {
            let input = self.focused_input();
            if input.len() < 8 {
                input.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        self.focused_input().pop();
    }

    pub fn toggle_focus(&mut self) {
        self.form.focus = match self.form.focus {
            Field::Weight => Field::Height,
            Field::Height => Field::Weight,
        };
    }

    pub fn toggle_unit(&mut self) {
        match self.form.focus {
            Field::Weight => self.form.weight_unit = self.form.weight_unit.toggle(),
            Field::Height => self.form.height_unit = self.form.height_unit.toggle(),
        }
    }

    /// Validate the form, show the result and append it to history
    pub fn calculate(&mut self) {
        let measurement = match Measurement::parse(
            &self.form.weight,
            self.form.weight_unit,
            &self.form.height,
            self.form.height_unit,
        ) {
            Ok(m) => m,
            Err(err) => {
                self.result = None;
                self.message = Some(StatusMessage::Error(format!(
                    "Please enter valid positive numbers for weight and height ({})",
                    err
                )));
                return;
            }
        };

        let record = BmiRecord::now(&measurement);
        self.result = Some(Assessment {
            bmi: record.bmi(),
            category: record.category(),
        });

        match self.store.append(record) {
            Ok(()) => {
                info!(records = self.store.len(), "calculation saved");
                self.history_state.select(Some(self.store.len() - 1));
                self.message = Some(StatusMessage::Info(format!(
                    "Saved to history ({} records)",
                    self.store.len()
                )));
            }
            Err(err) => {
                error!(error = %err, "failed to save calculation");
                self.message = Some(StatusMessage::Error(format!(
                    "Could not save history: {}",
                    err
                )));
            }
        }
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    pub fn request_clear(&mut self) {
        if self.store.is_empty() {
            self.message = Some(StatusMessage::Info("History is already empty".to_string()));
        } else {
            self.pending_clear = true;
        }
    }

    pub fn confirm_clear(&mut self) {
        self.pending_clear = false;
        match self.store.clear() {
            Ok(()) => {
                self.history_state.select(None);
                self.message = Some(StatusMessage::Info("History cleared successfully".to_string()));
            }
            Err(err) => {
                error!(error = %err, "failed to clear history");
                self.message = Some(StatusMessage::Error(format!(
                    "Could not clear history: {}",
                    err
                )));
            }
        }
    }

    pub fn cancel_clear(&mut self) {
        self.pending_clear = false;
    }

    pub fn selected_record(&self) -> Option<&BmiRecord> {
        self.history_state
            .selected()
            .and_then(|i| self.store.records().get(i))
    }

    pub fn next(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.history_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.history_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.history_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.history_state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = self.history_state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.history_state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.store.is_empty() {
            return;
        }
        let i = self.history_state.selected().map_or(0, |i| i.saturating_sub(20));
        self.history_state.select(Some(i));
    }

    pub fn stats(&self) -> Option<HistoryStats> {
        HistoryStats::from_records(self.store.records())
    }

    /// Apply one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        if self.pending_clear {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_clear(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.cancel_clear(),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            _ => match self.current_page {
                Page::Calculator => self.handle_calculator_key(key.code),
                Page::History => self.handle_history_key(key.code),
                Page::Statistics => {}
            },
        }
        false
    }

    fn handle_calculator_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') | KeyCode::Char('u') => self.toggle_unit(),
            KeyCode::Char(c) => self.input_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            KeyCode::Enter => self.calculate(),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home if !self.store.is_empty() => self.history_state.select(Some(0)),
            KeyCode::End if !self.store.is_empty() => {
                self.history_state.select(Some(self.store.len() - 1))
            }
            KeyCode::Char('x') => self.request_clear(),
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "ui loop failed");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Calculator => render_calculator(f, chunks[1], app),
        Page::History => render_history(f, chunks[1], app),
        Page::Statistics => render_statistics(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Healthy => Color::Green,
        Severity::Caution => Color::Yellow,
        Severity::Warning => Color::LightRed,
        Severity::Critical => Color::Red,
    }
}

fn category_color(category: Category) -> Color {
    severity_color(category.severity())
}

fn key_hint(key: &'static str) -> Span<'static> {
    Span::styled(key, Style::default().fg(Color::Yellow))
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Calculator, Page::History, Page::Statistics];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Records: {}", app.store.len()),
        Style::default().fg(Color::White),
    ));

    if let Some(latest) = app.store.latest() {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("Latest: {:.1} {}", latest.bmi(), latest.category()),
            Style::default().fg(category_color(latest.category())),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" BMI Tracker "),
    );

    f.render_widget(header, area);
}

// ============================================================================
// CALCULATOR PAGE
// ============================================================================

fn render_calculator(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_form(f, columns[0], app);
    render_result(f, columns[1], app);
    render_recommendations(f, rows[1], app);
}

fn unit_spans(options: [&'static str; 2], selected: usize) -> Vec<Span<'static>> {
    options
        .iter()
        .enumerate()
        .flat_map(|(i, name)| {
            let style = if i == selected {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let marker = if i == selected { "(•) " } else { "( ) " };
            vec![Span::styled(format!("{}{}", marker, name), style), Span::raw("  ")]
        })
        .collect()
}

fn input_line(
    name: &'static str,
    value: &str,
    focused: bool,
    units: Vec<Span<'static>>,
) -> Line<'static> {
    let cursor = if focused { "▏" } else { " " };
    let style = if focused {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::raw(if focused { "→ " } else { "  " }),
        label(name),
        Span::styled(format!(" {:<8}{}", value, cursor), style),
        Span::raw("  "),
    ];
    spans.extend(units);
    Line::from(spans)
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let weight_selected = match app.form.weight_unit {
        WeightUnit::Kg => 0,
        WeightUnit::Lbs => 1,
    };
    let height_selected = match app.form.height_unit {
        HeightUnit::Cm => 0,
        HeightUnit::Inches => 1,
    };

    let content = vec![
        Line::from(""),
        input_line(
            "Weight:",
            &app.form.weight,
            app.form.focus == Field::Weight,
            unit_spans(["kg", "lbs"], weight_selected),
        ),
        Line::from(""),
        input_line(
            "Height:",
            &app.form.height,
            app.form.focus == Field::Height,
            unit_spans(["cm", "inches"], height_selected),
        ),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            key_hint("Enter"),
            Span::styled(" Calculate BMI", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Personal Information "),
    );

    f.render_widget(form, area);
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Results ");

    let assessment = match app.result {
        Some(a) => a,
        None => {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  Enter weight and height, then press Enter",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )),
            ])
            .block(block);
            f.render_widget(empty, area);
            return;
        }
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(3)])
        .split(inner);

    let color = category_color(assessment.category);
    let summary = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            label("  BMI: "),
            Span::styled(
                format!("{:.1}", assessment.bmi),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            label("  Category: "),
            Span::styled(
                assessment.category.label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ]);
    f.render_widget(summary, parts[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(gauge_percent(assessment.bmi))
        .label(format!("{:.1} / 50", assessment.bmi));
    f.render_widget(gauge, parts[1]);
}

fn render_recommendations(f: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![Line::from("")];

    match app.result {
        Some(assessment) => {
            let color = category_color(assessment.category);
            for rec in assessment.category.recommendations() {
                content.push(Line::from(Span::styled(
                    format!("  • {}", rec),
                    Style::default().fg(color),
                )));
            }
        }
        None => content.push(Line::from(Span::styled(
            "  No calculation yet",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))),
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Health Recommendations "),
    );

    f.render_widget(panel, area);
}

// ============================================================================
// HISTORY PAGE
// ============================================================================

fn render_history(f: &mut Frame, area: Rect, app: &mut App) {
    if app.store.is_empty() {
        render_no_data(f, area, " BMI History ");
        return;
    }

    let header_cells = ["Date", "Weight", "Height", "BMI", "Category"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.store.records().iter().map(|record| {
        let color = category_color(record.category());

        let cells = vec![
            Cell::from(record.display_timestamp()),
            Cell::from(record.display_weight()),
            Cell::from(record.display_height()),
            Cell::from(format!("{:.1}", record.bmi())).style(Style::default().fg(color)),
            Cell::from(record.category().label()).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let title = match app.selected_record() {
        Some(record) => format!(
            " BMI History · {} ({} range) ",
            record.display_timestamp(),
            record.category().band().label()
        ),
        None => " BMI History ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.history_state);
}

fn render_no_data(f: &mut Frame, area: Rect, title: &'static str) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "  No data available",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );
    f.render_widget(paragraph, area);
}

// ============================================================================
// STATISTICS PAGE
// ============================================================================

fn render_statistics(f: &mut Frame, area: Rect, app: &App) {
    let stats = match app.stats() {
        Some(stats) => stats,
        None => {
            render_no_data(f, area, " BMI Statistics ");
            return;
        }
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(0)])
        .split(area);

    render_summary(f, columns[0], &stats);
    render_trend(f, columns[1], app.store.records());
}

fn render_summary(f: &mut Frame, area: Rect, stats: &HistoryStats) {
    let change_color = if stats.change > 0.0 {
        Color::Red
    } else if stats.change < 0.0 {
        Color::Green
    } else {
        Color::White
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("  Average BMI:   "), Span::raw(format!("{:.1}", stats.average))]),
        Line::from(vec![label("  Lowest BMI:    "), Span::raw(format!("{:.1}", stats.min))]),
        Line::from(vec![label("  Highest BMI:   "), Span::raw(format!("{:.1}", stats.max))]),
        Line::from(vec![label("  Total Records: "), Span::raw(stats.count.to_string())]),
        Line::from(vec![
            label("  Change:        "),
            Span::styled(format!("{:+.1}", stats.change), Style::default().fg(change_color)),
        ]),
    ];

    if let Some(category) = stats.dominant_category() {
        content.push(Line::from(vec![
            label("  Most common:   "),
            Span::styled(category.label(), Style::default().fg(category_color(category))),
        ]));
    }

    content.extend([
        Line::from(""),
        Line::from("  ──────────────────────────────"),
        Line::from(""),
    ]);

    for (category, count) in &stats.by_category {
        content.push(Line::from(vec![
            Span::styled(
                format!("  {:<20}", category.label()),
                Style::default().fg(category_color(*category)),
            ),
            Span::raw(format!("{:>4}", count)),
        ]));
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Summary "),
    );

    f.render_widget(panel, area);
}

fn render_trend(f: &mut Frame, area: Rect, records: &[BmiRecord]) {
    let points = trend_series(records);
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return;
    };

    let mut x_min = points.first().map_or(0.0, |p| p.0);
    let mut x_max = points.last().map_or(0.0, |p| p.0);
    if x_max <= x_min {
        x_min -= 43_200.0;
        x_max += 43_200.0;
    }

    let (y_lo, y_hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    let y_min = (y_lo - 2.0).floor().max(0.0);
    let y_max = (y_hi + 2.0).ceil();

    let threshold_lines: Vec<[(f64, f64); 2]> = THRESHOLDS
        .iter()
        .filter(|t| **t > y_min && **t < y_max)
        .map(|t| [(x_min, *t), (x_max, *t)])
        .collect();

    let mut datasets: Vec<Dataset> = threshold_lines
        .iter()
        .map(|line| {
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(line)
        })
        .collect();

    datasets.push(
        Dataset::default()
            .name("BMI")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points),
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" BMI Trend Over Time "),
        )
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(first.timestamp().format("%Y-%m-%d").to_string()),
                    Span::raw(last.timestamp().format("%Y-%m-%d").to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("BMI")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.0}", y_min)),
                    Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );

    f.render_widget(chart, area);
}

// ============================================================================
// STATUS BAR
// ============================================================================

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if app.pending_clear {
        status_spans.push(Span::styled(
            " Clear all history? ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(key_hint("y"));
        status_spans.push(Span::raw(" Yes | "));
        status_spans.push(key_hint("n"));
        status_spans.push(Span::raw(" No"));
    } else {
        match &app.message {
            Some(StatusMessage::Info(text)) => {
                status_spans.push(Span::styled(format!(" {} ", text), Style::default().fg(Color::Green)));
                status_spans.push(Span::raw("| "));
            }
            Some(StatusMessage::Error(text)) => {
                status_spans.push(Span::styled(format!(" {} ", text), Style::default().fg(Color::Red)));
                status_spans.push(Span::raw("| "));
            }
            None => {}
        }

        match app.current_page {
            Page::Calculator => {
                status_spans.push(key_hint("↑/↓"));
                status_spans.push(Span::raw(" Field | "));
                status_spans.push(key_hint("Space"));
                status_spans.push(Span::raw(" Unit | "));
                status_spans.push(key_hint("Enter"));
                status_spans.push(Span::raw(" Calculate | "));
            }
            Page::History => {
                let selected = app.history_state.selected().map(|i| i + 1).unwrap_or(0);
                status_spans.push(Span::styled(
                    format!("Row: {}/{} ", selected, app.store.len()),
                    Style::default().fg(Color::Cyan),
                ));
                status_spans.push(Span::raw("| "));
                status_spans.push(key_hint("↑/↓"));
                status_spans.push(Span::raw(" Nav | "));
                status_spans.push(key_hint("x"));
                status_spans.push(Span::raw(" Clear | "));
            }
            Page::Statistics => {}
        }

        status_spans.push(key_hint("Tab"));
        status_spans.push(Span::raw(" Page | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app(dir: &TempDir) -> App {
        let store = HistoryStore::open(dir.path().join("bmi_history.json"));
        App::new(store, WeightUnit::Kg, HeightUnit::Cm)
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Calculator.next(), Page::History);
        assert_eq!(Page::Statistics.next(), Page::Calculator);
        assert_eq!(Page::Calculator.previous(), Page::Statistics);
    }

    #[test]
    fn test_calculate_from_keys_saves_record() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "70");
        press(&mut app, KeyCode::Down);
        type_text(&mut app, "175");
        press(&mut app, KeyCode::Enter);

        let result = app.result.unwrap();
        assert_eq!(result.bmi, 22.86);
        assert_eq!(result.category, Category::Normal);
        assert_eq!(app.store.len(), 1);
        assert!(matches!(app.message, Some(StatusMessage::Info(_))));

        let reopened = HistoryStore::open(dir.path().join("bmi_history.json"));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_invalid_input_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "70");
        press(&mut app, KeyCode::Enter);

        assert!(app.result.is_none());
        assert!(app.store.is_empty());
        assert!(matches!(app.message, Some(StatusMessage::Error(_))));
    }

    #[test]
    fn test_form_editing() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "7a0.5.");
        assert_eq!(app.form.weight, "70.5");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.form.weight, "70.");

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.form.weight_unit, WeightUnit::Lbs);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.form.height_unit, HeightUnit::Inches);
    }

    #[test]
    fn test_imperial_form() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "154");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Down);
        type_text(&mut app, "69");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        let record = app.store.latest().unwrap();
        assert_eq!(record.weight_unit(), WeightUnit::Lbs);
        assert_eq!(record.height_unit(), HeightUnit::Inches);
        assert_eq!(record.category(), Category::Normal);
    }

    #[test]
    fn test_clear_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        type_text(&mut app, "70");
        press(&mut app, KeyCode::Down);
        type_text(&mut app, "175");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::History);

        press(&mut app, KeyCode::Char('x'));
        assert!(app.pending_clear);
        // Esc cancels instead of quitting
        assert!(!press(&mut app, KeyCode::Esc));
        assert!(!app.pending_clear);
        assert_eq!(app.store.len(), 1);

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.store.is_empty());
        assert!(app.selected_record().is_none());
    }

    #[test]
    fn test_history_navigation_wraps() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        for weight in ["60", "70", "80"] {
            app.form.weight = weight.to_string();
            app.form.height = "175".to_string();
            app.calculate();
        }
        app.current_page = Page::History;

        assert_eq!(app.history_state.selected(), Some(2));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.history_state.selected(), Some(0));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.history_state.selected(), Some(2));
        press(&mut app, KeyCode::Home);
        assert_eq!(app.selected_record().unwrap().weight(), 60.0);
    }

    #[test]
    fn test_navigation_on_empty_history_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.current_page = Page::History;

        for code in [KeyCode::Down, KeyCode::Up, KeyCode::PageDown, KeyCode::PageUp, KeyCode::Home] {
            press(&mut app, code);
            assert_eq!(app.history_state.selected(), None);
        }
        assert!(app.selected_record().is_none());
    }

    #[test]
    fn test_unrecordable_input_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.form.weight = "0.01".to_string();
        app.form.height = "500".to_string();
        app.calculate();

        assert!(app.result.is_none());
        assert!(matches!(app.message, Some(StatusMessage::Error(_))));
        assert!(app.store.is_empty());
    }

    #[test]
    fn test_quit_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_every_page_renders() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        for _ in 0..3 {
            terminal.draw(|f| ui(f, &mut app)).unwrap();
            app.next_page();
        }

        for weight in ["60", "75"] {
            app.form.weight = weight.to_string();
            app.form.height = "175".to_string();
            app.calculate();
        }
        for _ in 0..3 {
            terminal.draw(|f| ui(f, &mut app)).unwrap();
            app.next_page();
        }
    }
}
