use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::cell::{Cell, RefCell};
use std::io::stdout;
use std::time::{Duration as StdDuration, Instant};

use crate::api::ApiClient;
use crate::export;
use crate::filter::{self, FilterState};
use crate::models::{DraftMode, Job, JobDraft, JobStatus, JobType};
use crate::remind::{self, Badge, Notifier};
use crate::store::JobStore;
use crate::suggest;

const NOTICE_TTL: StdDuration = StdDuration::from_secs(5);

/// Queues reminders fired during a refresh so they surface in the notice
/// bar instead of being printed over the alternate screen. Permission is
/// granted once at dashboard mount.
struct PendingReminders {
    granted: Cell<bool>,
    queued: RefCell<Vec<String>>,
}

impl PendingReminders {
    fn new() -> Self {
        Self {
            granted: Cell::new(false),
            queued: RefCell::new(Vec::new()),
        }
    }
}

impl Notifier for PendingReminders {
    fn request_permission(&self) {
        self.granted.set(true);
    }

    fn is_granted(&self) -> bool {
        self.granted.get()
    }

    fn show(&self, title: &str, body: &str) {
        self.queued.borrow_mut().push(format!("{title}: {body}"));
    }
}

/// Add/edit form. Text fields are edited in place; status and job type
/// cycle with the arrow keys.
struct JobForm {
    mode: DraftMode,
    company: String,
    position: String,
    status: JobStatus,
    job_type: JobType,
    interview_date: String,
    field: usize,
    error: Option<String>,
}

const FORM_FIELDS: usize = 5;

impl JobForm {
    fn creating() -> Self {
        Self {
            mode: DraftMode::Creating,
            company: String::new(),
            position: String::new(),
            status: JobStatus::default(),
            job_type: JobType::default(),
            interview_date: String::new(),
            field: 0,
            error: None,
        }
    }

    fn editing(job: &Job) -> Self {
        Self {
            mode: DraftMode::Editing(job.id.clone()),
            company: job.company.clone(),
            position: job.position.clone(),
            status: job.status,
            job_type: job.job_type,
            interview_date: job
                .interview_date
                .map(|d| d.date_naive().to_string())
                .unwrap_or_default(),
            field: 0,
            error: None,
        }
    }

    fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            0 => Some(&mut self.company),
            1 => Some(&mut self.position),
            4 => Some(&mut self.interview_date),
            _ => None,
        }
    }

    fn cycle(&mut self, dir: i32) {
        match self.field {
            2 => self.status = step(&JobStatus::ALL, self.status, dir),
            3 => self.job_type = step(&JobType::ALL, self.job_type, dir),
            _ => {}
        }
    }

    fn draft(&self) -> Result<JobDraft> {
        let company = self.company.trim();
        let position = self.position.trim();
        if company.is_empty() {
            bail!("Company is required");
        }
        if position.is_empty() {
            bail!("Position is required");
        }
        let date = self.interview_date.trim();
        let interview_date = if date.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .context("Interview date must be YYYY-MM-DD")?,
            )
        };
        Ok(JobDraft {
            company: company.to_string(),
            position: position.to_string(),
            status: self.status,
            job_type: self.job_type,
            interview_date,
        })
    }
}

fn step<T: Copy + PartialEq>(all: &[T], current: T, dir: i32) -> T {
    let idx = all.iter().position(|t| *t == current).unwrap_or(0) as i32;
    let len = all.len() as i32;
    all[(idx + dir).rem_euclid(len) as usize]
}

enum Mode {
    Browse,
    Search,
    Form(JobForm),
    ConfirmDelete { id: String, label: String },
}

struct AppState {
    store: JobStore<ApiClient>,
    filter: FilterState,
    selected: usize,
    mode: Mode,
    notice: Option<(String, Instant)>,
    user_name: Option<String>,
    reminders: PendingReminders,
}

impl AppState {
    fn new(store: JobStore<ApiClient>, user_name: Option<String>) -> Self {
        Self {
            store,
            filter: FilterState::default(),
            selected: 0,
            mode: Mode::Browse,
            notice: None,
            user_name,
            reminders: PendingReminders::new(),
        }
    }

    fn page_len(&self) -> usize {
        filter::visible_jobs(self.store.jobs(), &self.filter).0.len()
    }

    fn selected_job(&self) -> Option<Job> {
        let (page, _) = filter::visible_jobs(self.store.jobs(), &self.filter);
        page.get(self.selected).map(|job| (*job).clone())
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.notice = Some((msg.into(), Instant::now()));
    }

    fn expire_notice(&mut self) {
        if let Some((_, since)) = &self.notice {
            if since.elapsed() > NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    /// Appends any reminders queued by the last refresh to the notice bar.
    fn drain_reminders(&mut self) {
        let queued: Vec<String> = self.reminders.queued.borrow_mut().drain(..).collect();
        if queued.is_empty() {
            return;
        }
        let text = queued.join(" | ");
        let combined = match self.notice.take() {
            Some((msg, _)) => format!("{msg} | {text}"),
            None => text,
        };
        self.notice = Some((combined, Instant::now()));
    }

    fn refresh_all(&mut self) {
        if let Err(err) = self.store.refresh_jobs(&self.reminders) {
            self.flash(format!("{err:#}"));
        } else if let Err(err) = self.store.refresh_stats() {
            self.flash(format!("{err:#}"));
        }
        self.drain_reminders();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.page_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Exports the filtered set (pre-pagination) to the fixed filename in
    /// the working directory.
    fn export_filtered(&mut self, pdf: bool) {
        let (count, result) = {
            let filtered = filter::filtered_jobs(self.store.jobs(), &self.filter);
            let result = if pdf {
                export::to_pdf(&filtered)
            } else {
                export::to_csv(&filtered)
            };
            (filtered.len(), result)
        };
        let filename = if pdf {
            export::REPORT_FILENAME
        } else {
            export::CSV_FILENAME
        };
        let written =
            result.and_then(|bytes| std::fs::write(filename, bytes).map_err(Into::into));
        match written {
            Ok(()) => self.flash(format!("Exported {count} jobs to {filename}")),
            Err(err) => self.flash(format!("{err:#}")),
        }
    }
}

pub fn run_dashboard(store: JobStore<ApiClient>, user_name: Option<String>) -> Result<()> {
    let mut state = AppState::new(store, user_name);
    state.reminders.request_permission();
    state.refresh_all();

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        state.expire_notice();
        list_state.select(Some(state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        // Short poll so stale notices clear without a keypress.
        if !event::poll(StdDuration::from_millis(200))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(state, key.code) {
                break;
            }
        }
    }
    Ok(())
}

/// Returns true when the dashboard should close.
fn handle_key(state: &mut AppState, code: KeyCode) -> bool {
    match std::mem::replace(&mut state.mode, Mode::Browse) {
        Mode::Browse => return handle_browse_key(state, code),
        Mode::Search => handle_search_key(state, code),
        Mode::Form(form) => handle_form_key(state, form, code),
        Mode::ConfirmDelete { id, label } => handle_confirm_key(state, id, label, code),
    }
    false
}

fn handle_browse_key(state: &mut AppState, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Down | KeyCode::Char('j') => {
            let len = state.page_len();
            if len > 0 && state.selected < len - 1 {
                state.selected += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Char('n') => {
            let (_, total_pages) = filter::visible_jobs(state.store.jobs(), &state.filter);
            state.filter.next_page(total_pages);
            state.selected = 0;
        }
        KeyCode::Left | KeyCode::Char('p') => {
            state.filter.prev_page();
            state.selected = 0;
        }
        KeyCode::Char('/') => state.mode = Mode::Search,
        KeyCode::Char('t') => {
            state.filter.set_job_type(next_type(state.filter.job_type));
            state.selected = 0;
        }
        KeyCode::Char('s') => {
            state.filter.set_status(next_status(state.filter.status));
            state.selected = 0;
        }
        KeyCode::Char('c') => {
            state.filter = FilterState::default();
            state.selected = 0;
        }
        KeyCode::Char('a') => state.mode = Mode::Form(JobForm::creating()),
        KeyCode::Char('e') => {
            if let Some(job) = state.selected_job() {
                state.mode = Mode::Form(JobForm::editing(&job));
            }
        }
        KeyCode::Char('d') => {
            if let Some(job) = state.selected_job() {
                state.mode = Mode::ConfirmDelete {
                    label: format!("{} at {}", job.position, job.company),
                    id: job.id,
                };
            }
        }
        KeyCode::Char('x') => state.export_filtered(false),
        KeyCode::Char('X') => state.export_filtered(true),
        KeyCode::Char('r') => state.refresh_all(),
        _ => {}
    }
    false
}

fn handle_search_key(state: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Esc => {}
        KeyCode::Backspace => {
            state.filter.search.pop();
            state.filter.page = 1;
            state.selected = 0;
            state.mode = Mode::Search;
        }
        KeyCode::Char(c) => {
            state.filter.search.push(c);
            state.filter.page = 1;
            state.selected = 0;
            state.mode = Mode::Search;
        }
        _ => state.mode = Mode::Search,
    }
}

fn handle_form_key(state: &mut AppState, mut form: JobForm, code: KeyCode) {
    match code {
        // Draft is destroyed on cancel.
        KeyCode::Esc => {}
        KeyCode::Enter => match form.draft() {
            Ok(draft) => {
                let result = match &form.mode {
                    DraftMode::Creating => state
                        .store
                        .create_job(&draft, &state.reminders)
                        .map(|_| "Job added"),
                    DraftMode::Editing(id) => state
                        .store
                        .update_job(id, &draft, &state.reminders)
                        .map(|_| "Job updated"),
                };
                match result {
                    Ok(msg) => {
                        state.flash(msg);
                        state.drain_reminders();
                        state.clamp_selection();
                    }
                    Err(err) => {
                        form.error = Some(format!("{err:#}"));
                        state.mode = Mode::Form(form);
                    }
                }
            }
            Err(err) => {
                form.error = Some(err.to_string());
                state.mode = Mode::Form(form);
            }
        },
        KeyCode::Tab | KeyCode::Down => {
            form.field = (form.field + 1) % FORM_FIELDS;
            state.mode = Mode::Form(form);
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.field = (form.field + FORM_FIELDS - 1) % FORM_FIELDS;
            state.mode = Mode::Form(form);
        }
        KeyCode::Left => {
            form.cycle(-1);
            state.mode = Mode::Form(form);
        }
        KeyCode::Right => {
            form.cycle(1);
            state.mode = Mode::Form(form);
        }
        KeyCode::Backspace => {
            if let Some(text) = form.active_text_mut() {
                text.pop();
            }
            state.mode = Mode::Form(form);
        }
        KeyCode::Char(c) => {
            if let Some(text) = form.active_text_mut() {
                text.push(c);
            }
            state.mode = Mode::Form(form);
        }
        _ => state.mode = Mode::Form(form),
    }
}

fn handle_confirm_key(state: &mut AppState, id: String, label: String, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('n') | KeyCode::Char('N') => {
            let confirmed = matches!(code, KeyCode::Char('y') | KeyCode::Char('Y'));
            match state.store.delete_job(&id, || confirmed, &state.reminders) {
                Ok(true) => {
                    state.flash("Job deleted");
                    state.drain_reminders();
                    state.clamp_selection();
                }
                Ok(false) => {}
                Err(err) => state.flash(format!("{err:#}")),
            }
        }
        KeyCode::Esc => {}
        _ => state.mode = Mode::ConfirmDelete { id, label },
    }
}

fn next_type(current: Option<JobType>) -> Option<JobType> {
    match current {
        None => Some(JobType::FullTime),
        Some(JobType::FullTime) => Some(JobType::PartTime),
        Some(JobType::PartTime) => Some(JobType::Internship),
        Some(JobType::Internship) => Some(JobType::Remote),
        Some(JobType::Remote) => None,
    }
}

fn next_status(current: Option<JobStatus>) -> Option<JobStatus> {
    match current {
        None => Some(JobStatus::Pending),
        Some(JobStatus::Pending) => Some(JobStatus::Interview),
        Some(JobStatus::Interview) => Some(JobStatus::Declined),
        Some(JobStatus::Declined) => Some(JobStatus::Accepted),
        Some(JobStatus::Accepted) => None,
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Header
    let name = state.user_name.as_deref().unwrap_or("guest");
    let header = Paragraph::new(format!(" Job Applications - Welcome, {name}"))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(chunks[1]);

    draw_job_list(frame, state, body[0], list_state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(body[1]);
    draw_stats(frame, state, right[0]);
    draw_suggestions(frame, state, right[1]);

    // Notice bar
    if let Some((msg, _)) = &state.notice {
        let notice =
            Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow));
        frame.render_widget(notice, chunks[2]);
    }

    let help = match &state.mode {
        Mode::Browse => {
            " j/k:select  n/p:page  /:search  t:type  s:status  c:clear  a:add  e:edit  \
             d:delete  x:csv  X:pdf  r:refresh  q:quit"
        }
        Mode::Search => " type to search by company  Enter/Esc:done",
        Mode::Form(_) => " Tab:next field  \u{2190}/\u{2192}:change value  Enter:save  Esc:cancel",
        Mode::ConfirmDelete { .. } => " y:delete  n:cancel",
    };
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);

    match &state.mode {
        Mode::Form(form) => draw_form(frame, form),
        Mode::ConfirmDelete { label, .. } => draw_confirm(frame, label),
        _ => {}
    }
}

fn draw_job_list(frame: &mut Frame, state: &AppState, area: Rect, list_state: &mut ListState) {
    let (page, total_pages) = filter::visible_jobs(state.store.jobs(), &state.filter);
    let now = Utc::now();

    let items: Vec<ListItem> = page
        .iter()
        .map(|job| {
            let status_icon = match job.status {
                JobStatus::Pending => " ",
                JobStatus::Interview => "*",
                JobStatus::Declined => "x",
                JobStatus::Accepted => "+",
            };
            let date = job
                .interview_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            let badge = match remind::badge_state(job, now) {
                Badge::Upcoming => "  [upcoming]",
                Badge::None => "",
            };
            ListItem::new(format!(
                "{} {} at {} | {} | {} | {}{}",
                status_icon,
                truncate(&job.position, 20),
                truncate(&job.company, 16),
                job.job_type,
                job.status,
                date,
                badge
            ))
        })
        .collect();

    let mut title = format!(" Jobs - page {}/{} ", state.filter.page, total_pages.max(1));
    if !state.filter.search.is_empty() || matches!(state.mode, Mode::Search) {
        title.push_str(&format!("- search: '{}' ", state.filter.search));
    }
    if let Some(job_type) = state.filter.job_type {
        title.push_str(&format!("- type: {job_type} "));
    }
    if let Some(status) = state.filter.status {
        title.push_str(&format!("- status: {status} "));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn draw_stats(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Application Summary ");

    match state.store.stats() {
        Some(stats) => {
            let data: Vec<(&str, u64)> = JobStatus::ALL
                .iter()
                .map(|status| {
                    (
                        status.as_str(),
                        stats.get(status.as_str()).copied().unwrap_or(0),
                    )
                })
                .collect();
            let chart = BarChart::default()
                .block(block)
                .data(&data)
                .bar_width(9)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().add_modifier(Modifier::BOLD));
            frame.render_widget(chart, area);
        }
        None => {
            let placeholder = Paragraph::new("No stats loaded").block(block);
            frame.render_widget(placeholder, area);
        }
    }
}

fn draw_suggestions(frame: &mut Frame, state: &AppState, area: Rect) {
    let filtered = filter::filtered_jobs(state.store.jobs(), &state.filter);
    let tips = suggest::suggestions(&filtered);

    let width = (area.width as usize).saturating_sub(6).max(20);
    let mut lines: Vec<Line> = Vec::new();
    for tip in &tips {
        for (i, wrapped) in textwrap::fill(tip, width).lines().enumerate() {
            if i == 0 {
                lines.push(Line::from(format!("- {wrapped}")));
            } else {
                lines.push(Line::from(format!("  {wrapped}")));
            }
        }
    }

    let panel = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Suggestions "))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn draw_form(frame: &mut Frame, form: &JobForm) {
    let title = match form.mode {
        DraftMode::Creating => " Add New Job ",
        DraftMode::Editing(_) => " Update Job ",
    };

    let rows = [
        ("Company", form.company.as_str()),
        ("Position", form.position.as_str()),
        ("Status", form.status.as_str()),
        ("Job type", form.job_type.as_str()),
        ("Interview", form.interview_date.as_str()),
    ];

    let mut lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let marker = if i == form.field { "> " } else { "  " };
            let line = format!("{marker}{label:<10} {value}");
            if i == form.field {
                Line::from(Span::styled(line, Style::default().add_modifier(Modifier::BOLD)))
            } else {
                Line::from(line)
            }
        })
        .collect();
    if let Some(error) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let area = centered_rect(54, 10, frame.area());
    frame.render_widget(Clear, area);
    let popup = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(popup, area);
}

fn draw_confirm(frame: &mut Frame, label: &str) {
    let lines = vec![
        Line::from("Are you sure you want to delete this job?"),
        Line::from(Span::styled(
            label.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("[y] delete    [n] cancel"),
    ];

    let area = centered_rect(50, 6, frame.area());
    frame.render_widget(Clear, area);
    let popup = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Delete Job "),
    );
    frame.render_widget(popup, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

// Counts chars, not bytes, so multibyte names never split mid-character.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
