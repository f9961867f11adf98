// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::Date;
use time::macros::format_description;
use truecopy_app::{
    AppCommand, AppEvent, AppState, ApplicationCategory, ApplicationDetail, ApplicationForm,
    ApplicationId, CopyType, Focus, FormField, PendingSummary, ReceiptRegisterEntry,
    TrueCopyApplication, ViewKind, format_rupees, format_rupees_compact,
};

const VIEWS: [ViewKind; 3] = [ViewKind::Entry, ViewKind::Dispose, ViewKind::Receipts];
const PENDING_HEADERS: [&str; 7] = [
    "ID",
    "App Date",
    "Copy Type",
    "Category",
    "True Copy #",
    "Advance",
    "Receipt #",
];
const SUMMARY_HEADERS: [&str; 3] = ["Amount", "Application Count", "Total Rupees"];
const RECEIPT_HEADERS: [&str; 5] = ["Date", "Receipt #", "Category", "Amount", "True Copy #"];

/// Everything the screen needs from the register. The binary backs this with
/// the SQLite store; tests use an in-memory fake.
pub trait AppRuntime {
    fn today(&self) -> Date;
    fn load_pending(&mut self) -> Result<Vec<TrueCopyApplication>>;
    fn load_summary(&mut self) -> Result<PendingSummary>;
    fn load_receipts(&mut self) -> Result<Vec<ReceiptRegisterEntry>>;
    fn next_true_copy_number(
        &mut self,
        copy_type: CopyType,
        category: Option<ApplicationCategory>,
        year: i32,
    ) -> Result<String>;
    fn next_receipt_number(&mut self) -> Result<String>;
    fn load_application(&mut self, application_id: ApplicationId) -> Result<ApplicationDetail>;
    fn save_application(&mut self, form: &ApplicationForm) -> Result<ApplicationId>;
    fn dispose_application(&mut self, application_id: ApplicationId) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    pending: Vec<TrueCopyApplication>,
    summary: PendingSummary,
    receipts: Vec<ReceiptRegisterEntry>,
    pending_cursor: usize,
    dispose_cursor: usize,
    receipts_cursor: usize,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error:#}")));
    }
    prime_form_numbers(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Fills both generated fields of a fresh form.
fn prime_form_numbers<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    regenerate_true_copy_number(state, runtime, view_data, internal_tx);
    regenerate_receipt_number(state, runtime, view_data, internal_tx);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return handle_control_key(state, runtime, view_data, internal_tx, key.code);
    }

    match state.view {
        ViewKind::Entry => match state.focus {
            Focus::List => handle_list_key(state, runtime, view_data, internal_tx, key),
            Focus::Field(field) => {
                handle_form_key(state, runtime, view_data, internal_tx, field, key)
            }
        },
        ViewKind::Dispose => handle_dispose_key(state, runtime, view_data, internal_tx, key),
        ViewKind::Receipts => handle_receipts_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_control_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    code: KeyCode,
) -> bool {
    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('n') => {
            if state.view != ViewKind::Entry {
                dispatch_and_sync(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::OpenView(ViewKind::Entry),
                );
            }
            let today = runtime.today();
            dispatch_and_sync(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::NewEntry(today),
            );
            dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::FocusForm);
        }
        KeyCode::Char('s') => {
            if state.view == ViewKind::Entry {
                save_entry(state, runtime, view_data, internal_tx);
            } else {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "saving happens on the entry form -- press esc and retry",
                );
            }
        }
        KeyCode::Char('r') => match refresh_view_data(state, runtime, view_data) {
            Ok(()) => {
                regenerate_receipt_number(state, runtime, view_data, internal_tx);
                emit_status(state, view_data, internal_tx, "refreshed");
            }
            Err(error) => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("load failed: {error:#}"),
                );
            }
        },
        KeyCode::Char('d') => open_view(state, runtime, view_data, internal_tx, ViewKind::Dispose),
        KeyCode::Char('p') => {
            open_view(state, runtime, view_data, internal_tx, ViewKind::Receipts);
        }
        KeyCode::Char('l') => {
            if state.view == ViewKind::Entry {
                dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::FocusList);
            }
        }
        _ => {}
    }
    false
}

fn handle_list_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.pending_cursor = view_data.pending_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.pending_cursor =
                step_cursor(view_data.pending_cursor, view_data.pending.len());
        }
        KeyCode::Enter => load_selected_entry(state, runtime, view_data, internal_tx),
        KeyCode::Esc | KeyCode::Tab => {
            dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::FocusForm);
        }
        _ => {}
    }
    false
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: FormField,
    key: KeyEvent,
) -> bool {
    let command = match key.code {
        KeyCode::Esc => AppCommand::GoBack,
        KeyCode::Tab | KeyCode::Down => AppCommand::NextField,
        KeyCode::BackTab | KeyCode::Up => AppCommand::PrevField,
        KeyCode::Left => AppCommand::CycleChoice(-1),
        KeyCode::Right => AppCommand::CycleChoice(1),
        KeyCode::Backspace => AppCommand::Backspace,
        KeyCode::Enter => {
            save_entry(state, runtime, view_data, internal_tx);
            return false;
        }
        KeyCode::Char('+') if field == FormField::ApplicationDate => AppCommand::ShiftDate(1),
        KeyCode::Char('-') if field == FormField::ApplicationDate => AppCommand::ShiftDate(-1),
        KeyCode::Char(ch) => AppCommand::InsertChar(ch),
        _ => return false,
    };
    dispatch_and_sync(state, runtime, view_data, internal_tx, command)
}

fn handle_dispose_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Esc => {
            return dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::GoBack);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.dispose_cursor = view_data.dispose_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.dispose_cursor =
                step_cursor(view_data.dispose_cursor, view_data.pending.len());
        }
        KeyCode::Enter => dispose_selected(state, runtime, view_data, internal_tx),
        _ => {}
    }
    false
}

fn handle_receipts_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Esc => {
            return dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::GoBack);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.receipts_cursor = view_data.receipts_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.receipts_cursor =
                step_cursor(view_data.receipts_cursor, view_data.receipts.len());
        }
        _ => {}
    }
    false
}

/// Dispatches a command and reacts to its events. Returns true on quit.
fn dispatch_and_sync<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> bool {
    let events = state.dispatch(command);
    let mut quit = false;
    for event in events {
        match event {
            AppEvent::TrueCopyNumberStale => {
                regenerate_true_copy_number(state, runtime, view_data, internal_tx);
            }
            AppEvent::ReceiptNumberStale => {
                regenerate_receipt_number(state, runtime, view_data, internal_tx);
            }
            AppEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            AppEvent::QuitRequested => quit = true,
            AppEvent::ViewChanged(_)
            | AppEvent::FocusChanged(_)
            | AppEvent::FieldChanged(_)
            | AppEvent::EntryLoaded(_)
            | AppEvent::StatusCleared => {}
        }
    }
    quit
}

fn regenerate_true_copy_number<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let (Some(date), Some(copy_type)) = (state.form.application_date, state.form.copy_type) else {
        return;
    };
    let category = state.form.effective_category();
    match runtime.next_true_copy_number(copy_type, category, date.year()) {
        Ok(number) => {
            state.dispatch(AppCommand::SetTrueCopyNumber(number));
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("true copy # generation failed: {error:#}"),
        ),
    }
}

fn regenerate_receipt_number<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.next_receipt_number() {
        Ok(number) => {
            state.dispatch(AppCommand::SetReceiptNumber(number));
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("receipt # generation failed: {error:#}"),
        ),
    }
}

fn save_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.save_application(&state.form) {
        Ok(application_id) => {
            let number = state.form.true_copy_number.clone();
            if let Err(error) = refresh_view_data(state, runtime, view_data) {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("load failed: {error:#}"),
                );
            }
            let today = runtime.today();
            dispatch_and_sync(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::NewEntry(today),
            );
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("entry {application_id} created as {number}"),
            );
        }
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("save failed: {error:#}"),
            );
            regenerate_receipt_number(state, runtime, view_data, internal_tx);
        }
    }
}

fn load_selected_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(application_id) = view_data
        .pending
        .get(view_data.pending_cursor)
        .map(|application| application.id)
    else {
        emit_status(state, view_data, internal_tx, "no pending entries");
        return;
    };
    match runtime.load_application(application_id) {
        Ok(detail) => {
            let number = detail.application.true_copy_number.clone();
            dispatch_and_sync(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::LoadEntry(Box::new(detail)),
            );
            dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::FocusForm);
            emit_status(state, view_data, internal_tx, format!("loaded {number}"));
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("load failed: {error:#}"),
        ),
    }
}

fn dispose_selected<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some((application_id, number)) = view_data
        .pending
        .get(view_data.dispose_cursor)
        .map(|application| (application.id, application.true_copy_number.clone()))
    else {
        emit_status(state, view_data, internal_tx, "no pending entries to dispose");
        return;
    };
    match runtime.dispose_application(application_id) {
        Ok(()) => {
            if let Err(error) = refresh_view_data(state, runtime, view_data) {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("load failed: {error:#}"),
                );
                return;
            }
            emit_status(state, view_data, internal_tx, format!("disposed {number}"));
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("dispose failed: {error:#}"),
        ),
    }
}

fn open_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    view: ViewKind,
) {
    dispatch_and_sync(state, runtime, view_data, internal_tx, AppCommand::OpenView(view));
    match view {
        ViewKind::Dispose => view_data.dispose_cursor = 0,
        ViewKind::Receipts => view_data.receipts_cursor = 0,
        ViewKind::Entry => {}
    }
    if let Err(error) = refresh_view_data(state, runtime, view_data) {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("load failed: {error:#}"),
        );
    }
}

fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    view_data.pending = runtime.load_pending()?;
    view_data.summary = runtime.load_summary()?;
    if state.view == ViewKind::Receipts {
        view_data.receipts = runtime.load_receipts()?;
    }
    view_data.pending_cursor = clamp_cursor(view_data.pending_cursor, view_data.pending.len());
    view_data.dispose_cursor = clamp_cursor(view_data.dispose_cursor, view_data.pending.len());
    view_data.receipts_cursor =
        clamp_cursor(view_data.receipts_cursor, view_data.receipts.len());
    Ok(())
}

fn step_cursor(cursor: usize, len: usize) -> usize {
    clamp_cursor(cursor.saturating_add(1), len)
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = VIEWS
        .iter()
        .position(|view| *view == state.view)
        .unwrap_or(0);
    let titles = VIEWS
        .iter()
        .map(|view| view.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("truecopy").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.view {
        ViewKind::Entry => render_entry_view(frame, layout[1], state, view_data),
        ViewKind::Dispose => {
            let title = "dispose entry -- enter disposes the selected application";
            let cursor = Some(view_data.dispose_cursor);
            render_pending_table(frame, layout[1], title, view_data, cursor);
        }
        ViewKind::Receipts => render_receipts_table(frame, layout[1], view_data),
    }

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);
}

fn render_entry_view(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let cursor = (state.focus == Focus::List).then_some(view_data.pending_cursor);
    render_pending_table(frame, rows[0], "pending entries", view_data, cursor);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    render_form(frame, columns[0], state);
    render_summary(frame, columns[1], &view_data.summary);
}

fn render_pending_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    view_data: &ViewData,
    cursor: Option<usize>,
) {
    let header = header_row(&PENDING_HEADERS);
    let rows = view_data
        .pending
        .iter()
        .enumerate()
        .map(|(index, application)| {
            let style = if cursor == Some(index) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(pending_row_cells(application).map(Cell::from)).style(style)
        });
    let widths = [
        Constraint::Length(5),
        Constraint::Length(11),
        Constraint::Length(15),
        Constraint::Length(9),
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!("{title} ({})", view_data.pending.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn render_form(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState) {
    let rows = form_rows(state).into_iter().map(|(field, label, value)| {
        let focused = state.focus == Focus::Field(field);
        let disabled = field == FormField::Category && !state.form.category_enabled();
        let value_style = if focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new([
            Cell::from(label).style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from(value).style(value_style),
        ])
    });
    let title = match state.selected_entry_id {
        Some(id) => format!("entry details (viewing {id})"),
        None => "entry details".to_owned(),
    };
    let table = Table::new(rows, [Constraint::Length(18), Constraint::Min(10)])
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_summary(frame: &mut ratatui::Frame<'_>, area: Rect, summary: &PendingSummary) {
    let lines = summary_lines(summary);
    let last = lines.len().saturating_sub(1);
    let rows = lines.into_iter().enumerate().map(|(index, cells)| {
        let row = Row::new(cells.map(Cell::from));
        if index == last {
            row.style(Style::default().add_modifier(Modifier::BOLD))
        } else {
            row
        }
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Min(12),
        ],
    )
    .header(header_row(&SUMMARY_HEADERS))
    .column_spacing(1)
    .block(Block::default().title("pending summary").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_receipts_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let rows = view_data
        .receipts
        .iter()
        .enumerate()
        .map(|(index, receipt)| {
            let style = if index == view_data.receipts_cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(receipt_row_cells(receipt).map(Cell::from)).style(style)
        });
    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Min(12),
        ],
    )
    .header(header_row(&RECEIPT_HEADERS))
    .column_spacing(1)
    .block(
        Block::default()
            .title(format!("receipt register ({})", view_data.receipts.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn header_row<'a>(labels: &[&'a str]) -> Row<'a> {
    Row::new(labels.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }))
}

fn pending_row_cells(application: &TrueCopyApplication) -> [String; 7] {
    [
        application.id.to_string(),
        format_date(application.application_date),
        application.copy_type.as_str().to_owned(),
        application
            .category
            .map(|category| category.as_str().to_owned())
            .unwrap_or_default(),
        application.true_copy_number.clone(),
        format_rupees(application.advance_paise),
        application.receipt_number.clone(),
    ]
}

fn receipt_row_cells(receipt: &ReceiptRegisterEntry) -> [String; 5] {
    [
        format_date(receipt.receipt_date),
        receipt.receipt_number.clone(),
        receipt.payment_type.as_str().to_owned(),
        format_rupees(receipt.amount_paise),
        receipt.true_copy_number.clone(),
    ]
}

/// Summary table body followed by the Total row.
fn summary_lines(summary: &PendingSummary) -> Vec<[String; 3]> {
    let mut lines = summary
        .rows
        .iter()
        .map(|row| {
            [
                format_rupees_compact(row.amount_paise),
                row.application_count.to_string(),
                format_rupees_compact(row.total_paise),
            ]
        })
        .collect::<Vec<_>>();
    lines.push([
        "Total".to_owned(),
        summary.total_applications.to_string(),
        format_rupees_compact(summary.total_paise),
    ]);
    lines
}

fn form_rows(state: &AppState) -> Vec<(FormField, &'static str, String)> {
    let form = &state.form;
    FormField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                FormField::ApplicationDate => {
                    form.application_date.map(format_date).unwrap_or_default()
                }
                FormField::CopyType => form
                    .copy_type
                    .map(|copy_type| copy_type.as_str().to_owned())
                    .unwrap_or_default(),
                FormField::Category => {
                    if form.category_enabled() {
                        form.category
                            .map(|category| category.as_str().to_owned())
                            .unwrap_or_default()
                    } else {
                        "-".to_owned()
                    }
                }
                FormField::TrueCopyNumber => form.true_copy_number.clone(),
                FormField::Advance => form.advance.clone(),
                FormField::ReceiptNumber => form.receipt_number.clone(),
                FormField::PaymentType => form
                    .payment_type
                    .map(|payment_type| payment_type.as_str().to_owned())
                    .unwrap_or_default(),
            };
            let value = if state.focus == Focus::Field(*field) && field.is_choice() {
                format!("< {value} >")
            } else {
                value
            };
            (*field, field.label(), value)
        })
        .collect()
}

fn status_text(state: &AppState) -> String {
    let (badge, hints) = match (state.view, state.focus) {
        (ViewKind::Entry, Focus::Field(_)) => (
            "FORM",
            "tab/shift+tab field | ←/→ choose | +/- date | enter save | ctrl+n new | ctrl+l list | ctrl+d dispose | ctrl+p receipts | ctrl+r | esc quit",
        ),
        (ViewKind::Entry, Focus::List) => (
            "LIST",
            "↑/↓ select | enter load | esc form | ctrl+n new | ctrl+d dispose | ctrl+p receipts | ctrl+r",
        ),
        (ViewKind::Dispose, _) => ("DISPOSE", "↑/↓ select | enter dispose | esc back | ctrl+q"),
        (ViewKind::Receipts, _) => ("RECEIPTS", "↑/↓ scroll | esc back | ctrl+r | ctrl+q"),
    };
    match &state.status_line {
        Some(status) => format!("{badge} | {status} | {hints}"),
        None => format!("{badge} | {hints}"),
    }
}

fn format_date(value: Date) -> String {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "1970-01-01".to_owned())
}
