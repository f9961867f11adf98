// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Duration};

use crate::{
    ApplicationCategory, ApplicationDetail, ApplicationForm, ApplicationId, CopyType, FormField,
    PaymentType, ViewKind, format_paise_plain,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Field(FormField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: ViewKind,
    pub focus: Focus,
    pub form: ApplicationForm,
    pub selected_entry_id: Option<ApplicationId>,
    pub status_line: Option<String>,
}

impl AppState {
    pub fn new(today: Date) -> Self {
        Self {
            view: ViewKind::Entry,
            focus: Focus::Field(FormField::ApplicationDate),
            form: ApplicationForm::blank(today),
            selected_entry_id: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    OpenView(ViewKind),
    GoBack,
    FocusList,
    FocusForm,
    NextField,
    PrevField,
    CycleChoice(isize),
    ShiftDate(i64),
    InsertChar(char),
    Backspace,
    NewEntry(Date),
    LoadEntry(Box<ApplicationDetail>),
    SetTrueCopyNumber(String),
    SetReceiptNumber(String),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    FocusChanged(Focus),
    FieldChanged(FormField),
    /// The true copy number on the form no longer matches its partition.
    TrueCopyNumberStale,
    ReceiptNumberStale,
    EntryLoaded(ApplicationId),
    QuitRequested,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::OpenView(view) => {
                self.view = view;
                vec![AppEvent::ViewChanged(view)]
            }
            AppCommand::GoBack => {
                if self.view == ViewKind::Entry {
                    return vec![AppEvent::QuitRequested];
                }
                self.view = ViewKind::Entry;
                vec![AppEvent::ViewChanged(self.view)]
            }
            AppCommand::FocusList => self.move_focus(Focus::List),
            AppCommand::FocusForm => match self.focus {
                Focus::List => self.move_focus(Focus::Field(FormField::ApplicationDate)),
                Focus::Field(_) => Vec::new(),
            },
            AppCommand::NextField => self.step_field(1),
            AppCommand::PrevField => self.step_field(-1),
            AppCommand::CycleChoice(delta) => self.cycle_choice(delta),
            AppCommand::ShiftDate(days) => self.shift_date(days),
            AppCommand::InsertChar(ch) => self.edit_text(|value| value.push(ch)),
            AppCommand::Backspace => self.edit_text(|value| {
                value.pop();
            }),
            AppCommand::NewEntry(today) => {
                self.form = ApplicationForm::blank(today);
                self.selected_entry_id = None;
                vec![
                    AppEvent::TrueCopyNumberStale,
                    AppEvent::ReceiptNumberStale,
                    self.set_status("new entry"),
                ]
            }
            AppCommand::LoadEntry(detail) => self.load_entry(*detail),
            AppCommand::SetTrueCopyNumber(value) => {
                self.form.true_copy_number = value;
                vec![AppEvent::FieldChanged(FormField::TrueCopyNumber)]
            }
            AppCommand::SetReceiptNumber(value) => {
                self.form.receipt_number = value;
                vec![AppEvent::FieldChanged(FormField::ReceiptNumber)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn move_focus(&mut self, focus: Focus) -> Vec<AppEvent> {
        let leaving_date = self.focus == Focus::Field(FormField::ApplicationDate);
        self.focus = focus;
        let mut events = vec![AppEvent::FocusChanged(focus)];
        if leaving_date && focus != Focus::Field(FormField::ApplicationDate) {
            events.push(AppEvent::TrueCopyNumberStale);
        }
        events
    }

    fn step_field(&mut self, delta: isize) -> Vec<AppEvent> {
        let Focus::Field(current) = self.focus else {
            return Vec::new();
        };
        let fields = FormField::ALL;
        let len = fields.len() as isize;
        let mut index = fields
            .iter()
            .position(|field| *field == current)
            .unwrap_or(0) as isize;
        loop {
            index = (index + delta).rem_euclid(len);
            let candidate = fields[index as usize];
            if candidate != FormField::Category || self.form.category_enabled() {
                return self.move_focus(Focus::Field(candidate));
            }
        }
    }

    fn cycle_choice(&mut self, delta: isize) -> Vec<AppEvent> {
        let Focus::Field(field) = self.focus else {
            return Vec::new();
        };
        match field {
            FormField::CopyType => {
                let next = rotate(&CopyType::ALL, self.form.copy_type, delta);
                self.form.copy_type = Some(next);
                self.form.category = if next.requires_category() {
                    Some(ApplicationCategory::Urgent)
                } else {
                    None
                };
                vec![
                    AppEvent::FieldChanged(FormField::CopyType),
                    AppEvent::TrueCopyNumberStale,
                ]
            }
            FormField::Category => {
                if !self.form.category_enabled() {
                    return vec![self.set_status("category applies to certified copies only")];
                }
                self.form.category = Some(rotate(
                    &ApplicationCategory::ALL,
                    self.form.category,
                    delta,
                ));
                vec![
                    AppEvent::FieldChanged(FormField::Category),
                    AppEvent::TrueCopyNumberStale,
                ]
            }
            FormField::PaymentType => {
                self.form.payment_type =
                    Some(rotate(&PaymentType::ALL, self.form.payment_type, delta));
                vec![AppEvent::FieldChanged(FormField::PaymentType)]
            }
            FormField::ApplicationDate => self.shift_date(delta as i64),
            FormField::TrueCopyNumber | FormField::Advance | FormField::ReceiptNumber => {
                Vec::new()
            }
        }
    }

    fn shift_date(&mut self, days: i64) -> Vec<AppEvent> {
        if self.focus != Focus::Field(FormField::ApplicationDate) {
            return Vec::new();
        }
        let Some(date) = self.form.application_date else {
            return Vec::new();
        };
        match date.checked_add(Duration::days(days)) {
            Some(shifted) => {
                self.form.application_date = Some(shifted);
                vec![AppEvent::FieldChanged(FormField::ApplicationDate)]
            }
            None => vec![self.set_status("date out of range")],
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) -> Vec<AppEvent> {
        let Focus::Field(field) = self.focus else {
            return Vec::new();
        };
        let value = match field {
            FormField::TrueCopyNumber => &mut self.form.true_copy_number,
            FormField::Advance => &mut self.form.advance,
            FormField::ReceiptNumber => &mut self.form.receipt_number,
            _ => return Vec::new(),
        };
        edit(value);
        vec![AppEvent::FieldChanged(field)]
    }

    fn load_entry(&mut self, detail: ApplicationDetail) -> Vec<AppEvent> {
        let application = detail.application;
        self.form = ApplicationForm {
            application_date: Some(application.application_date),
            copy_type: Some(application.copy_type),
            category: if application.copy_type.requires_category() {
                application.category
            } else {
                None
            },
            true_copy_number: application.true_copy_number,
            advance: format_paise_plain(application.advance_paise),
            receipt_number: application.receipt_number,
            payment_type: Some(detail.payment_type.unwrap_or(PaymentType::Advance)),
        };
        self.selected_entry_id = Some(application.id);
        vec![AppEvent::EntryLoaded(application.id)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

fn rotate<T: Copy + PartialEq>(options: &[T], current: Option<T>, delta: isize) -> T {
    let len = options.len() as isize;
    let next = match current.and_then(|value| options.iter().position(|option| *option == value))
    {
        Some(index) => (index as isize + delta).rem_euclid(len),
        None => 0,
    };
    options[next as usize]
}
