use chrono::{Duration, NaiveDate, Utc};
use ratatui::widgets::TableState;

use crate::commands::Service;
use crate::dedup::parse_due_date;
use crate::models::{NewTask, Outcome, RecurringTaskDefinition, Task, TaskEdit, WeekendDay};
use crate::registrar::parse_day;
use crate::weekend::Weekend;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

pub enum ViewMode {
    Weekend,
    Definitions,
}

pub enum InputField {
    None,
    Title,
    Due,
    Order,
}

pub enum DisplayItem {
    Task(Task),
    DayHeader(WeekendDay, NaiveDate, usize), // day, date, count
}

/// State for the multi-step "Add" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub day: Option<WeekendDay>,
    pub step: usize, // 0: Title, 1: Day, 2: Recurring
}

pub struct App<'a> {
    service: &'a Service,
    pub weekend: Weekend,
    pub display_items: Vec<DisplayItem>,
    pub definitions: Vec<RecurringTaskDefinition>,
    pub state: TableState,
    pub definition_state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<u64>,
    pub add_state: AddState,
    pub show_completed: bool,
    /// Outcome of the last action, shown above the help line.
    pub status: Option<String>,
}

impl<'a> App<'a> {
    /// Creates a new App on the current target weekend.
    pub fn new(service: &'a Service) -> App<'a> {
        let mut app = App {
            service,
            weekend: service.target_weekend(Utc::now()),
            display_items: Vec::new(),
            definitions: Vec::new(),
            state: TableState::default(),
            definition_state: TableState::default(),
            view_mode: ViewMode::Weekend,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            show_completed: true,
            status: None,
        };
        app.reload();
        app
    }

    fn report<T>(&mut self, result: crate::Result<T>, ok: impl FnOnce(T) -> String) {
        self.status = Some(match result {
            Ok(v) => ok(v),
            Err(e) => format!("Error: {e}"),
        });
    }

    fn row_count(&self) -> usize {
        match self.view_mode {
            ViewMode::Weekend => self.display_items.len(),
            ViewMode::Definitions => self.definitions.len(),
        }
    }

    fn table_state(&mut self) -> &mut TableState {
        match self.view_mode {
            ViewMode::Weekend => &mut self.state,
            ViewMode::Definitions => &mut self.definition_state,
        }
    }

    /// Selects the next row in the current view.
    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous row in the current view.
    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn selected_task(&self) -> Option<&Task> {
        if let ViewMode::Definitions = self.view_mode {
            return None;
        }
        match self.state.selected().and_then(|i| self.display_items.get(i)) {
            Some(DisplayItem::Task(t)) => Some(t),
            _ => None,
        }
    }

    /// Day under the cursor: the header's day or the selected task's.
    fn selected_day(&self) -> Option<WeekendDay> {
        match self.state.selected().and_then(|i| self.display_items.get(i)) {
            Some(DisplayItem::DayHeader(day, _, _)) => Some(*day),
            Some(DisplayItem::Task(t)) => self.weekend.day_of(t.due_date),
            None => None,
        }
    }

    /// Marks the selected task done, or reopens it.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id) {
            let result = self.service.toggle_task(id, Utc::now());
            self.report(result, |t| {
                format!("'{}' {}", t.title, if t.is_done { "completed" } else { "reopened" })
            });
            self.reload();
        }
    }

    /// Deletes the selected task.
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id) {
            let result = self.service.remove_task(id);
            self.report(result, |t| format!("'{}' deleted", t.title));
            self.reload();
        }
    }

    /// Reloads the board and the definition list from storage.
    pub fn reload(&mut self) {
        self.display_items.clear();
        match self.service.board_for(self.weekend) {
            Ok(board) => {
                for day in WeekendDay::ALL {
                    let tasks: Vec<&Task> = board
                        .day(day)
                        .iter()
                        .filter(|t| self.show_completed || t.is_open())
                        .collect();
                    self.display_items
                        .push(DisplayItem::DayHeader(day, self.weekend.date_for(day), tasks.len()));
                    for t in tasks {
                        self.display_items.push(DisplayItem::Task(t.clone()));
                    }
                }
            }
            Err(e) => self.status = Some(format!("Error: {e}")),
        }

        match self.service.list_definitions() {
            Ok(defs) => self.definitions = defs,
            Err(e) => self.status = Some(format!("Error: {e}")),
        }

        clamp_selection(&mut self.state, self.display_items.len());
        clamp_selection(&mut self.definition_state, self.definitions.len());
    }

    pub fn toggle_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.reload();
    }

    /// Toggles between the weekend board and the weekly list.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Weekend => ViewMode::Definitions,
            ViewMode::Definitions => ViewMode::Weekend,
        };
    }

    /// Moves the board `weeks` weekends forward (negative for back).
    pub fn shift_weekend(&mut self, weeks: i64) {
        self.weekend = Weekend::starting(self.weekend.friday + Duration::weeks(weeks));
        self.reload();
    }

    pub fn reset_weekend(&mut self) {
        self.weekend = self.service.target_weekend(Utc::now());
        self.reload();
    }

    /// Runs the weekly generation for the target weekend.
    pub fn generate(&mut self) {
        let result = self.service.run_weekly_generation(Utc::now(), false);
        self.report(result, |r| {
            format!(
                "Generated: {} created, {} present, {} failed",
                r.created_count, r.duplicate_count, r.failed_count
            )
        });
        self.reload();
    }

    /// Initiates the "Add" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a field of the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        let Some(t) = self.selected_task() else { return };
        let (id, prefill) = match field {
            InputField::Title => (t.id, t.title.clone()),
            InputField::Due => (t.id, t.due_date.to_string()),
            InputField::Order => (t.id, t.display_order.to_string()),
            InputField::None => return,
        };
        self.target_id = Some(id);
        self.input_mode = InputMode::Editing;
        self.input_field = field;
        self.input_buffer = prefill;
    }

    /// Handles text input based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    fn handle_adding_input(&mut self) {
        match self.add_state.step {
            0 => {
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.title = self.input_buffer.clone();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => {
                let day = if self.input_buffer.trim().is_empty() {
                    Ok(self.selected_day().unwrap_or(WeekendDay::Friday))
                } else {
                    parse_day(&self.input_buffer)
                };
                match day {
                    Ok(day) => {
                        self.add_state.day = Some(day);
                        self.input_buffer.clear();
                        if let ViewMode::Definitions = self.view_mode {
                            self.finish_add_definition(day);
                        } else {
                            self.add_state.step += 1;
                        }
                    }
                    Err(e) => self.status = Some(format!("Error: {e}")),
                }
            }
            2 => {
                let recurring = matches!(self.input_buffer.trim().to_lowercase().as_str(), "y" | "yes");
                let day = self.add_state.day.unwrap_or(WeekendDay::Friday);
                let request = NewTask::new(self.add_state.title.clone(), self.weekend.date_for(day)).recurring(recurring);
                let result = self.service.submit(request, Utc::now());
                self.report(result, |s| {
                    let mut msg = match s.outcome {
                        Outcome::Created => format!("'{}' added", s.task.title),
                        Outcome::Duplicate => format!("'{}' already open", s.task.title),
                    };
                    if let Some(w) = s.warning {
                        msg.push_str(&format!(" (warning: {w})"));
                    }
                    msg
                });
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.reload();
            }
            _ => {}
        }
    }

    fn finish_add_definition(&mut self, day: WeekendDay) {
        let result = self.service.register_definition(&self.add_state.title, day);
        self.report(result, |d| format!("'{}' added to {} #{}", d.title, d.day_offset, d.order));
        self.input_mode = InputMode::Normal;
        self.reload();
    }

    fn handle_editing_input(&mut self) {
        if let Some(id) = self.target_id {
            let edit = match self.input_field {
                InputField::Title => Ok(TaskEdit { title: Some(self.input_buffer.clone()), ..TaskEdit::default() }),
                InputField::Due => parse_due_date(&self.input_buffer)
                    .map(|d| TaskEdit { due_date: Some(d), ..TaskEdit::default() }),
                InputField::Order => self
                    .input_buffer
                    .trim()
                    .parse::<i64>()
                    .map(|o| TaskEdit { display_order: Some(o), ..TaskEdit::default() })
                    .map_err(|e| crate::Error::validation(format!("order: {e}"))),
                InputField::None => return,
            };
            let result = edit.and_then(|edit| self.service.edit_task(id, edit));
            self.report(result, |t| format!("'{}' updated", t.title));
            self.input_mode = InputMode::Normal;
            self.input_buffer.clear();
            self.reload();
        }
    }
}

fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else if let Some(i) = state.selected() {
        if i >= len {
            state.select(Some(len - 1));
        }
    } else {
        state.select(Some(0));
    }
}
