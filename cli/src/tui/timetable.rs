use crossterm::event::KeyCode;
use timetable_core::{class_for_slot, AttendanceStatus, Class, Slot};

/// What the user asked for. The controller turns each one into a single
/// gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    AddClass { slot: Slot, name: String },
    MarkAttendance { class_id: String, status: AttendanceStatus },
    DeleteClass { class_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    Add { slot: Slot },
    Detail { class_id: String },
    ConfirmDelete { class_id: String },
}

/// Ephemeral state of the grid and its dialogs. Nothing here is persisted.
pub struct Timetable {
    pub cursor: Slot,
    pub modal: Modal,
    pub input: String,
    pub cursor_position: usize,
}

impl Timetable {
    pub fn new() -> Self {
        Self {
            cursor: Slot::default(),
            modal: Modal::None,
            input: String::new(),
            cursor_position: 0,
        }
    }

    /// No dialog is open.
    pub fn is_idle(&self) -> bool {
        self.modal == Modal::None
    }

    pub fn handle_key(&mut self, code: KeyCode, classes: &[Class]) -> Option<Intent> {
        match self.modal.clone() {
            Modal::None => self.handle_grid_key(code, classes),
            Modal::Add { slot } => self.handle_add_key(code, slot),
            Modal::Detail { class_id } => {
                match code {
                    KeyCode::Char('d') | KeyCode::Delete => {
                        self.modal = Modal::ConfirmDelete { class_id };
                    }
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.close(),
                    _ => {}
                }
                None
            }
            Modal::ConfirmDelete { class_id } => match code {
                KeyCode::Char('y') => {
                    self.close();
                    Some(Intent::DeleteClass { class_id })
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.modal = Modal::Detail { class_id };
                    None
                }
                _ => None,
            },
        }
    }

    fn handle_grid_key(&mut self, code: KeyCode, classes: &[Class]) -> Option<Intent> {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.cursor = self.cursor.offset(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.cursor = self.cursor.offset(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.offset(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.cursor = self.cursor.offset(0, 1),
            KeyCode::Enter => self.open_cell(classes),
            KeyCode::Char('p') => return self.mark(classes, AttendanceStatus::Present),
            KeyCode::Char('x') => return self.mark(classes, AttendanceStatus::Absent),
            _ => {}
        }
        None
    }

    fn handle_add_key(&mut self, code: KeyCode, slot: Slot) -> Option<Intent> {
        match code {
            KeyCode::Enter => return self.submit_add(slot),
            KeyCode::Esc => self.close(),
            KeyCode::Char(c) => self.input_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            _ => {}
        }
        None
    }

    /// Occupied cells open the detail view, empty ones the add dialog.
    pub fn open_cell(&mut self, classes: &[Class]) {
        self.modal = match class_for_slot(classes, self.cursor) {
            Some(class) => Modal::Detail {
                class_id: class.id.clone(),
            },
            None => {
                self.input.clear();
                self.cursor_position = 0;
                Modal::Add { slot: self.cursor }
            }
        };
    }

    fn mark(&self, classes: &[Class], status: AttendanceStatus) -> Option<Intent> {
        class_for_slot(classes, self.cursor).map(|class| Intent::MarkAttendance {
            class_id: class.id.clone(),
            status,
        })
    }

    fn submit_add(&mut self, slot: Slot) -> Option<Intent> {
        let name = self.input.trim();
        if name.is_empty() {
            return None;
        }
        let intent = Intent::AddClass {
            slot,
            name: name.to_string(),
        };
        self.close();
        Some(intent)
    }

    /// Close whatever dialog is open and reset its state.
    pub fn close(&mut self) {
        self.modal = Modal::None;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Drop a detail or confirm dialog whose class is no longer in `classes`.
    pub fn sync(&mut self, classes: &[Class]) {
        let open_id = match &self.modal {
            Modal::Detail { class_id } | Modal::ConfirmDelete { class_id } => class_id,
            _ => return,
        };
        if !classes.iter().any(|c| &c.id == open_id) {
            self.close();
        }
    }

    pub fn selected_class<'a>(&self, classes: &'a [Class]) -> Option<&'a Class> {
        match &self.modal {
            Modal::Detail { class_id } | Modal::ConfirmDelete { class_id } => {
                classes.iter().find(|c| &c.id == class_id)
            }
            _ => None,
        }
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self
                .input
                .chars()
                .take(self.cursor_position - 1)
                .map(|c| c.len_utf8())
                .sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }
}

impl Default for Timetable {
    fn default() -> Self {
        Self::new()
    }
}
