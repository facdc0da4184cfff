use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::error::TaskError;
use crate::models::{Operation, Outcome, Task, TaskId};
use crate::repo::{SortCriterion, TaskRepo};
use crate::store::Store;
use crate::utils::date::format_due;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

/// How the list is ordered on screen; never written back to the file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SortView {
    Stored,
    Sorted(SortCriterion),
}

impl SortView {
    fn next(self) -> Self {
        match self {
            SortView::Stored => SortView::Sorted(SortCriterion::ByDate),
            SortView::Sorted(SortCriterion::ByDate) => SortView::Sorted(SortCriterion::ByStatus),
            SortView::Sorted(SortCriterion::ByStatus) => SortView::Stored,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            SortView::Stored => "stored order",
            SortView::Sorted(criterion) => criterion.as_str(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditorField {
    Label,
    Due,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EditorState {
    /// `None` when adding a new task
    pub(crate) target: Option<TaskId>,
    pub(crate) field: EditorField,
    pub(crate) label: String,
    pub(crate) due: String,
}

impl EditorState {
    fn active_buffer(&mut self) -> &mut String {
        match self.field {
            EditorField::Label => &mut self.label,
            EditorField::Due => &mut self.due,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Normal,
    Filter,
    Editor(EditorState),
    ConfirmDelete(TaskId),
    Help,
}

pub struct AppState {
    store: Store,
    pub(crate) tasks: Vec<Task>,
    pub(crate) filter: String,
    pub(crate) sort_view: SortView,
    pub(crate) selected: usize,
    pub(crate) mode: Mode,
    pub(crate) status: Option<(StatusKind, String)>,
    /// Set when the initial load failed; mutations would overwrite the file
    pub(crate) read_only: bool,
}

impl AppState {
    /// Build the UI state from the first load of the store
    pub fn new(store: Store, initial: Result<Vec<Task>, TaskError>) -> Self {
        let (tasks, status, read_only) = match initial {
            Ok(tasks) => (tasks, None, false),
            Err(err) => (
                Vec::new(),
                Some((StatusKind::Error, format!("Error loading tasks: {err}"))),
                true,
            ),
        };
        Self {
            store,
            tasks,
            filter: String::new(),
            sort_view: SortView::Stored,
            selected: 0,
            mode: Mode::Normal,
            status,
            read_only,
        }
    }

    /// Tasks as displayed: filtered by the search keyword, then sorted
    pub(crate) fn visible(&self) -> Vec<Task> {
        let found = TaskRepo::search(&self.tasks, &self.filter);
        match self.sort_view {
            SortView::Stored => found,
            SortView::Sorted(criterion) => TaskRepo::sort(&found, criterion),
        }
    }

    pub(crate) fn selected_task(&self) -> Option<Task> {
        self.visible().into_iter().nth(self.selected)
    }

    /// Handle a key press; returns true when the UI should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.mode.clone() {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::Help => self.mode = Mode::Normal,
            Mode::Filter => self.handle_filter_key(key),
            Mode::Editor(editor) => self.handle_editor_key(editor, key),
            Mode::ConfirmDelete(id) => self.handle_confirm_key(id, key),
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.visible().len().saturating_sub(1);
            }
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('a') => {
                self.mode = Mode::Editor(EditorState {
                    target: None,
                    field: EditorField::Label,
                    label: String::new(),
                    due: String::new(),
                });
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_task() {
                    self.mode = Mode::Editor(EditorState {
                        target: Some(task.id),
                        field: EditorField::Label,
                        label: task.label,
                        due: format_due(task.due),
                    });
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    self.mode = Mode::ConfirmDelete(task.id);
                }
            }
            KeyCode::Char('/') => self.mode = Mode::Filter,
            KeyCode::Char('s') => {
                self.sort_view = self.sort_view.next();
                self.set_status(StatusKind::Info, format!("Sorted by {}", self.sort_view.label()));
            }
            KeyCode::Char('?') => self.mode = Mode::Help,
            _ => {}
        }
        false
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                self.filter.pop();
            }
            KeyCode::Char(c) => self.filter.push(c),
            _ => {}
        }
        self.clamp_selection();
    }

    fn handle_editor_key(&mut self, mut editor: EditorState, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                editor.field = match editor.field {
                    EditorField::Label => EditorField::Due,
                    EditorField::Due => EditorField::Label,
                };
            }
            KeyCode::Enter if editor.field == EditorField::Label => editor.field = EditorField::Due,
            KeyCode::Enter => {
                self.submit_editor(editor);
                return;
            }
            KeyCode::Backspace => {
                editor.active_buffer().pop();
            }
            KeyCode::Char(c) => editor.active_buffer().push(c),
            _ => {}
        }
        self.mode = Mode::Editor(editor);
    }

    fn submit_editor(&mut self, editor: EditorState) {
        let operation = match editor.target {
            None => Operation::add(editor.label.clone(), &editor.due),
            Some(id) => Operation::edit(id, editor.label.clone(), &editor.due),
        };
        match operation {
            Ok(operation) => {
                if self.apply(operation) {
                    self.mode = Mode::Normal;
                } else {
                    // Keep the input so the user can fix it
                    self.mode = Mode::Editor(editor);
                }
            }
            Err(err) => {
                self.set_status(StatusKind::Error, err.to_string());
                self.mode = Mode::Editor(EditorState {
                    field: EditorField::Due,
                    ..editor
                });
            }
        }
    }

    fn handle_confirm_key(&mut self, id: TaskId, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            self.apply(Operation::Delete { ids: vec![id] });
        } else {
            self.set_status(StatusKind::Info, "Cancelled.".to_string());
        }
        self.mode = Mode::Normal;
        self.clamp_selection();
    }

    fn toggle_selected(&mut self) {
        if let Some(task) = self.selected_task() {
            let ids = vec![task.id];
            let operation = if task.done {
                Operation::Unmark { ids }
            } else {
                Operation::Mark { ids }
            };
            self.apply(operation);
        }
    }

    /// Apply a mutation to a copy of the snapshot and save it
    ///
    /// The on-screen snapshot only changes once the save succeeded.
    pub(crate) fn apply(&mut self, operation: Operation) -> bool {
        if self.read_only {
            self.set_status(
                StatusKind::Error,
                "Task file could not be loaded; changes are disabled".to_string(),
            );
            return false;
        }

        let mut next = self.tasks.clone();
        let outcome = match operation.apply(&mut next) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.set_status(StatusKind::Error, err.to_string());
                return false;
            }
        };
        if let Err(err) = self.store.save(&next) {
            self.set_status(StatusKind::Error, err.to_string());
            return false;
        }

        self.tasks = next;
        let message = describe(&outcome);
        debug!("{}", message);
        match outcome.first_missing_error() {
            Some(err) => self.set_status(StatusKind::Error, err.to_string()),
            None => self.set_status(StatusKind::Info, message),
        }
        if let Outcome::Added(task) = &outcome {
            self.select_id(task.id);
        }
        self.clamp_selection();
        true
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    fn select_id(&mut self, id: TaskId) {
        if let Some(index) = self.visible().iter().position(|t| t.id == id) {
            self.selected = index;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn set_status(&mut self, kind: StatusKind, message: String) {
        self.status = Some((kind, message));
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Added(task) => format!("Created task {}", task.id),
        Outcome::Edited(task) => format!("Modified task {}", task.id),
        Outcome::Marked(batch) => format!("Marked {} task(s) done", batch.affected.len()),
        Outcome::Unmarked(batch) => format!("Unmarked {} task(s)", batch.affected.len()),
        Outcome::Deleted(batch) => format!("Deleted {} task(s)", batch.affected.len()),
        Outcome::Listed(tasks) => format!("{} task(s)", tasks.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn seeded(dir: &TempDir) -> AppState {
        let store = Store::new(dir.path().join("tasks.txt"));
        let due = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let mut tasks = vec![
            Task::new(1, "Buy milk", due(3)),
            Task::new(2, "Walk dog", due(1)),
            Task::new(3, "Milk the cow", due(2)),
        ];
        tasks[1].done = true;
        store.save(&tasks).unwrap();
        let loaded = store.load();
        AppState::new(store, loaded)
    }

    fn visible_ids(app: &AppState) -> Vec<TaskId> {
        app.visible().iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_quit_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_toggle_saves_and_updates_view() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.tasks[0].done);
        assert!(app.store.load().unwrap()[0].done);

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(!app.tasks[0].done);
        assert!(!app.store.load().unwrap()[0].done);
    }

    #[test]
    fn test_add_through_editor() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Call mom");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "05-02-25");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Normal);
        let added = app.tasks.last().unwrap();
        assert_eq!(added.id, 4);
        assert_eq!(added.label, "Call mom");
        assert_eq!(app.selected_task().unwrap().id, 4);
        assert_eq!(app.store.load().unwrap(), app.tasks);
    }

    #[test]
    fn test_editor_keeps_input_on_bad_date() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Broken");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "99-99-99");
        app.handle_key(key(KeyCode::Enter));

        match &app.mode {
            Mode::Editor(editor) => {
                assert_eq!(editor.label, "Broken");
                assert_eq!(editor.due, "99-99-99");
            }
            other => panic!("expected editor, got {other:?}"),
        }
        assert!(matches!(app.status, Some((StatusKind::Error, _))));
        assert_eq!(app.tasks.len(), 3);
    }

    #[test]
    fn test_edit_prefills_selected_task() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char('e')));

        match &app.mode {
            Mode::Editor(editor) => {
                assert_eq!(editor.target, Some(2));
                assert_eq!(editor.label, "Walk dog");
                assert_eq!(editor.due, "01-01-2025");
            }
            other => panic!("expected editor, got {other:?}"),
        }

        type_text(&mut app, "!");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.tasks[1].label, "Walk dog!");
        assert!(app.tasks[1].done);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);

        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.tasks.len(), 3);

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.mode, Mode::ConfirmDelete(1));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(visible_ids(&app), vec![2, 3]);
        assert_eq!(app.store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_filter_and_sort_views() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);

        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "MILK");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(visible_ids(&app), vec![1, 3]);

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.sort_view, SortView::Sorted(SortCriterion::ByDate));
        assert_eq!(visible_ids(&app), vec![3, 1]);

        app.handle_key(key(KeyCode::Char('/')));
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(visible_ids(&app), vec![1, 3, 2]);

        // Sorting never touches the stored order
        assert_eq!(app.store.load().unwrap().iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_failed_save_keeps_snapshot() {
        let dir = TempDir::new().unwrap();
        // The parent of the backing file is a regular file, so saving cannot work
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let store = Store::new(blocker.join("tasks.txt"));
        let due = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let tasks = vec![Task::new(1, "Buy milk", due)];
        let mut app = AppState::new(store, Ok(tasks.clone()));

        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.tasks, tasks);
        assert!(matches!(app.status, Some((StatusKind::Error, _))));

        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.tasks, tasks);
        assert!(matches!(app.status, Some((StatusKind::Error, _))));
    }

    #[test]
    fn test_failed_load_disables_mutations() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("tasks.txt"));
        std::fs::write(store.path(), "garbage\n").unwrap();
        let loaded = store.load();
        let mut app = AppState::new(store, loaded);

        assert!(app.read_only);
        assert!(matches!(app.status, Some((StatusKind::Error, _))));

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "New");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "today");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.tasks.is_empty());
        assert_eq!(std::fs::read_to_string(app.store.path()).unwrap(), "garbage\n");
    }

    #[test]
    fn test_selection_is_clamped() {
        let dir = TempDir::new().unwrap();
        let mut app = seeded(&dir);
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.selected, 2);
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.selected, 0);
        app.handle_key(key(KeyCode::Char('G')));
        assert_eq!(app.selected, 2);
    }
}
