//! UI state and key handling, free of any terminal I/O

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::child::ChildEvent;
use super::widgets::file_browser::is_spreadsheet_or_dir;
use super::widgets::{
    ChoiceField, FileBrowserAction, FileBrowserEvent, FileBrowserState, TextInputField,
};
use crate::config::DataDir;
use crate::office::Office;
use crate::spreadsheet::{
    ColumnSelection, Export, RunMetadata, Workbook, guess_cpf_column, guess_student_id_column,
    header_columns, read_workbook,
};

/// Column choice meaning "this column is not used"
pub const NO_COLUMN: &str = "(none)";

const LOG_CAPACITY: usize = 5000;
const PREVIEW_CELLS: usize = 6;

pub enum Msg {
    Key(KeyEvent),
    Child(ChildEvent),
}

/// What the event loop has to do after an update
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    SpawnDriver,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browse,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Sheet,
    HeaderRow,
    StudentIdColumn,
    CpfColumn,
    Attendant,
    Office,
    Email,
    Password,
    Run,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::Sheet,
        FormField::HeaderRow,
        FormField::StudentIdColumn,
        FormField::CpfColumn,
        FormField::Attendant,
        FormField::Office,
        FormField::Email,
        FormField::Password,
        FormField::Run,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Sheet => "Sheet",
            FormField::HeaderRow => "Header row",
            FormField::StudentIdColumn => "AlunoID column",
            FormField::CpfColumn => "CPF column",
            FormField::Attendant => "Attendant",
            FormField::Office => "Office",
            FormField::Email => "Sponte e-mail",
            FormField::Password => "Sponte password",
            FormField::Run => "Run",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

/// Export form for one loaded spreadsheet
pub struct Form {
    pub path: PathBuf,
    workbook: Workbook,
    pub sheet: ChoiceField,
    pub header_row: TextInputField,
    pub student_id_column: ChoiceField,
    pub cpf_column: ChoiceField,
    pub attendant: TextInputField,
    pub office: ChoiceField,
    pub email: TextInputField,
    pub password: TextInputField,
    pub focus: FormField,
}

impl Form {
    pub fn new(path: PathBuf, workbook: Workbook) -> Self {
        let mut header_row = TextInputField::new();
        header_row.set_value("1".into());

        let mut form = Self {
            path,
            sheet: ChoiceField::new(workbook.sheet_names()),
            workbook,
            header_row,
            student_id_column: ChoiceField::default(),
            cpf_column: ChoiceField::default(),
            attendant: TextInputField::new(),
            office: ChoiceField::new(Office::ALL.iter().map(|o| o.name().to_string()).collect()),
            email: TextInputField::new(),
            password: TextInputField::masked(),
            focus: FormField::Sheet,
        };
        form.refresh_columns();
        form
    }

    /// Zero-based index of the header row, `None` while the input isn't a positive number
    pub fn header_index(&self) -> Option<usize> {
        self.header_row
            .value()
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| n - 1)
    }

    fn rows(&self) -> &[Vec<String>] {
        self.sheet
            .value()
            .and_then(|name| self.workbook.sheet(name))
            .map(|sheet| sheet.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn columns(&self) -> Vec<String> {
        match self.header_index() {
            Some(idx) => header_columns(self.rows(), idx),
            None => Vec::new(),
        }
    }

    /// First cells of the header row, to check the right line was picked
    pub fn preview(&self) -> String {
        let Some(row) = self.header_index().and_then(|idx| self.rows().get(idx)) else {
            return String::new();
        };
        row.iter()
            .take(PREVIEW_CELLS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Reload the column choices from the header row and pre-select the guesses
    fn refresh_columns(&mut self) {
        let columns = self.columns();
        let options: Vec<String> = std::iter::once(NO_COLUMN.to_string())
            .chain(columns.iter().cloned())
            .collect();

        self.student_id_column = ChoiceField::new(options.clone());
        if let Some(guess) = guess_student_id_column(&columns) {
            self.student_id_column.select_value(&guess);
        }

        self.cpf_column = ChoiceField::new(options);
        if let Some(guess) = guess_cpf_column(&columns) {
            self.cpf_column.select_value(&guess);
        }
    }

    pub fn selection(&self) -> ColumnSelection {
        let chosen = |field: &ChoiceField| {
            field
                .value()
                .filter(|v| *v != NO_COLUMN)
                .map(str::to_string)
        };
        ColumnSelection {
            student_id_column: chosen(&self.student_id_column),
            cpf_column: chosen(&self.cpf_column),
        }
    }

    pub fn export(&self) -> Result<Export> {
        let Some(header_index) = self.header_index() else {
            bail!("Header row must be a number starting at 1");
        };
        if self.attendant.value().trim().is_empty() {
            bail!("Fill in the attendant");
        }

        let metadata = RunMetadata {
            attendant: self.attendant.value().to_string(),
            sheet: self.sheet.value().unwrap_or_default().to_string(),
            office: self.office.value().map(str::parse::<Office>).transpose()?,
            email: self.email.value().to_string(),
            password: self.password.value().to_string(),
        };

        self.selection().export(self.rows(), header_index, &metadata)
    }

    /// Route an editing key to the focused field
    fn handle_key(&mut self, key: KeyCode) {
        match self.focus {
            FormField::Sheet => {
                if self.sheet.handle_key(key) {
                    self.refresh_columns();
                }
            }
            FormField::HeaderRow => {
                if matches!(key, KeyCode::Char(c) if !c.is_ascii_digit()) {
                    return;
                }
                if self.header_row.handle_key(key) {
                    self.refresh_columns();
                }
            }
            FormField::StudentIdColumn => {
                self.student_id_column.handle_key(key);
            }
            FormField::CpfColumn => {
                self.cpf_column.handle_key(key);
            }
            FormField::Attendant => {
                self.attendant.handle_key(key);
            }
            FormField::Office => {
                self.office.handle_key(key);
            }
            FormField::Email => {
                self.email.handle_key(key);
            }
            FormField::Password => {
                self.password.handle_key(key);
            }
            FormField::Run => {}
        }
    }
}

/// Driver output, newest last. `scroll` counts lines up from the bottom.
#[derive(Default)]
pub struct LogPane {
    pub lines: Vec<String>,
    pub scroll: usize,
}

impl LogPane {
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
        if self.lines.len() > LOG_CAPACITY {
            let excess = self.lines.len() - LOG_CAPACITY;
            self.lines.drain(..excess);
        }
        if self.scroll > 0 {
            self.scroll = (self.scroll + 1).min(self.lines.len());
        }
    }

    pub fn scroll_up(&mut self, by: usize) {
        self.scroll = (self.scroll + by).min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, by: usize) {
        self.scroll = self.scroll.saturating_sub(by);
    }

    /// Lines visible in a pane of `height` rows
    pub fn visible(&self, height: usize) -> &[String] {
        let end = self.lines.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(height);
        &self.lines[start..end]
    }
}

pub struct State {
    pub data_dir: DataDir,
    pub screen: Screen,
    pub browser: FileBrowserState,
    pub form: Option<Form>,
    pub log: LogPane,
    pub running: bool,
    pub status: Option<Status>,
}

impl State {
    pub fn new(data_dir: DataDir, start_dir: PathBuf) -> Self {
        let mut browser = FileBrowserState::new(start_dir);
        browser.set_filter(is_spreadsheet_or_dir);

        let status = match browser.refresh() {
            Ok(()) => Some(Status::Info("Pick the spreadsheet to process".into())),
            Err(e) => Some(Status::Error(format!("{:#}", e))),
        };

        Self {
            data_dir,
            screen: Screen::Browse,
            browser,
            form: None,
            log: LogPane::default(),
            running: false,
            status,
        }
    }

    pub fn update(&mut self, msg: Msg) -> Effect {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Child(event) => {
                self.handle_child(event);
                Effect::None
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Effect {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Effect::Quit;
        }

        match self.screen {
            Screen::Browse => self.handle_browse_key(key.code),
            Screen::Form => self.handle_form_key(key.code),
        }
    }

    fn handle_browse_key(&mut self, key: KeyCode) -> Effect {
        let event = match key {
            KeyCode::Enter | KeyCode::Right => FileBrowserEvent::Activate,
            KeyCode::Backspace | KeyCode::Left => FileBrowserEvent::GoUp,
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.running {
                    self.status = Some(Status::Error(
                        "The driver is still running; Ctrl+C quits anyway".into(),
                    ));
                    return Effect::None;
                }
                return Effect::Quit;
            }
            KeyCode::Tab if self.form.is_some() => {
                self.screen = Screen::Form;
                return Effect::None;
            }
            other => {
                self.browser.handle_navigation_key(other);
                return Effect::None;
            }
        };

        match self.browser.handle_event(event) {
            Ok(Some(FileBrowserAction::FileSelected(path))) => self.open_spreadsheet(path),
            Ok(_) => {}
            Err(e) => self.status = Some(Status::Error(format!("{:#}", e))),
        }
        Effect::None
    }

    fn open_spreadsheet(&mut self, path: PathBuf) {
        match read_workbook(&path) {
            Ok(workbook) if workbook.sheets.is_empty() => {
                self.status = Some(Status::Error(format!("{} has no sheets", path.display())));
            }
            Ok(workbook) => {
                log::info!("Loaded {}", path.display());
                self.status = Some(Status::Info(format!("Loaded {}", path.display())));
                self.form = Some(Form::new(path, workbook));
                self.screen = Screen::Form;
            }
            Err(e) => {
                log::error!("{:#}", e);
                self.status = Some(Status::Error(format!("{:#}", e)));
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) -> Effect {
        let Some(form) = self.form.as_mut() else {
            self.screen = Screen::Browse;
            return Effect::None;
        };

        match key {
            KeyCode::Esc => self.screen = Screen::Browse,
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::PageUp => self.log.scroll_up(10),
            KeyCode::PageDown => self.log.scroll_down(10),
            KeyCode::F(5) => return self.start_run(),
            KeyCode::Enter if form.focus == FormField::Run => return self.start_run(),
            KeyCode::Enter => form.focus = form.focus.next(),
            other => form.handle_key(other),
        }
        Effect::None
    }

    fn start_run(&mut self) -> Effect {
        if self.running {
            self.status = Some(Status::Error("A run is already in progress".into()));
            return Effect::None;
        }
        let Some(form) = self.form.as_ref() else {
            return Effect::None;
        };

        match prepare_run(form, &self.data_dir) {
            Ok(summary) => {
                self.log.push(String::new());
                self.log.push(format!("=== {} ===", summary));
                self.log.scroll = 0;
                self.running = true;
                self.status = Some(Status::Info("Driver running...".into()));
                Effect::SpawnDriver
            }
            Err(e) => {
                log::warn!("Export refused: {:#}", e);
                self.status = Some(Status::Error(format!("{:#}", e)));
                Effect::None
            }
        }
    }

    fn handle_child(&mut self, event: ChildEvent) {
        match event {
            ChildEvent::Line(line) => {
                log::info!("[driver] {}", line);
                self.log.push(line);
            }
            ChildEvent::Exited(code) => {
                self.running = false;
                let message = match code {
                    Some(0) => "Driver finished".to_string(),
                    Some(code) => format!("Driver exited with code {}", code),
                    None => "Driver was terminated".to_string(),
                };
                log::info!("{}", message);
                self.log.push(format!("=== {} ===", message));
                self.status = Some(match code {
                    Some(0) => Status::Info(message),
                    _ => Status::Error(message),
                });
            }
            ChildEvent::SpawnFailed(error) => {
                self.running = false;
                let message = format!("Could not start the driver: {}", error);
                self.log.push(message.clone());
                self.status = Some(Status::Error(message));
            }
        }
    }
}

/// Export the form into the data directory, returns a one-line summary
fn prepare_run(form: &Form, data_dir: &DataDir) -> Result<String> {
    let export = form.export()?;
    if export.rows.is_empty() {
        bail!("Column '{}' has no identifiers", export.column);
    }
    export
        .persist(data_dir)
        .context("Failed to write the run files")?;

    Ok(format!(
        "{} {} identifier(s) from '{}'",
        export.rows.len(),
        export.kind,
        export.column
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::spreadsheet::reader::Sheet;

    fn workbook() -> Workbook {
        let rows = [
            vec!["Relatório de alunos", ""],
            vec!["Nome", "CPF"],
            vec!["Ana", "123.456.789-00"],
            vec!["Bia", "123.456.789-00"],
            vec!["Cid", ""],
        ];
        Workbook {
            sheets: vec![Sheet {
                name: "Planilha1".into(),
                rows: rows
                    .iter()
                    .map(|r| r.iter().map(|c| c.to_string()).collect())
                    .collect(),
            }],
        }
    }

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(state: &mut State, text: &str) {
        for c in text.chars() {
            state.update(key(KeyCode::Char(c)));
        }
    }

    fn focus(state: &mut State, field: FormField) {
        while state.form.as_ref().unwrap().focus != field {
            state.update(key(KeyCode::Tab));
        }
    }

    fn state_with_form(data_dir: &std::path::Path) -> State {
        let mut state = State::new(DataDir::at(data_dir), data_dir.to_path_buf());
        state.form = Some(Form::new(PathBuf::from("alunos.xlsx"), workbook()));
        state.screen = Screen::Form;
        state
    }

    #[test]
    fn test_header_row_drives_guesses() {
        let mut form = Form::new(PathBuf::from("alunos.xlsx"), workbook());
        assert_eq!(form.selection().cpf_column, None);

        form.focus = FormField::HeaderRow;
        form.handle_key(KeyCode::Backspace);
        form.handle_key(KeyCode::Char('x'));
        form.handle_key(KeyCode::Char('2'));

        assert_eq!(form.header_row.value(), "2");
        assert_eq!(form.preview(), "Nome | CPF");
        let selection = form.selection();
        assert_eq!(selection.cpf_column.as_deref(), Some("CPF"));
        assert_eq!(selection.student_id_column, None);
    }

    #[test]
    fn test_run_exports_and_spawns() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = state_with_form(tmp.path());

        focus(&mut state, FormField::HeaderRow);
        state.update(key(KeyCode::Backspace));
        type_text(&mut state, "2");
        focus(&mut state, FormField::Attendant);
        type_text(&mut state, "Leticia");
        focus(&mut state, FormField::Office);
        state.update(key(KeyCode::Right));

        assert_eq!(state.update(key(KeyCode::F(5))), Effect::SpawnDriver);
        assert!(state.running);

        let config = RunConfig::load(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config.cpf_column.as_deref(), Some("CPF"));
        assert_eq!(config.attendant.as_deref(), Some("Leticia"));
        assert_eq!(config.head_office.as_deref(), Some("Sul"));
        assert_eq!(config.sheet, "Planilha1");
        assert!(tmp.path().join("planilha_filtrada.xlsx").exists());

        // A second run is refused while the child is alive
        assert_eq!(state.update(key(KeyCode::F(5))), Effect::None);
        assert!(matches!(state.status, Some(Status::Error(_))));

        state.update(Msg::Child(ChildEvent::Line("Row 2: AlunoID 55".into())));
        state.update(Msg::Child(ChildEvent::Exited(Some(0))));
        assert!(!state.running);
        assert_eq!(state.log.lines.last().map(String::as_str), Some("=== Driver finished ==="));
    }

    #[test]
    fn test_run_without_column_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = state_with_form(tmp.path());
        focus(&mut state, FormField::Attendant);
        type_text(&mut state, "Leticia");

        assert_eq!(state.update(key(KeyCode::F(5))), Effect::None);
        assert!(!state.running);
        assert!(!tmp.path().join("config.json").exists());
    }

    #[test]
    fn test_spawn_failure_clears_running() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = state_with_form(tmp.path());
        state.running = true;

        state.update(Msg::Child(ChildEvent::SpawnFailed("not found".into())));
        assert!(!state.running);
        assert!(matches!(state.status, Some(Status::Error(ref m)) if m.contains("not found")));
    }

    #[test]
    fn test_log_scrolling() {
        let mut log = LogPane::default();
        for i in 0..10 {
            log.push(format!("line {}", i));
        }
        assert_eq!(log.visible(3), ["line 7", "line 8", "line 9"]);

        log.scroll_up(2);
        assert_eq!(log.visible(3), ["line 5", "line 6", "line 7"]);

        log.push("line 10".into());
        assert_eq!(log.visible(3), ["line 5", "line 6", "line 7"]);

        log.scroll_down(100);
        assert_eq!(log.visible(2), ["line 9", "line 10"]);
    }
}
