//! Directory listing used to pick the source spreadsheet

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;

use super::ListState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

pub enum FileBrowserEvent {
    /// Enter the highlighted directory or select the highlighted file
    Activate,
    /// Go to the parent directory
    GoUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBrowserAction {
    FileSelected(PathBuf),
    DirectoryEntered(PathBuf),
}

type EntryFilter = Box<dyn Fn(&FileEntry) -> bool + Send>;

pub struct FileBrowserState {
    current_path: PathBuf,
    entries: Vec<FileEntry>,
    list_state: ListState,
    filter: Option<EntryFilter>,
    viewport_height: usize,
}

impl FileBrowserState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            current_path: path,
            entries: Vec::new(),
            list_state: ListState::with_selection(),
            filter: None,
            viewport_height: 20,
        }
    }

    /// Only list entries accepted by `filter` (call `refresh` afterwards)
    pub fn set_filter(&mut self, filter: impl Fn(&FileEntry) -> bool + Send + 'static) {
        self.filter = Some(Box::new(filter));
    }

    /// Re-read the current directory: directories first, then files, each sorted by name.
    /// Hidden entries are skipped.
    pub fn refresh(&mut self) -> Result<()> {
        let read = std::fs::read_dir(&self.current_path)
            .with_context(|| format!("Failed to list {}", self.current_path.display()))?;

        let mut entries: Vec<FileEntry> = read
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    return None;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                Some(FileEntry {
                    name,
                    path: entry.path(),
                    is_dir,
                })
            })
            .filter(|entry| self.filter.as_ref().is_none_or(|f| f(entry)))
            .collect();

        entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        self.entries = entries;
        self.list_state.reset(self.entries.len());
        Ok(())
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn list_state(&self) -> &ListState {
        &self.list_state
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.list_state.selected().and_then(|idx| self.entries.get(idx))
    }

    /// Set the viewport height (called by the renderer with the actual area height)
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
    }

    pub fn handle_navigation_key(&mut self, key: KeyCode) -> bool {
        self.list_state
            .handle_key(key, self.entries.len(), self.viewport_height)
    }

    pub fn handle_event(&mut self, event: FileBrowserEvent) -> Result<Option<FileBrowserAction>> {
        match event {
            FileBrowserEvent::Activate => {
                let Some(entry) = self.selected_entry().cloned() else {
                    return Ok(None);
                };
                if entry.is_dir {
                    self.enter(entry.path.clone())?;
                    Ok(Some(FileBrowserAction::DirectoryEntered(entry.path)))
                } else {
                    Ok(Some(FileBrowserAction::FileSelected(entry.path)))
                }
            }
            FileBrowserEvent::GoUp => {
                let Some(parent) = self.current_path.parent().map(Path::to_path_buf) else {
                    return Ok(None);
                };
                self.enter(parent.clone())?;
                Ok(Some(FileBrowserAction::DirectoryEntered(parent)))
            }
        }
    }

    fn enter(&mut self, path: PathBuf) -> Result<()> {
        let previous = std::mem::replace(&mut self.current_path, path);
        if let Err(e) = self.refresh() {
            self.current_path = previous;
            return Err(e);
        }
        Ok(())
    }
}

/// Directories and the spreadsheet formats the reader understands
pub fn is_spreadsheet_or_dir(entry: &FileEntry) -> bool {
    if entry.is_dir {
        return true;
    }
    let name = entry.name.to_lowercase();
    [".xlsx", ".xlsm", ".xls", ".ods"]
        .iter()
        .any(|ext| name.ends_with(ext))
}
