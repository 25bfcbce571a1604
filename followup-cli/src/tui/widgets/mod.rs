pub mod fields;
pub mod file_browser;
pub mod list;

pub use fields::{ChoiceField, TextInputField};
pub use file_browser::{FileBrowserAction, FileBrowserEvent, FileBrowserState};
pub use list::ListState;
