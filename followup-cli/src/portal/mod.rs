//! Browser-facing side of the automation
//!
//! [`Portal`] is the set of page interactions the runner needs. The WebDriver
//! implementation lives in [`webdriver`]; tests drive the runner with a fake.

pub mod selectors;
pub mod webdriver;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

pub use webdriver::WebDriverPortal;

/// Values typed into the follow-up form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpForm {
    pub attendant: String,
    pub contact_type: String,
    pub schedule_type: String,
    pub interest: String,
    pub subject: String,
}

impl FollowUpForm {
    pub const CONTACT_TYPE: &'static str = "WhatsApp";
    pub const SCHEDULE_TYPE: &'static str = "Cobrança";
    pub const INTEREST: &'static str = "Muito Interessado";

    /// The billing follow-up filled for every student of a run
    pub fn billing(attendant: &str, subject: String) -> Self {
        Self {
            attendant: attendant.to_string(),
            contact_type: Self::CONTACT_TYPE.to_string(),
            schedule_type: Self::SCHEDULE_TYPE.to_string(),
            interest: Self::INTEREST.to_string(),
            subject,
        }
    }
}

/// Page interactions against the Sponte portal.
///
/// Implementations own their settle waits; callers only sequence the steps.
#[async_trait]
pub trait Portal: Send {
    /// Open the portal home (login) page
    async fn open_home(&mut self) -> Result<()>;

    /// Submit the login form
    async fn login(&mut self, email: &str, password: &str) -> Result<()>;

    /// Enterprise label shown in the header, whitespace removed
    async fn current_enterprise(&mut self) -> Result<String>;

    /// Post back an office switch with the given code
    async fn switch_office(&mut self, code: u8) -> Result<()>;

    /// Navigate to a student's record page
    async fn open_student(&mut self, student_id: &str) -> Result<()>;

    /// Open the follow-up tab, click "include" and enter the form frame
    async fn open_follow_up_form(&mut self) -> Result<()>;

    /// Fill the follow-up form (inside its frame)
    async fn fill_follow_up(&mut self, form: &FollowUpForm) -> Result<()>;

    /// Click the modal and record save buttons
    async fn save_follow_up(&mut self) -> Result<()>;

    /// Switch back to the top-level document
    async fn leave_frames(&mut self) -> Result<()>;

    /// Capture the current viewport as PNG
    async fn screenshot(&mut self, path: &Path) -> Result<()>;

    /// End the browser session
    async fn quit(&mut self) -> Result<()>;
}
