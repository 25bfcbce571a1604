//! [`Portal`] over a Chrome WebDriver session

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thirtyfour::{ChromeCapabilities, ChromiumLikeCapabilities};
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use tokio::process::{Child, Command};
use tokio::time::sleep;

use super::selectors::*;
use super::{FollowUpForm, Portal};
use crate::automation::best_effort;
use crate::config::Waits;
use crate::config::settings::{BrowserSettings, Settings};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct WebDriverPortal {
    driver: WebDriver,
    /// chromedriver started by the fallback launch, killed on quit
    chromedriver: Option<Child>,
    base_url: String,
    waits: Waits,
    element_timeout: Duration,
}

impl WebDriverPortal {
    /// Start a browser session.
    ///
    /// Tries the configured WebDriver server first, then starts chromedriver
    /// itself. Fails only when both strategies fail.
    pub async fn launch(settings: &Settings) -> Result<Self> {
        let browser = &settings.browser;
        let caps = capabilities(browser)?;

        log::info!("Connecting to WebDriver at {}...", browser.webdriver_url);
        match WebDriver::new(browser.webdriver_url.as_str(), caps.clone()).await {
            Ok(driver) => {
                log::info!("Browser session started");
                return Ok(Self::with_driver(driver, None, settings));
            }
            Err(e) => log::warn!("WebDriver server not reachable ({}), starting chromedriver", e),
        }

        log::info!(
            "Starting {} on port {}...",
            browser.chromedriver_path,
            browser.webdriver_port
        );
        let child = Command::new(&browser.chromedriver_path)
            .arg(format!("--port={}", browser.webdriver_port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "Could not connect to {} nor start '{}'",
                    browser.webdriver_url, browser.chromedriver_path
                )
            })?;
        sleep(settings.waits.chromedriver_start()).await;

        let local_url = format!("http://localhost:{}", browser.webdriver_port);
        let driver = WebDriver::new(local_url.as_str(), caps)
            .await
            .with_context(|| format!("Both browser launch strategies failed ({})", local_url))?;

        log::info!("Browser session started (fallback chromedriver)");
        Ok(Self::with_driver(driver, Some(child), settings))
    }

    fn with_driver(driver: WebDriver, chromedriver: Option<Child>, settings: &Settings) -> Self {
        Self {
            driver,
            chromedriver,
            base_url: settings.portal.base_url.trim_end_matches('/').to_string(),
            waits: settings.waits.clone(),
            element_timeout: Duration::from_secs(settings.browser.element_timeout_secs),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_for(&self, by: By) -> Result<WebElement> {
        let element = self
            .driver
            .query(by)
            .wait(self.element_timeout, POLL_INTERVAL)
            .first()
            .await?;
        Ok(element)
    }

    /// Scroll into view and click through JavaScript; the portal's tabs ignore native clicks
    async fn js_click(&self, element: &WebElement) -> Result<()> {
        self.driver
            .execute(SCROLL_AND_CLICK_JS, vec![element.to_json()?])
            .await?;
        Ok(())
    }

    async fn select_exact(&self, select_id: &str, text: &str) -> Result<()> {
        let element = self
            .wait_for(By::Id(select_id))
            .await
            .with_context(|| format!("Select #{} not found", select_id))?;

        SelectElement::new(&element)
            .await?
            .select_by_exact_text(text)
            .await
            .with_context(|| format!("Option '{}' not found in #{}", text, select_id))?;

        sleep(self.waits.field()).await;
        Ok(())
    }
}

fn capabilities(browser: &BrowserSettings) -> Result<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    caps.add_arg("--start-maximized")?;
    if browser.headless {
        caps.add_arg("--headless=new")?;
        caps.add_arg("--window-size=1920,1080")?;
    }
    Ok(caps)
}

#[async_trait]
impl Portal for WebDriverPortal {
    async fn open_home(&mut self) -> Result<()> {
        let url = self.url(HOME_PATH);
        log::info!("Opening {}", url);
        self.driver.goto(url.as_str()).await?;
        Ok(())
    }

    async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let email_field = self
            .wait_for(By::Id(LOGIN_EMAIL_ID))
            .await
            .context("Login field not found")?;
        email_field.send_keys(email).await?;

        self.driver
            .find(By::Id(LOGIN_PASSWORD_ID))
            .await?
            .send_keys(password)
            .await?;
        self.driver.find(By::Id(LOGIN_BUTTON_ID)).await?.click().await?;

        log::info!("Waiting for post-login page...");
        sleep(self.waits.post_login()).await;
        Ok(())
    }

    async fn current_enterprise(&mut self) -> Result<String> {
        let label = self
            .driver
            .find(By::Id(ENTERPRISE_LABEL_ID))
            .await
            .context("Enterprise label not found (login failed?)")?
            .text()
            .await?;
        Ok(crate::office::normalize_enterprise_label(&label))
    }

    async fn switch_office(&mut self, code: u8) -> Result<()> {
        self.driver.execute(office_switch_script(code), vec![]).await?;
        sleep(self.waits.office_switch()).await;
        Ok(())
    }

    async fn open_student(&mut self, student_id: &str) -> Result<()> {
        let url = self.url(&student_path(student_id));
        self.driver.goto(url.as_str()).await?;
        sleep(self.waits.page_load()).await;
        Ok(())
    }

    async fn open_follow_up_form(&mut self) -> Result<()> {
        let tab = self
            .driver
            .find(By::XPath(FOLLOW_UP_TAB_XPATH))
            .await
            .context("Follow-up tab not found")?;
        self.js_click(&tab).await?;
        sleep(self.waits.tab_click()).await;

        let include = self
            .driver
            .find(By::Id(FOLLOW_UP_INCLUDE_ID))
            .await
            .context("Follow-up include button not found")?;
        self.js_click(&include).await?;
        sleep(self.waits.tab_click()).await;

        let frame = self
            .wait_for(By::XPath(FOLLOW_UP_FRAME_XPATH))
            .await
            .context("Follow-up frame did not open")?;
        frame.enter_frame().await?;
        sleep(self.waits.frame_enter()).await;
        Ok(())
    }

    async fn fill_follow_up(&mut self, form: &FollowUpForm) -> Result<()> {
        self.select_exact(ATTENDANT_SELECT_ID, &form.attendant).await?;
        self.select_exact(CONTACT_TYPE_SELECT_ID, &form.contact_type).await?;
        self.select_exact(SCHEDULE_TYPE_SELECT_ID, &form.schedule_type).await?;
        self.select_exact(INTEREST_SELECT_ID, &form.interest).await?;

        let subject = self.driver.find(By::Id(SUBJECT_ID)).await?;
        subject.clear().await?;
        subject.send_keys(form.subject.as_str()).await?;
        sleep(self.waits.field()).await;
        Ok(())
    }

    async fn save_follow_up(&mut self) -> Result<()> {
        let modal_save = self
            .driver
            .find(By::Css(MODAL_SAVE_CSS))
            .await
            .context("Follow-up save button not found")?;
        self.js_click(&modal_save).await?;
        sleep(self.waits.save()).await;

        self.driver.enter_default_frame().await?;

        let record_save = self
            .driver
            .find(By::Css(RECORD_SAVE_CSS))
            .await
            .context("Record save button not found")?;
        self.js_click(&record_save).await?;
        sleep(self.waits.save()).await;
        Ok(())
    }

    async fn leave_frames(&mut self) -> Result<()> {
        self.driver.enter_default_frame().await?;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        let png = self.driver.screenshot_as_png().await?;
        tokio::fs::write(path, png)
            .await
            .with_context(|| format!("Failed to write screenshot: {}", path.display()))?;
        log::info!("[screenshot] {}", path.display());
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        let result = self.driver.clone().quit().await;

        if let Some(mut child) = self.chromedriver.take() {
            best_effort("Stop chromedriver", async {
                child.kill().await.context("Failed to kill chromedriver")
            })
            .await;
        }

        result.context("Failed to close browser session")
    }
}
