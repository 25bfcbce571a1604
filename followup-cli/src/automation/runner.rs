//! Session state machine: authenticate, reconcile office, fill one follow-up per row

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local};

use super::best_effort;
use super::report::{RowOutcome, RowResult, RunReport};
use super::subject::follow_up_subject;
use crate::api::SponteClient;
use crate::config::{DataDir, DriverConfig, IdentifierColumn, RunConfig, Settings};
use crate::office::reconcile;
use crate::portal::{FollowUpForm, Portal, WebDriverPortal};
use crate::resolver::Resolver;
use crate::spreadsheet::{IdentifierKind, read_filtered_workbook};

pub struct Runner<'a> {
    portal: &'a mut dyn Portal,
    resolver: &'a Resolver,
    data_dir: &'a DataDir,
    config: &'a DriverConfig,
    form: FollowUpForm,
    submit: bool,
}

impl<'a> Runner<'a> {
    pub fn new(
        portal: &'a mut dyn Portal,
        resolver: &'a Resolver,
        data_dir: &'a DataDir,
        config: &'a DriverConfig,
        subject: String,
    ) -> Self {
        Self {
            portal,
            resolver,
            data_dir,
            config,
            form: FollowUpForm::billing(&config.attendant, subject),
            submit: false,
        }
    }

    /// Click the save buttons after filling each form
    pub fn submit(mut self, submit: bool) -> Self {
        self.submit = submit;
        self
    }

    /// Work through `keys` (data rows in file order) and close the session.
    ///
    /// Setup failures (home page, login, enterprise label) abort the run; row
    /// failures are recorded and the loop moves on. The final screenshot and the
    /// session quit happen either way.
    pub async fn run(mut self, keys: &[String]) -> Result<RunReport> {
        let outcome = self.drive(keys).await;

        self.screenshot("zz_final").await;
        best_effort("Closing browser session", self.portal.quit()).await;

        outcome
    }

    async fn drive(&mut self, keys: &[String]) -> Result<RunReport> {
        self.portal.open_home().await.context("Failed to open the portal")?;
        self.screenshot("01_home").await;

        log::info!("Logging in as {}...", self.config.email);
        self.portal
            .login(&self.config.email, &self.config.password)
            .await
            .context("Login failed")?;
        self.screenshot("02_pos_login").await;

        self.reconcile_office().await?;

        log::info!("Processing {} row(s)...", keys.len());
        let mut report = RunReport::default();
        for (idx, raw) in keys.iter().enumerate() {
            let result = self.process_row(idx + 2, raw).await;
            report.push(result);
        }

        Ok(report)
    }

    async fn reconcile_office(&mut self) -> Result<()> {
        let target = self.config.office;
        let detected = self
            .portal
            .current_enterprise()
            .await
            .context("Could not read the current enterprise")?;
        log::info!("Current enterprise: {}", detected);

        let Some(transition) = reconcile(target, &detected) else {
            log::warn!(
                "Unrecognized combination (target {}, enterprise '{}'), continuing without switching",
                target,
                detected
            );
            return Ok(());
        };

        log::info!("{}", transition.message);
        if let Some(code) = transition.switch_code {
            self.portal
                .switch_office(code)
                .await
                .with_context(|| format!("Failed to switch to {}", target))?;
            self.screenshot("03_troca_sede").await;
        }
        Ok(())
    }

    async fn process_row(&mut self, row: usize, raw: &str) -> RowResult {
        let key = raw.trim().to_string();
        let result = |student_id: Option<String>, outcome| RowResult {
            row,
            key: key.clone(),
            student_id,
            outcome,
        };

        if key.is_empty() {
            log::warn!("Row {}: empty identifier, skipped", row);
            return result(None, RowOutcome::Skipped("empty identifier".into()));
        }

        let Some(student_id) = self.resolver.resolve(&key, self.config.office).await else {
            log::warn!("Row {}: no AlunoID for {} '{}', skipped", row, self.resolver.kind(), key);
            return result(None, RowOutcome::Skipped("identifier not resolved".into()));
        };

        log::info!("Row {}: AlunoID {}", row, student_id);
        match self.follow_up(&student_id).await {
            Ok(()) => {
                log::info!("Row {}: follow-up done", row);
                result(Some(student_id), RowOutcome::Completed)
            }
            Err(e) => {
                log::error!("Row {}: {:#}", row, e);
                best_effort("Leaving frames", self.portal.leave_frames()).await;
                self.screenshot(&format!("erro_linha_{}", row)).await;
                result(Some(student_id), RowOutcome::Failed(format!("{:#}", e)))
            }
        }
    }

    async fn follow_up(&mut self, student_id: &str) -> Result<()> {
        self.portal.open_student(student_id).await?;
        self.screenshot(&format!("aluno_{}_00", student_id)).await;

        self.portal.open_follow_up_form().await?;
        self.screenshot(&format!("aluno_{}_01_follow", student_id)).await;

        self.portal.fill_follow_up(&self.form).await?;
        self.screenshot(&format!("aluno_{}_02_filled", student_id)).await;

        if self.submit {
            self.portal.save_follow_up().await?;
        }

        self.portal.leave_frames().await?;
        Ok(())
    }

    async fn screenshot(&mut self, name: &str) {
        let path = self.data_dir.screenshot_path(name);
        best_effort(&format!("Screenshot {}", name), self.portal.screenshot(&path)).await;
    }
}

/// The `run` command: load the file pair from the data directory and drive the portal.
pub async fn run_driver(data_dir: &DataDir, settings: &Settings) -> Result<RunReport> {
    log::info!("Data directory: {}", data_dir.root().display());

    let run_config = RunConfig::load(&data_dir.config_path())?;
    let declared = run_config.identifier_columns();
    let mut config = run_config.into_driver_config()?;

    let sheet_path = data_dir.filtered_sheet_path();
    if !sheet_path.exists() {
        bail!("Filtered spreadsheet not found: {}", sheet_path.display());
    }
    let (header, keys) = read_filtered_workbook(&sheet_path)?;
    config.column = select_column(&header, &declared)?;

    log::info!(
        "Office {}, attendant {}, {} column '{}'",
        config.office,
        config.attendant,
        config.column.kind,
        config.column.name
    );

    let resolver = build_resolver(&config, settings)?;
    let subject = follow_up_subject(Local::now().month());
    log::info!("Subject: {}", subject);

    let mut portal = WebDriverPortal::launch(settings).await?;
    let report = Runner::new(&mut portal, &resolver, data_dir, &config, subject)
        .submit(settings.automation.submit_follow_up)
        .run(&keys)
        .await?;

    log::info!("Run finished: {}", report);

    let report_path = data_dir.error_report_path(config.office);
    if report.write_error_report(&report_path)? {
        log::warn!("Rows with problems written to {}", report_path.display());
    }

    Ok(report)
}

/// The declared column the filtered sheet's header names, compared case-insensitively
fn select_column(header: &str, declared: &[IdentifierColumn]) -> Result<IdentifierColumn> {
    if let Some(column) = declared
        .iter()
        .find(|c| header.trim().eq_ignore_ascii_case(c.name.trim()))
    {
        return Ok(column.clone());
    }
    let names: Vec<&str> = declared.iter().map(|c| c.name.as_str()).collect();
    bail!(
        "Column '{}' not found in the filtered spreadsheet (header is '{}')",
        names.join("' / '"),
        header
    )
}

fn build_resolver(config: &DriverConfig, settings: &Settings) -> Result<Resolver> {
    match config.column.kind {
        IdentifierKind::StudentId => Ok(Resolver::direct()),
        IdentifierKind::Cpf => {
            let office = config.office;
            let credentials = settings.api_credentials(office).with_context(|| {
                format!(
                    "No Sponte API token for {}: set [offices.{}] token in settings.toml or SPONTE_TOKEN_{}",
                    office,
                    office,
                    office.name().to_uppercase()
                )
            })?;
            let client = SponteClient::new(&settings.api)?;
            Ok(Resolver::by_cpf(Arc::new(client), credentials))
        }
    }
}
