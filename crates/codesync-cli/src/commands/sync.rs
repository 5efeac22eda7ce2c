//! Sync command - Upload a project's local changes
//!
//! Provides the `codesync sync` CLI command which:
//! 1. Validates the configuration and applies command-line overrides
//! 2. Creates the HTTP adapter for the remote store
//! 3. Runs one SyncEngine pass and displays the result

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use tracing::info;

use codesync_core::config::{Config, RemoteConfig};
use codesync_core::domain::ProjectId;
use codesync_remote::provider::HttpProjectRemote;
use codesync_sync::engine::{SyncEngine, SyncReport, SyncRequest};

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Local project directory
    #[arg(short, long)]
    pub path: PathBuf,

    /// Project ID on the remote store
    #[arg(short, long)]
    pub id: String,

    /// Time of the last sync in ms since the epoch; 0 uploads everything
    #[arg(short, long, default_value_t = 0)]
    pub time: i64,

    /// Remote store URL, overriding the configured one
    #[arg(long)]
    pub url: Option<String>,
}

impl SyncCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        let config = self.effective_config(config);
        let problems = config.validate();
        if !problems.is_empty() {
            for problem in &problems {
                formatter.error(&problem.to_string());
            }
            anyhow::bail!("invalid configuration ({} problems)", problems.len());
        }

        let project_id: ProjectId = self.id.parse().context("Invalid project ID")?;
        let remote = HttpProjectRemote::from_config(&config.remote)
            .context("Failed to create remote client")?;

        info!(
            path = %self.path.display(),
            project_id = %project_id,
            remote = %config.remote.url,
            "Starting sync"
        );
        formatter.info(&format!("Syncing {} to {}", self.path.display(), config.remote.url));

        let engine = SyncEngine::new(Arc::new(remote), &config);
        let request = SyncRequest::new(&self.path, project_id, self.time);

        match engine.sync(&request).await {
            Ok(report) => {
                display_report(formatter.as_ref(), format, &report);
                Ok(())
            }
            Err(err) => {
                formatter.error(&format!("{} ({})", err, err.op()));
                Err(err).context("Sync failed")
            }
        }
    }

    /// Configuration with command-line overrides applied
    fn effective_config(&self, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(url) = &self.url {
            config.remote = RemoteConfig {
                url: url.clone(),
                ..config.remote
            };
        }
        config
    }
}

fn display_report(formatter: &dyn OutputFormatter, format: OutputFormat, report: &SyncReport) {
    if format == OutputFormat::Json {
        let mut json = serde_json::to_value(&report.response).unwrap_or_default();
        json["timeStamp"] = serde_json::json!(report.next_cutoff_millis());
        if let Some(warning) = &report.warning {
            json["warning"] = serde_json::json!(warning.to_string());
        }
        formatter.print_json(&json);
        return;
    }

    let response = &report.response;
    formatter.success(&format!("Sync complete: {}", response.status));
    formatter.info(&format!(
        "{} files, {} directories, {} modified",
        report.manifest.file_list.len(),
        report.manifest.directory_list.len(),
        report.manifest.modified_list.len()
    ));

    let failed: Vec<_> = response
        .uploaded_files
        .iter()
        .filter(|o| !(200..300).contains(&o.status_code))
        .collect();
    formatter.info(&format!(
        "{} uploaded, {} failed",
        response.uploaded_files.len() - failed.len(),
        failed.len()
    ));
    for outcome in failed {
        formatter.warn(&format!("{}: {}", outcome.file_path, outcome.status));
    }

    if let Some(warning) = &report.warning {
        formatter.warn(&warning.to_string());
    }

    let next = report.next_cutoff_millis();
    let when = DateTime::<Utc>::from_timestamp_millis(next)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    formatter.info(&format!("Next sync time: {next} ({when})"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(url: Option<&str>) -> SyncCommand {
        SyncCommand {
            path: PathBuf::from("/home/dev/app"),
            id: "b1a78500".into(),
            time: 0,
            url: url.map(String::from),
        }
    }

    #[test]
    fn test_url_override() {
        let mut config = Config::default();
        config.remote.access_token = Some("token".into());

        let effective = command(Some("https://pfe.example.com")).effective_config(&config);
        assert_eq!(effective.remote.url, "https://pfe.example.com");
        assert_eq!(effective.remote.access_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_no_override_keeps_config() {
        let config = Config::default();
        let effective = command(None).effective_config(&config);
        assert_eq!(effective.remote.url, config.remote.url);
    }

    #[test]
    fn test_bad_override_fails_validation() {
        let effective = command(Some("ftp://example.com")).effective_config(&Config::default());
        assert!(!effective.validate().is_empty());
    }
}
