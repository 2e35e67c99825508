use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use follow_core::{Msg, RunOption};

use super::logging::LogDestination;
use super::persistence::PersistedSettings;

/// Export the accounts an Instagram user follows to CSV, JSON and XLSX.
#[derive(Debug, Parser)]
#[command(name = "followings_exporter", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Where diagnostic logs are written.
    #[arg(long, value_enum, default_value_t = LogTarget::File, global = true)]
    pub log: LogTarget,

    /// Include debug records in the diagnostic log.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Check that the cookie file still holds a logged-in session.
    Validate {
        /// Netscape cookies.txt exported from the browser.
        #[arg(long, value_name = "FILE")]
        cookies: Option<PathBuf>,
    },
    /// Fetch the following list and write the export files.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ExportArgs {
    /// Netscape cookies.txt exported from the browser.
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Existing folder that receives the exports and the snapshot.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Export this account instead of the logged-in one.
    #[arg(long, value_name = "USERNAME")]
    pub target: Option<String>,

    /// Keep only verified accounts.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub verified_only: Option<bool>,

    /// Keep only private accounts.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub private_only: Option<bool>,

    /// Fetch followers, followings and bio per account (slow).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub details: Option<bool>,

    /// Embed profile thumbnails in the spreadsheet.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub thumbnails: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

impl Command {
    /// Settings after applying the given flags over the remembered ones.
    pub fn merge(&self, mut settings: PersistedSettings) -> PersistedSettings {
        match self {
            Command::Validate { cookies } => {
                if let Some(path) = cookies {
                    settings.cookies_path = Some(path.clone());
                }
            }
            Command::Export(args) => {
                if let Some(path) = &args.cookies {
                    settings.cookies_path = Some(path.clone());
                }
                if let Some(dir) = &args.output {
                    settings.output_dir = Some(dir.clone());
                }
                settings.verified_only = args.verified_only.unwrap_or(settings.verified_only);
                settings.private_only = args.private_only.unwrap_or(settings.private_only);
                settings.fetch_details = args.details.unwrap_or(settings.fetch_details);
                settings.embed_thumbnails = args.thumbnails.unwrap_or(settings.embed_thumbnails);
            }
        }
        settings
    }

    /// Messages that fill the form from `settings` and then trigger the action.
    pub fn messages(&self, settings: &PersistedSettings) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if let Some(path) = &settings.cookies_path {
            msgs.push(Msg::CookiesPathChanged(path.clone()));
        }
        match self {
            Command::Validate { .. } => msgs.push(Msg::ValidateClicked),
            Command::Export(args) => {
                if let Some(dir) = &settings.output_dir {
                    msgs.push(Msg::OutputDirChanged(dir.clone()));
                }
                msgs.push(Msg::TargetChanged(args.target.clone()));
                for (option, enabled) in [
                    (RunOption::VerifiedOnly, settings.verified_only),
                    (RunOption::PrivateOnly, settings.private_only),
                    (RunOption::FetchDetails, settings.fetch_details),
                    (RunOption::EmbedThumbnails, settings.embed_thumbnails),
                ] {
                    msgs.push(Msg::OptionToggled { option, enabled });
                }
                msgs.push(Msg::RunClicked);
            }
        }
        msgs
    }
}
