pub mod init;
pub mod status;
pub mod update;

use clap::{Args, Parser, Subcommand};

use crate::settings::{load_settings, shellexpand_path, Settings};

#[derive(Parser)]
#[command(
    name = "sico",
    about = "Reshape the downloaded SICO mortality CSV into long format and archive it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub update: UpdateArgs,

    /// More logging (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Keep rows dated today (dropped by default as incomplete)
    #[arg(long = "include-today")]
    pub include_today: bool,
    /// Process this file instead of searching the downloads directory
    #[arg(long)]
    pub file: Option<String>,
    /// Year for district/age-group/location files (default: from file name)
    #[arg(long)]
    pub year: Option<i32>,
    /// Fail on month abbreviations missing from the translation table
    #[arg(long = "strict-months")]
    pub strict_months: bool,
    /// Transform and report, but do not write the output or archive the input
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    #[command(flatten)]
    pub dirs: DirArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DirArgs {
    /// Data directory holding the mortalidade*.csv outputs
    #[arg(long = "base-dir", global = true)]
    pub base_dir: Option<String>,
    /// Directory searched for Dados_SICO_*.csv
    #[arg(long = "downloads-dir", global = true)]
    pub downloads_dir: Option<String>,
}

impl DirArgs {
    /// Saved settings with any directory overrides applied.
    pub fn resolve(&self) -> Settings {
        let mut settings = load_settings();
        self.apply(&mut settings);
        settings
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.base_dir {
            settings.base_dir = shellexpand_path(dir);
        }
        if let Some(dir) = &self.downloads_dir {
            settings.downloads_dir = shellexpand_path(dir);
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save directory settings and create the data/archive directories.
    Init,
    /// Show settings and any downloads waiting to be processed.
    Status,
}
