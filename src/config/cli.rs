use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "kobo-bridge")]
#[command(about = "Submit spreadsheet rows to a KoBo server as XML form submissions")]
pub struct CliArgs {
    /// Path to the JSON or TOML configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Only submit the first N rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Write each submission to --output-path instead of posting it
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, default_value = "./output")]
    pub output_path: String,
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
