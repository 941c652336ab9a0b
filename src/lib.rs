pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, SubmissionConfig};

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use core::{
    driver::SubmissionDriver,
    mapping::{map_record, SubmissionSchema},
    submitter::{DryRunSubmitter, KoboSubmitter},
    xml::to_xml_bytes,
};
pub use utils::error::{BridgeError, Result};
