pub mod driver;
pub mod mapping;
pub mod source;
pub mod submitter;
pub mod xml;

pub use crate::domain::model::{
    Document, Group, Leaf, Record, RunSummary, SubmissionOutcome, SubmissionResponse,
};
pub use crate::domain::ports::{ConfigProvider, Storage, Submitter};
pub use crate::utils::error::Result;
