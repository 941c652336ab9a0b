use crate::core::mapping::{map_record, SubmissionSchema};
use crate::core::source::{read_source, SourceTable};
use crate::core::xml::to_xml_bytes;
use crate::core::{ConfigProvider, Record, RunSummary, SubmissionOutcome, Submitter};
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation;
use chrono::Utc;

/// Sequential row → XML → POST loop. One request in flight at a time.
pub struct SubmissionDriver<C: ConfigProvider, S: Submitter> {
    config: C,
    submitter: S,
    schema: SubmissionSchema,
    limit: Option<usize>,
}

impl<C: ConfigProvider, S: Submitter> SubmissionDriver<C, S> {
    pub fn new(config: C, submitter: S) -> Self {
        Self {
            config,
            submitter,
            schema: SubmissionSchema::dafi(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// 送出前先確認必要設定都在，避免帶著空 token 發請求
    fn check_config(&self) -> Result<()> {
        validation::validate_non_empty_string("api_token", self.config.api_token())?;
        validation::validate_header_safe("api_token", self.config.api_token())?;
        validation::validate_no_placeholder("api_token", self.config.api_token())?;
        validation::validate_non_empty_string("project_uuid", self.config.project_uuid())?;
        validation::validate_url("endpoint", self.config.api_endpoint())?;
        if let Some(limit) = self.limit {
            validation::validate_positive_number("limit", limit, 1)?;
        }
        Ok(())
    }

    /// Read the configured source file, then submit every row.
    pub async fn run_from_source(&self) -> Result<RunSummary> {
        self.check_config()?;

        let path = self.config.parent_data_path();
        tracing::info!("📥 Reading source data from {}", path);
        let SourceTable {
            headers,
            records,
            skipped_blank_rows,
        } = read_source(path, self.config.sheet_name())
            .map_err(|e| match e {
                BridgeError::SourceError { .. } => e,
                other => BridgeError::SourceError {
                    message: format!("{}: {}", path, other),
                },
            })?;
        tracing::info!(
            "📊 Loaded {} rows ({} blank rows skipped)",
            records.len(),
            skipped_blank_rows
        );

        let missing = self.schema.missing_columns(&headers);
        if !missing.is_empty() {
            tracing::warn!(
                "⚠️ {} mapped column(s) not found in source, they will be sent as placeholders: {}",
                missing.len(),
                missing.join(", ")
            );
        }

        self.run(&records).await
    }

    pub async fn run(&self, records: &[Record]) -> Result<RunSummary> {
        self.check_config()?;

        let project_id = self.config.project_uuid();
        let count = self.limit.map_or(records.len(), |l| l.min(records.len()));
        tracing::info!(
            "🚀 Submitting {} of {} rows to {}",
            count,
            records.len(),
            self.config.api_endpoint()
        );

        let mut summary = RunSummary {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        for (index, record) in records.iter().take(count).enumerate() {
            let outcome = self.submit_record(index, record, project_id).await;
            summary.outcomes.push(outcome);
        }

        summary.finished_at = Some(Utc::now());
        tracing::info!(
            "✅ Run finished: {} submitted, {} accepted, {} failed in {}ms",
            summary.total(),
            summary.succeeded(),
            summary.failed(),
            summary.elapsed().map_or(0, |d| d.num_milliseconds())
        );

        Ok(summary)
    }

    async fn submit_record(&self, index: usize, record: &Record, project_id: &str) -> SubmissionOutcome {
        let document = map_record(&self.schema, record, project_id);
        let source_row = record.source_row;
        let row_label = source_row.map_or_else(String::new, |r| format!(" (source row {})", r));

        let xml = match to_xml_bytes(&document) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::error!("❌ Submission {}{}: could not serialize row: {}", index, row_label, e);
                return SubmissionOutcome {
                    index,
                    source_row,
                    status: None,
                    body: String::new(),
                    error: Some(e.to_string()),
                };
            }
        };
        tracing::debug!("Submission {}{} payload: {} bytes", index, row_label, xml.len());

        match self.submitter.submit(index, xml).await {
            Ok(response) => {
                if response.is_success() {
                    tracing::info!(
                        "Submission {}{}: {} {}",
                        index,
                        row_label,
                        response.status,
                        response.body
                    );
                } else {
                    tracing::warn!(
                        "Submission {}{}: {} {}",
                        index,
                        row_label,
                        response.status,
                        response.body
                    );
                }
                SubmissionOutcome {
                    index,
                    source_row,
                    status: Some(response.status),
                    body: response.body,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!("❌ Submission {}{}: request failed: {}", index, row_label, e);
                SubmissionOutcome {
                    index,
                    source_row,
                    status: None,
                    body: String::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
