use crate::core::{ConfigProvider, Storage, SubmissionResponse, Submitter};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

pub const SUBMISSION_FIELD: &str = "xml_submission_file";
pub const SUBMISSION_FILENAME: &str = "data.xml";
pub const SUBMISSION_MIME: &str = "text/xml";

/// Posts submissions to a KoBo `/api/v1/submissions` endpoint.
pub struct KoboSubmitter {
    client: Client,
    endpoint: String,
    auth_header: String,
}

impl KoboSubmitter {
    pub fn new(endpoint: impl Into<String>, api_token: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            auth_header: format!("Token {}", api_token),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.api_endpoint(), config.api_token())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for KoboSubmitter {
    async fn submit(&self, index: usize, xml: Vec<u8>) -> Result<SubmissionResponse> {
        let part = Part::bytes(xml)
            .file_name(SUBMISSION_FILENAME)
            .mime_str(SUBMISSION_MIME)?;
        let form = Form::new().part(SUBMISSION_FIELD, part);

        tracing::debug!("POST {} (row {})", self.endpoint, index);
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(SubmissionResponse { status, body })
    }
}

/// 不送出，改寫入 `submission_<index>.xml`
pub struct DryRunSubmitter<S: Storage> {
    storage: S,
}

impl<S: Storage> DryRunSubmitter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn file_name(index: usize) -> String {
        format!("submission_{}.xml", index)
    }
}

#[async_trait]
impl<S: Storage> Submitter for DryRunSubmitter<S> {
    async fn submit(&self, index: usize, xml: Vec<u8>) -> Result<SubmissionResponse> {
        let file_name = Self::file_name(index);
        self.storage.write_file(&file_name, &xml).await?;

        Ok(SubmissionResponse {
            status: 200,
            body: format!("dry run: wrote {} ({} bytes)", file_name, xml.len()),
        })
    }
}
