use crate::domain::model::SubmissionResponse;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_token(&self) -> &str;
    fn project_uuid(&self) -> &str;
    fn parent_data_path(&self) -> &str;
    fn sheet_name(&self) -> Option<&str>;
}

/// Delivers one serialized submission. `index` is the 0-based source row.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, index: usize, xml: Vec<u8>) -> Result<SubmissionResponse>;
}
