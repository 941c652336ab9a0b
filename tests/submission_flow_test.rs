use anyhow::Result;
use httpmock::prelude::*;
use kobo_bridge::core::mapping::SubmissionSchema;
use kobo_bridge::{
    BridgeError, DryRunSubmitter, KoboSubmitter, LocalStorage, SubmissionConfig, SubmissionDriver,
};
use std::io::Write;
use tempfile::{Builder, NamedTempFile, TempDir};

/// 產生一份含完整表頭的 CSV，每列只有學號不同
fn write_source(student_codes: &[&str]) -> Result<NamedTempFile> {
    let schema = SubmissionSchema::dafi();
    let headers: Vec<&str> = schema.columns().collect();

    let mut file = Builder::new().suffix(".csv").tempfile()?;
    {
        let mut writer = csv::Writer::from_writer(file.as_file_mut());
        writer.write_record(&headers)?;
        for code in student_codes {
            let row: Vec<String> = headers
                .iter()
                .map(|h| match *h {
                    "Student Code Unique Identifier" => code.to_string(),
                    "start" => "2024-01-01T00:00".to_string(),
                    "end" => "2024-01-01T01:00".to_string(),
                    other => format!("{} value", other),
                })
                .collect();
            writer.write_record(&row)?;
        }
        writer.flush()?;
    }
    Ok(file)
}

fn config_for(source: &NamedTempFile, server: &MockServer) -> SubmissionConfig {
    SubmissionConfig::new(source.path().to_str().unwrap(), "tok-123", "proj-uuid")
        .with_endpoint(server.url("/api/v1/submissions"))
}

#[tokio::test]
async fn test_three_rows_posted_in_order_despite_server_error() -> Result<()> {
    let source = write_source(&["S-001", "S-002", "S-003"])?;
    let server = MockServer::start_async().await;

    let mut mocks = Vec::new();
    for (code, status) in [("S-001", 201), ("S-002", 500), ("S-003", 201)] {
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/submissions")
                    .header("authorization", "Token tok-123")
                    .body_contains("name=\"xml_submission_file\"")
                    .body_contains("filename=\"data.xml\"")
                    .body_contains(format!(
                        "<Student_Code_Unique_identifier>{}</Student_Code_Unique_identifier>",
                        code
                    ));
                then.status(status).body(format!("response for {}", code));
            })
            .await;
        mocks.push(mock);
    }

    let config = config_for(&source, &server);
    let submitter = KoboSubmitter::from_config(&config);
    let summary = SubmissionDriver::new(config, submitter)
        .run_from_source()
        .await?;

    for mock in &mocks {
        mock.assert_async().await;
    }

    let statuses: Vec<Option<u16>> = summary.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(statuses, vec![Some(201), Some(500), Some(201)]);
    let indices: Vec<usize> = summary.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(summary.outcomes[1].body, "response for S-002");
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_logged_per_row() -> Result<()> {
    let source = write_source(&["S-001", "S-002"])?;

    // 沒有任何服務的 port
    let config = SubmissionConfig::new(source.path().to_str().unwrap(), "tok", "proj")
        .with_endpoint("http://127.0.0.1:1/api/v1/submissions");
    let submitter = KoboSubmitter::from_config(&config);

    let summary = SubmissionDriver::new(config, submitter)
        .run_from_source()
        .await?;

    assert_eq!(summary.total(), 2);
    assert!(summary.outcomes.iter().all(|o| o.error.is_some()));
    Ok(())
}

#[tokio::test]
async fn test_config_without_api_token_never_sends() -> Result<()> {
    let source = write_source(&["S-001"])?;
    let server = MockServer::start_async().await;
    let any_post = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(201);
        })
        .await;

    let mut config_file = Builder::new().suffix(".json").tempfile()?;
    write!(
        config_file,
        r#"{{"parent_data_path": {:?}, "project_uuid": "proj", "endpoint": {:?}}}"#,
        source.path().to_str().unwrap(),
        server.url("/api/v1/submissions")
    )?;

    let result = SubmissionConfig::from_file(config_file.path());
    assert!(matches!(
        result,
        Err(BridgeError::MissingConfigError { ref field }) if field == "api_token"
    ));

    // 即使繞過載入器直接給空 token，driver 也要拒絕
    let config = SubmissionConfig::new(source.path().to_str().unwrap(), "", "proj")
        .with_endpoint(server.url("/api/v1/submissions"));
    let submitter = KoboSubmitter::from_config(&config);
    let result = SubmissionDriver::new(config, submitter).run_from_source().await;
    assert!(result.is_err());

    any_post.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_missing_source_file_is_fatal() -> Result<()> {
    let server = MockServer::start_async().await;
    let any_post = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(201);
        })
        .await;

    let config = SubmissionConfig::new("/no/such/students.xlsx", "tok", "proj")
        .with_endpoint(server.url("/api/v1/submissions"));
    let submitter = KoboSubmitter::from_config(&config);

    let result = SubmissionDriver::new(config, submitter).run_from_source().await;

    assert!(matches!(result, Err(BridgeError::SourceError { .. })));
    any_post.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_dry_run_writes_one_file_per_row() -> Result<()> {
    let source = write_source(&["S-001", "S-002"])?;
    let output = TempDir::new()?;

    let config = SubmissionConfig::new(source.path().to_str().unwrap(), "tok", "proj");
    let storage = LocalStorage::new(output.path().to_str().unwrap().to_string());

    let summary = SubmissionDriver::new(config, DryRunSubmitter::new(storage))
        .run_from_source()
        .await?;

    assert_eq!(summary.succeeded(), 2);
    let second = std::fs::read_to_string(output.path().join("submission_1.xml"))?;
    assert!(second.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?><data id=\"proj\""));
    assert!(second.contains("<Student_Code_Unique_identifier>S-002</Student_Code_Unique_identifier>"));
    assert!(second.contains("<Email_Address>EMAIL value</Email_Address>"));
    Ok(())
}

#[tokio::test]
async fn test_unset_token_placeholder_never_sends() -> Result<()> {
    let source = write_source(&["S-001", "S-002"])?;
    let server = MockServer::start_async().await;
    let any_post = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(201);
        })
        .await;

    std::env::remove_var("KOBO_BRIDGE_FLOW_UNSET_TOKEN");
    let mut config_file = Builder::new().suffix(".json").tempfile()?;
    write!(
        config_file,
        r#"{{"parent_data_path": {:?}, "api_token": "${{KOBO_BRIDGE_FLOW_UNSET_TOKEN}}", "project_uuid": "proj", "endpoint": {:?}}}"#,
        source.path().to_str().unwrap(),
        server.url("/api/v1/submissions")
    )?;

    let result = SubmissionConfig::from_file(config_file.path());
    assert!(matches!(
        result,
        Err(BridgeError::MissingConfigError { ref field }) if field.starts_with("api_token")
    ));

    // 字面上的 placeholder 直接進 driver 也不能送出
    let config = SubmissionConfig::new(source.path().to_str().unwrap(), "${KOBO_API_TOKEN}", "proj")
        .with_endpoint(server.url("/api/v1/submissions"));
    let submitter = KoboSubmitter::from_config(&config);
    let result = SubmissionDriver::new(config, submitter).run_from_source().await;
    assert!(matches!(
        result,
        Err(BridgeError::InvalidConfigValueError { ref field, .. }) if field == "api_token"
    ));

    any_post.assert_hits_async(0).await;
    Ok(())
}
