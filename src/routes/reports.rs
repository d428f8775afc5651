use axum::{
    extract::{Multipart, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use crate::{
    AppState,
    error::AppError,
    models::PartitionOutcome,
    services::{loader, packager, partitioner},
};
use tower_http::cors::{Any, CorsLayer};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/reports/generate", post(generate_reports))
        .layer(cors)
}

#[axum::debug_handler]
async fn generate_reports(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let start = std::time::Instant::now();

    // 1. Pull the uploaded file out of the multipart body
    let (file_name, file_data) = read_upload(multipart).await?;
    tracing::info!(
        "Processing upload '{}', size: {}KB",
        file_name,
        file_data.len() / 1024
    );

    if !file_name.to_lowercase().ends_with(".xlsx") {
        tracing::error!("Unsupported file type: {}", file_name);
        return Err(AppError::InvalidInput(
            "Only XLSX files are supported".to_string(),
        ));
    }
    if file_data.len() > state.config.max_file_size {
        return Err(AppError::InvalidInput(format!(
            "File exceeds the maximum accepted size of {} bytes",
            state.config.max_file_size
        )));
    }

    // 2. Load every sheet of the workbook
    tracing::info!("Loading workbook...");
    let load_start = std::time::Instant::now();
    let workbook = loader::load_workbook(file_data)?;
    tracing::info!(
        "Workbook loaded in {:?}, {} sheets",
        load_start.elapsed(),
        workbook.sheets.len()
    );

    // 3. Partition rows by publisher
    let partition_start = std::time::Instant::now();
    let partition = match partitioner::partition(&workbook) {
        PartitionOutcome::NoQualifyingSheets => {
            return Err(AppError::Schema(format!(
                "No sheet contains a column named '{}'",
                partitioner::PUBLISHER_COLUMN
            )));
        }
        PartitionOutcome::NoPublishers => {
            return Err(AppError::EmptyResult(format!(
                "No publisher values found in the '{}' column",
                partitioner::PUBLISHER_COLUMN
            )));
        }
        PartitionOutcome::Partitioned(partition) => partition,
    };
    tracing::info!(
        "Partitioned {} qualifying sheets into {} publishers in {:?}",
        partition.qualifying_sheets.len(),
        partition.publishers.len(),
        partition_start.elapsed()
    );

    // 4. Serialize one report per publisher and bundle them into the archive
    let package_start = std::time::Instant::now();
    let source_stem = file_stem(&file_name);
    let archive = packager::build_archive(
        &partition.reports,
        source_stem,
        chrono::Utc::now(),
        state.config.naming,
    )?;
    tracing::info!(
        "Packaged {} reports ({}KB archive) in {:?}",
        partition.reports.len(),
        archive.len() / 1024,
        package_start.elapsed()
    );

    tracing::info!("Total processing completed in {:?}", start.elapsed());

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", packager::ARCHIVE_FILENAME),
        ),
    ];
    Ok((headers, archive).into_response())
}

/// Reads the first file field out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
        return Ok((file_name, data));
    }

    Err(AppError::InvalidInput("No file provided".to_string()))
}

fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}
