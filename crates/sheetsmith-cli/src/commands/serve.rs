use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use sheetsmith_core::batch::compile::{compile_reports, NO_SPREADSHEETS, REPORT_FILE_NAME};
use sheetsmith_core::batch::InputFile;
use sheetsmith_core::error::SheetsmithError;
use sheetsmith_core::sheet::writer::write_workbook;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn run(addr: &str, max_upload_mb: usize) -> Result<(), SheetsmithError> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(addr, max_upload_mb))
}

async fn serve(addr: &str, max_upload_mb: usize) -> Result<(), SheetsmithError> {
    let app = router(max_upload_mb * 1024 * 1024);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    eprintln!("Serving on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(body_limit: usize) -> Router {
    Router::new()
        .route("/api/process-files", post(process_files))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Compile every uploaded `files` field into one workbook download.
///
/// A request with no files, or with no spreadsheet among them, is a client
/// error. Spreadsheets that all fail to parse are a server error.
async fn process_files(mut multipart: Multipart) -> Response {
    let mut uploads = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read multipart body: {e}");
                return error_response(StatusCode::BAD_REQUEST, "Failed to read upload.");
            }
        };
        if field.name() != Some("files") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        match field.bytes().await {
            Ok(bytes) => uploads.push(InputFile::new(name, bytes.to_vec())),
            Err(e) => {
                tracing::warn!(file = %name, "Failed to read upload bytes: {e}");
                return error_response(StatusCode::BAD_REQUEST, "Failed to read file data.");
            }
        }
    }

    if uploads.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No files uploaded");
    }

    let compiled = tokio::task::spawn_blocking(move || {
        let reports = compile_reports(uploads)?;
        write_workbook(&reports.sheets)
    })
    .await;

    match compiled {
        Ok(Ok(bytes)) => (
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(e @ SheetsmithError::EmptyInput)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(SheetsmithError::NoUsableData(reason))) if reason == NO_SPREADSHEETS => {
            error_response(StatusCode::BAD_REQUEST, reason)
        }
        Ok(Err(e)) => {
            tracing::error!("Processing error: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!("Compile task failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}
