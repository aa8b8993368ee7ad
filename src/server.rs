//! Single-page web form: paste a URL or upload a PDF, get the report back.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tracing::{error, info, warn};

use crate::document::{Interaction, PdfUpload};
use crate::llm::GeminiClient;
use crate::pipeline::{AnalysisError, Pipeline};
use crate::render::{self, escape_html};
use crate::search::SerperClient;

pub type AppPipeline = Pipeline<GeminiClient, SerperClient>;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn router(pipeline: Arc<AppPipeline>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(pipeline)
}

pub async fn serve(bind: &str, pipeline: AppPipeline) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "web form listening");
    axum::serve(listener, router(Arc::new(pipeline))).await
}

async fn health() -> &'static str {
    "ok"
}

async fn index() -> Html<String> {
    Html(page(None, None))
}

async fn analyze(
    State(pipeline): State<Arc<AppPipeline>>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let interaction = match read_interaction(multipart).await {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "unreadable form submission");
            return (
                StatusCode::BAD_REQUEST,
                Html(page(None, Some("The form submission could not be read."))),
            );
        }
    };

    match pipeline.run(interaction).await {
        Ok(report) => {
            info!(title = %report.document.title, "report rendered");
            (StatusCode::OK, Html(page(Some(&render::to_html(&report)), None)))
        }
        Err(e) => {
            error!(error = %e, "analysis failed");
            (status_for(&e), Html(page(None, Some(e.user_message()))))
        }
    }
}

/// Fresh per request; fields other than `url` and `pdf` are ignored.
async fn read_interaction(mut multipart: Multipart) -> Result<Interaction, MultipartError> {
    let mut interaction = Interaction::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("url") => interaction.url = Some(field.text().await?),
            Some("pdf") => {
                let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
                let bytes = field.bytes().await?;
                interaction.pdf = Some(PdfUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }
    Ok(interaction)
}

fn status_for(e: &AnalysisError) -> StatusCode {
    match e {
        AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AnalysisError::Parse(_) | AnalysisError::EmptyDocument => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn page(report_html: Option<&str>, error_message: Option<&str>) -> String {
    let error_html = error_message
        .map(|m| format!("<p class=\"error\">{}</p>\n", escape_html(m)))
        .unwrap_or_default();
    let report_html = report_html.unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Article Explorer</title>
<style>
body {{ font-family: sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }}
.error {{ color: #b00020; }}
article {{ border-top: 1px solid #ddd; }}
</style>
</head>
<body>
<h1>Article Explorer</h1>
<p>Paste a URL or upload a PDF file, and we'll analyze its content and find related articles.</p>
<form method="post" action="/analyze" enctype="multipart/form-data">
<p><label>Enter a URL <input type="url" name="url" placeholder="E.g., https://example.com/article" size="60"></label></p>
<p><label>Or upload a PDF file <input type="file" name="pdf" accept="application/pdf,.pdf"></label></p>
<p><button type="submit">Analyze and Find Related Articles</button></p>
</form>
{error_html}{report_html}
</body>
</html>
"#
    )
}
