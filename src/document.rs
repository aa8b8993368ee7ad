use crate::pipeline::AnalysisError;

/// Title used when a fetched page has no usable `<title>`.
pub const MISSING_TITLE: &str = "No Title Found";
/// Title given to every uploaded PDF.
pub const PDF_TITLE: &str = "Uploaded PDF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What a single analysis starts from.
#[derive(Debug, Clone)]
pub enum Input {
    Url(String),
    Pdf(PdfUpload),
}

impl Input {
    pub fn source_url(&self) -> Option<&str> {
        match self {
            Input::Url(url) => Some(url),
            Input::Pdf(_) => None,
        }
    }
}

/// Everything one user action submitted. Built fresh for each request and
/// consumed by [`Interaction::into_input`], so nothing carries over between runs.
#[derive(Debug, Default)]
pub struct Interaction {
    pub url: Option<String>,
    pub pdf: Option<PdfUpload>,
}

impl Interaction {
    /// A non-blank URL takes precedence over an upload.
    pub fn into_input(self) -> Result<Input, AnalysisError> {
        if let Some(url) = self.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            return Ok(Input::Url(url));
        }
        match self.pdf.filter(|p| !p.bytes.is_empty()) {
            Some(pdf) => Ok(Input::Pdf(pdf)),
            None => Err(AnalysisError::InvalidInput(
                "Please provide a URL or upload a PDF file.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> PdfUpload {
        PdfUpload {
            file_name: "paper.pdf".into(),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[test]
    fn url_wins_over_upload() {
        let interaction = Interaction {
            url: Some(" https://example.com/a ".into()),
            pdf: Some(upload()),
        };
        match interaction.into_input().unwrap() {
            Input::Url(url) => assert_eq!(url, "https://example.com/a"),
            other => panic!("expected URL input, got: {other:?}"),
        }
    }

    #[test]
    fn blank_url_falls_back_to_upload() {
        let interaction = Interaction {
            url: Some("   ".into()),
            pdf: Some(upload()),
        };
        let input = interaction.into_input().unwrap();
        assert!(matches!(input, Input::Pdf(_)));
        assert!(input.source_url().is_none());
    }

    #[test]
    fn nothing_submitted_is_invalid_input() {
        let err = Interaction::default().into_input().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn empty_upload_counts_as_nothing() {
        let interaction = Interaction {
            url: None,
            pdf: Some(PdfUpload {
                file_name: "empty.pdf".into(),
                bytes: Vec::new(),
            }),
        };
        assert!(interaction.into_input().is_err());
    }
}
