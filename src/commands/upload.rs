use axum::extract::Multipart;

use crate::core::errors::{AppError, AppResult};
use crate::parser::{document_label, Document};

/// Named file fields collected from a multipart form.
#[derive(Default)]
pub struct UploadedFiles {
    files: Vec<(String, Document)>,
}

impl UploadedFiles {
    /// Removes and returns the file uploaded under `field`.
    pub fn take(&mut self, field: &str) -> AppResult<Document> {
        let index = self
            .files
            .iter()
            .position(|(name, _)| name == field)
            .ok_or_else(|| AppError::InvalidInput(format!("missing file field '{field}'")))?;
        Ok(self.files.remove(index).1)
    }
}

/// Reads every file field whose name is in `accepted`; other fields are
/// drained and ignored. Format checks happen here so an unsupported upload
/// is rejected before any extraction work.
pub async fn parse_multipart(mut multipart: Multipart, accepted: &[&str]) -> AppResult<UploadedFiles> {
    let mut uploaded = UploadedFiles::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let Some(position) = accepted.iter().position(|field_name| *field_name == name) else {
            let _ = field.bytes().await;
            continue;
        };

        let filename = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| AppError::InvalidInput(format!("field '{name}' is not a file")))?;
        let data = field.bytes().await?.to_vec();
        let document = Document::new(filename.clone(), data)
            .map_err(|err| err.for_document(&document_label(position + 1, &filename)))?;
        uploaded.files.push((name, document));
    }

    Ok(uploaded)
}
