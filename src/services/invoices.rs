//! Invoice upload — validation, storage path generation, upload-then-record.
//!
//! ERROR HANDLING
//! ==============
//! Validation runs entirely before any network call; a rejected upload never
//! touches the platform. The flow is upload first, record second: a failed
//! insert after a successful upload reports failure and leaves the stored
//! object orphaned (no compensating delete — the platform keeps no row
//! pointing at it, so nothing inconsistent is ever listed).

use rand::Rng;
use uuid::Uuid;

use super::projects::INVOICE_BUCKET;
use super::session::bytes_to_hex;
use crate::platform::{InvoiceStatus, NewInvoice, Platform, PlatformError};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Select a project")]
    MissingProject,
    #[error("Enter a positive amount")]
    InvalidAmount,
    #[error("Invoice must be a PDF file")]
    NotPdf,
    #[error("Choose a file to upload")]
    EmptyFile,
    #[error("{0}")]
    Platform(#[from] PlatformError),
}

/// A fully validated upload, ready for the network.
#[derive(Debug)]
pub struct InvoiceUpload {
    pub project_id: Uuid,
    pub amount: f64,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Required-field validation, performed before any platform call.
pub fn validate_upload(
    project_id: Option<Uuid>,
    amount: Option<f64>,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<InvoiceUpload, UploadError> {
    let project_id = project_id.ok_or(UploadError::MissingProject)?;
    let amount = amount
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or(UploadError::InvalidAmount)?;
    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(UploadError::NotPdf);
    }
    if bytes.is_empty() {
        return Err(UploadError::EmptyFile);
    }
    Ok(InvoiceUpload { project_id, amount, file_name: file_name.to_string(), bytes })
}

/// Randomized storage path scoped under the project id, retaining the
/// original file extension.
#[must_use]
pub fn generate_storage_path(project_id: Uuid, file_name: &str) -> String {
    let ext = file_name.rsplit('.').next().unwrap_or("pdf");
    let random: [u8; 16] = rand::rng().random();
    format!("{project_id}/{}.{ext}", bytes_to_hex(&random))
}

/// Upload the PDF bytes, then record the invoice row referencing the stored
/// path with status `unpaid`. Returns the storage path.
pub async fn upload_invoice(
    platform: &dyn Platform,
    token: &str,
    upload: InvoiceUpload,
) -> Result<String, UploadError> {
    let path = generate_storage_path(upload.project_id, &upload.file_name);

    platform
        .upload_object(token, INVOICE_BUCKET, &path, upload.bytes, "application/pdf")
        .await?;

    let invoice = NewInvoice {
        project_id: upload.project_id,
        amount: upload.amount,
        status: InvoiceStatus::Unpaid,
        pdf_url: Some(path.clone()),
    };
    platform.insert_invoice(token, &invoice).await?;

    Ok(path)
}

#[cfg(test)]
#[path = "invoices_test.rs"]
mod tests;
