/// Extension of exported artifacts
pub const ARTIFACT_EXTENSION: &str = "svg";

/// File name for a region exported from 1-based `page_number`
pub fn artifact_name(page_number: usize) -> String {
    format!("page-{page_number}-selection.{ARTIFACT_EXTENSION}")
}
