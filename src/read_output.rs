use crate::cli;
use crate::dates;
use crate::output;
use crate::positions;
use crate::utils;

/// Number of records printed by the check step.
pub const PREVIEW_COUNT: usize = 5;

/// Reads a written output file back, validates it against `range`, and prints
/// the first records in human-readable form.
///
/// # Arguments
/// * `path` - Output file written by this run.
/// * `format` - Format the file was written in.
/// * `range` - Dates the file must contain, one record each.
///
/// # Returns
/// * `anyhow::Result<positions::PositionDocument>` - The document as read from disk.
pub fn check_output<P: AsRef<std::path::Path>>(
    path: P,
    format: cli::OutputFormat,
    range: &dates::DateRange,
) -> anyhow::Result<positions::PositionDocument> {
    let document = output::load_document(path.as_ref(), format)?;
    positions::validate_document(&document, range)?;

    println!(
        "📄 Read {} dates from {}, first {}:",
        document.len(),
        path.as_ref().display(),
        PREVIEW_COUNT.min(document.len())
    );
    utils::print_records(&document, PREVIEW_COUNT);

    anyhow::Ok(document)
}
