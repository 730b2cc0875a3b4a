use crate::bodies;
use crate::cli;
use crate::file_processing;
use crate::positions;

use anyhow::Context;

/// Encodes a document as a single JSON object keyed by date.
pub fn to_json(document: &positions::PositionDocument) -> anyhow::Result<Vec<u8>> {
    anyhow::Ok(serde_json::to_vec(document)?)
}

/// Encodes a document as CSV: a `date` column followed by one column per body.
pub fn to_csv(document: &positions::PositionDocument) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let header = std::iter::once("date").chain(bodies::TRACKED_BODIES.iter().map(|b| b.name()));
    writer.write_record(header)?;

    for (date, record) in document {
        let row = std::iter::once(date.clone())
            .chain(record.iter().map(|(_, lon)| lon.to_string()));
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e))
}

/// Decodes a document written by [`to_json`].
pub fn from_json<R: std::io::Read>(reader: R) -> anyhow::Result<positions::PositionDocument> {
    anyhow::Ok(serde_json::from_reader(reader)?)
}

/// Decodes a document written by [`to_csv`]. The header must list the body
/// columns in output order.
pub fn from_csv<R: std::io::Read>(reader: R) -> anyhow::Result<positions::PositionDocument> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let expected: Vec<&str> = std::iter::once("date")
        .chain(bodies::TRACKED_BODIES.iter().map(|b| b.name()))
        .collect();
    let headers = reader.headers()?.clone();
    if headers.iter().collect::<Vec<_>>() != expected {
        anyhow::bail!("Unexpected CSV header: {:?}", headers);
    }

    let mut document = positions::PositionDocument::new();
    for (line, result) in reader.records().enumerate() {
        let row = result?;
        let date = row.get(0).unwrap_or_default().to_string();
        let mut column = 1;
        let record = positions::PositionRecord::try_from_fn(|body| {
            let value = row.get(column).unwrap_or_default();
            column += 1;
            value
                .parse::<f64>()
                .with_context(|| format!("Row {}: invalid longitude for {}: {:?}", line + 2, body, value))
        })?;
        if document.insert(date.clone(), record).is_some() {
            anyhow::bail!("Row {}: duplicate date {}", line + 2, date);
        }
    }

    anyhow::Ok(document)
}

/// Serializes the document and writes it to `output_path` in one step.
///
/// Nothing is written until the whole document has been encoded, and the file
/// only appears at `output_path` once it is complete.
///
/// # Arguments
/// * `document` - Completed position document.
/// * `output_path` - Destination file.
/// * `format` - JSON or CSV.
///
/// # Returns
/// * `anyhow::Result<usize>` - Number of bytes written.
pub fn save_document<P: AsRef<std::path::Path>>(
    document: &positions::PositionDocument,
    output_path: P,
    format: cli::OutputFormat,
) -> anyhow::Result<usize> {
    let data = match format {
        cli::OutputFormat::Json => to_json(document)?,
        cli::OutputFormat::Csv => to_csv(document)?,
    };
    file_processing::write_atomically(output_path, &data)?;
    anyhow::Ok(data.len())
}

/// Loads a document previously written by [`save_document`].
pub fn load_document<P: AsRef<std::path::Path>>(
    path: P,
    format: cli::OutputFormat,
) -> anyhow::Result<positions::PositionDocument> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let document = match format {
        cli::OutputFormat::Json => from_json(reader),
        cli::OutputFormat::Csv => from_csv(reader),
    };
    document.with_context(|| format!("Failed to read {}", path.display()))
}
