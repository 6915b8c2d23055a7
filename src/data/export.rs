use std::path::Path;

use anyhow::{Context, Result};

use super::model::CrossSectionSeries;

/// Default file name offered by the save dialog.
pub const CSV_FILE_NAME: &str = "cross_sections.csv";

/// Build the CSV for the given `(identifier, series)` columns.
///
/// Rows follow the energy grid of the first series. Other series are read
/// by row index; when a series is shorter than the first, its cell is left
/// empty. No interpolation is done, so the result is only meaningful for
/// series sharing a grid.
pub fn cross_sections_csv(columns: &[(&str, &CrossSectionSeries)]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header = vec!["Energy"];
    header.extend(columns.iter().map(|(id, _)| *id));
    writer.write_record(&header).context("writing CSV header")?;

    if let Some((_, grid)) = columns.first() {
        for (row, energy) in grid.energy().iter().enumerate() {
            let mut record = Vec::with_capacity(columns.len() + 1);
            record.push(energy.to_string());
            for (_, series) in columns {
                record.push(
                    series
                        .cross_section()
                        .get(row)
                        .map(f64::to_string)
                        .unwrap_or_default(),
                );
            }
            writer
                .write_record(&record)
                .with_context(|| format!("writing CSV row {row}"))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flushing CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Write the CSV for `columns` to `path`.
pub fn write_csv(path: &Path, columns: &[(&str, &CrossSectionSeries)]) -> Result<()> {
    let csv = cross_sections_csv(columns)?;
    std::fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} series to {}", columns.len(), path.display());
    Ok(())
}
