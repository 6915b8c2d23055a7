use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::catalog::MoleculeLabels;
use super::constants::{atomic_weight, ATOMIC_UNIT_TO_ANGSTROM2};
use super::model::{
    CrossSectionSeries, Diagnostic, LengthMismatch, MoleculeDataset, MoleculeRecord,
    StructurePayload,
};
use crate::config::DatasetConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("no structure file at {0}")]
    MissingStructure(PathBuf),

    #[error("line {line}: {details}")]
    Parse { line: usize, details: String },

    #[error("table has {0} columns, expected 2 or 3")]
    UnsupportedColumns(usize),

    #[error("no rows left after header skip and energy filter")]
    EmptyTable,

    #[error("unknown element '{symbol}' on line {line}")]
    UnknownElement { line: usize, symbol: String },

    #[error(transparent)]
    Length(#[from] LengthMismatch),
}

impl IngestError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            line,
            details: details.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Ingest every molecule found in the cross-section directory.
///
/// Per-molecule problems never fail the batch:
/// * missing structure file → molecule skipped silently
/// * unreadable or empty table → molecule skipped, diagnostic recorded
/// * unreadable atom list → molecule kept without a mass, diagnostic recorded
///
/// Only an unreadable cross-section directory is an error.
pub fn ingest(
    config: &DatasetConfig,
    labels: &MoleculeLabels,
) -> Result<MoleculeDataset, IngestError> {
    let mut diagnostics = Vec::new();
    let files = discover_tables(config, &mut diagnostics)?;
    let mut records = Vec::with_capacity(files.len());

    for (id, path) in files {
        match ingest_molecule(config, labels, &id, &path) {
            Ok((record, mass_problem)) => {
                if let Some(problem) = mass_problem {
                    log::warn!("{id}: molecular mass unavailable: {problem}");
                    diagnostics.push(Diagnostic {
                        molecule: id.clone(),
                        message: format!("mass unavailable, listed last ({problem})"),
                        skipped: false,
                    });
                }
                records.push(record);
            }
            Err(IngestError::MissingStructure(p)) => {
                log::debug!("{id}: no structure at {}, skipping", p.display());
            }
            Err(e) => {
                log::warn!("{id}: skipped: {e}");
                diagnostics.push(Diagnostic {
                    molecule: id,
                    message: e.to_string(),
                    skipped: true,
                });
            }
        }
    }

    log::info!(
        "Ingested {} molecules from {} ({} diagnostics)",
        records.len(),
        config.cross_section_dir().display(),
        diagnostics.len()
    );
    Ok(MoleculeDataset::new(records, diagnostics))
}

/// List `(identifier, path)` for every table file, sorted by identifier.
///
/// Each identifier appears once: when several files map to the same
/// identifier the first path in sorted order wins and the others are
/// reported as skipped.
fn discover_tables(
    config: &DatasetConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<(String, PathBuf)>, IngestError> {
    let dir = config.cross_section_dir();
    let entries = std::fs::read_dir(&dir).map_err(|e| IngestError::io(&dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IngestError::io(&dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&config.cross_section_extension));
        if !ext_matches {
            continue;
        }
        match molecule_id(&path) {
            Some(id) => files.push((id, path)),
            None => log::warn!("Ignoring {}: no usable molecule identifier", path.display()),
        }
    }
    files.sort();

    let mut unique: Vec<(String, PathBuf)> = Vec::with_capacity(files.len());
    for (id, path) in files {
        match unique.last() {
            Some((last_id, kept)) if *last_id == id => {
                log::warn!(
                    "{id}: {} duplicates {}, skipping",
                    path.display(),
                    kept.display()
                );
                diagnostics.push(Diagnostic {
                    molecule: id,
                    message: format!("duplicate table {}", path.display()),
                    skipped: true,
                });
            }
            _ => unique.push((id, path)),
        }
    }
    Ok(unique)
}

fn ingest_molecule(
    config: &DatasetConfig,
    labels: &MoleculeLabels,
    id: &str,
    table_path: &Path,
) -> Result<(MoleculeRecord, Option<IngestError>), IngestError> {
    let structure_path = config.structure_path(id);
    if !structure_path.is_file() {
        return Err(IngestError::MissingStructure(structure_path));
    }

    let text = std::fs::read_to_string(table_path).map_err(|e| IngestError::io(table_path, e))?;
    let rows = parse_table(&text, config.header_lines)?;
    let series = series_from_rows(&rows, ATOMIC_UNIT_TO_ANGSTROM2, config.energy_ceiling_ev)?;
    if series.is_empty() {
        return Err(IngestError::EmptyTable);
    }

    let structure_text =
        std::fs::read_to_string(&structure_path).map_err(|e| IngestError::io(&structure_path, e))?;

    let atom_list_path = config.atom_list_path(id);
    let (mass, mass_problem) = match std::fs::read_to_string(&atom_list_path) {
        Ok(text) => match molecular_mass(&text) {
            Ok(m) => (Some(m), None),
            Err(e) => (None, Some(e)),
        },
        Err(e) => (None, Some(IngestError::io(&atom_list_path, e))),
    };

    let record = MoleculeRecord {
        id: id.to_string(),
        label: labels.label_for(id).to_string(),
        mass,
        series,
        structure: StructurePayload::from_text(&structure_text),
    };
    Ok((record, mass_problem))
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Molecule identifier for a table file: the final path component up to
/// its first `.`. Directory parts of `path` never contribute.
pub fn molecule_id(path: &Path) -> Option<String> {
    let file_name = match path.components().next_back()? {
        Component::Normal(name) => name.to_str()?,
        _ => return None,
    };
    let id = file_name.split('.').next().unwrap_or("");
    if id.is_empty() || id.contains(['/', '\\']) {
        return None;
    }
    Some(id.to_string())
}

/// Parse a whitespace-separated numeric table after skipping
/// `header_lines` lines. Blank lines are ignored. All rows must have the
/// same number of columns, either 2 or 3.
pub fn parse_table(text: &str, header_lines: usize) -> Result<Vec<Vec<f64>>, IngestError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (idx, line) in text.lines().enumerate().skip(header_lines) {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|tok| match tok.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(IngestError::parse(
                    line_no,
                    format!("'{tok}' is not a finite number"),
                )),
            })
            .collect::<Result<Vec<f64>, _>>()?;

        if !(2..=3).contains(&row.len()) {
            return Err(IngestError::UnsupportedColumns(row.len()));
        }
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(IngestError::parse(
                    line_no,
                    format!("{} columns, previous rows have {}", row.len(), first.len()),
                ));
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Turn table rows into a series.
///
/// Column 0 is the energy in eV. The cross section is column 1 for
/// two-column tables and the last column for three-column tables; it is
/// multiplied by `factor`. Rows with energy above `ceiling_ev` are dropped.
pub fn series_from_rows(
    rows: &[Vec<f64>],
    factor: f64,
    ceiling_ev: Option<f64>,
) -> Result<CrossSectionSeries, IngestError> {
    let mut energy = Vec::with_capacity(rows.len());
    let mut cross_section = Vec::with_capacity(rows.len());

    for row in rows {
        let (e, xs) = match row.as_slice() {
            [e, xs] | [e, _, xs] => (*e, *xs),
            other => return Err(IngestError::UnsupportedColumns(other.len())),
        };
        if ceiling_ev.is_some_and(|ceiling| e > ceiling) {
            continue;
        }
        energy.push(e);
        cross_section.push(xs * factor);
    }
    Ok(CrossSectionSeries::new(energy, cross_section)?)
}

/// Approximate molecular mass from an atom list: the first token of each
/// non-blank line is an element symbol.
pub fn molecular_mass(text: &str) -> Result<f64, IngestError> {
    let mut mass = 0.0;
    for (idx, line) in text.lines().enumerate() {
        let Some(symbol) = line.split_whitespace().next() else {
            continue;
        };
        mass += atomic_weight(symbol).ok_or_else(|| IngestError::UnknownElement {
            line: idx + 1,
            symbol: symbol.to_string(),
        })?;
    }
    Ok(mass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::parse_catalog;
    use std::fs;
    use tempfile::TempDir;

    const PDB: &str = "HETATM    1  C   UNL     1       0.000   0.000   0.000  1.00  0.00           C\r\nEND\r\n";

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create fixture dir");
        fs::write(path, content).expect("Failed to write fixture file");
    }

    fn dataset_dir() -> (TempDir, DatasetConfig) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatasetConfig::for_root(dir.path());
        (dir, config)
    }

    fn add_molecule(config: &DatasetConfig, id: &str, table: &str, xyz: Option<&str>) {
        write_file(&config.cross_section_dir().join(format!("{id}.dat")), table);
        write_file(&config.structure_path(id), PDB);
        if let Some(xyz) = xyz {
            write_file(&config.atom_list_path(id), xyz);
        }
    }

    #[test]
    fn id_is_taken_from_final_component_before_first_dot() {
        assert_eq!(molecule_id(Path::new("BEB/CH3OH.dat")).as_deref(), Some("CH3OH"));
        assert_eq!(molecule_id(Path::new("BEB/c-C3H2.beb.dat")).as_deref(), Some("c-C3H2"));
        assert_eq!(molecule_id(Path::new("../../etc/passwd.dat")).as_deref(), Some("passwd"));
        assert_eq!(molecule_id(Path::new("BEB/.dat")), None);
        assert_eq!(molecule_id(Path::new("BEB/..")), None);
    }

    #[test]
    fn header_lines_are_skipped() {
        let rows = parse_table("# BEB\n# E xs\n10 1.5\n20 2.5\n", 2).unwrap();
        assert_eq!(rows, vec![vec![10.0, 1.5], vec![20.0, 2.5]]);
    }

    #[test]
    fn mixed_column_counts_are_rejected() {
        let err = parse_table("10 1\n20 2 3\n", 0).unwrap_err();
        assert!(matches!(err, IngestError::Parse { line: 2, .. }));
        assert!(matches!(
            parse_table("1 2 3 4\n", 0),
            Err(IngestError::UnsupportedColumns(4))
        ));
        assert!(matches!(
            parse_table("10 abc\n", 0),
            Err(IngestError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn conversion_is_a_constant_factor() {
        let series =
            series_from_rows(&[vec![15.0, 1.0]], ATOMIC_UNIT_TO_ANGSTROM2, None).unwrap();
        assert!((series.cross_section()[0] - 0.280028521).abs() < 1e-8);
        assert_eq!(series.energy(), &[15.0]);
    }

    #[test]
    fn three_column_tables_use_last_column() {
        let rows = vec![vec![10.0, 7.0, 2.0], vec![20.0, 8.0, 4.0]];
        let series = series_from_rows(&rows, 1.0, None).unwrap();
        assert_eq!(series.cross_section(), &[2.0, 4.0]);
    }

    #[test]
    fn energy_ceiling_is_inclusive() {
        let rows = vec![vec![4000.0, 1.0], vec![5000.0, 2.0], vec![6000.0, 3.0]];
        let series = series_from_rows(&rows, 1.0, Some(5000.0)).unwrap();
        assert_eq!(series.energy(), &[4000.0, 5000.0]);
        assert_eq!(series.len(), series.cross_section().len());

        let unfiltered = series_from_rows(&rows, 1.0, None).unwrap();
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn mass_sums_atomic_weights() {
        assert_eq!(molecular_mass("C 0 0 0\nO 0 0 1.1\nO 0 0 -1.1\n\n").unwrap(), 44.0);
        assert!(matches!(
            molecular_mass("C 0 0 0\nCl 1 0 0\n"),
            Err(IngestError::UnknownElement { line: 2, .. })
        ));
    }

    #[test]
    fn ingest_skips_bad_molecules_and_keeps_the_rest() {
        let (_dir, config) = dataset_dir();
        add_molecule(&config, "CO", "h\nh\n10 1\n20 2\n", Some("C\nO\n"));
        add_molecule(&config, "H2", "h\nh\n10 1\n", Some("H\nH\n"));
        // No structure file.
        write_file(&config.cross_section_dir().join("NOPDB.dat"), "h\nh\n10 1\n");
        // Every row above the ceiling.
        add_molecule(&config, "HOT", "h\nh\n6000 1\n", Some("H\n"));
        // Garbage table.
        add_molecule(&config, "BAD", "h\nh\n10 x\n", Some("H\n"));
        // Unknown element: kept without mass.
        add_molecule(&config, "NaCl", "h\nh\n10 1\n", Some("Na\nCl\n"));
        // Not a table.
        write_file(&config.cross_section_dir().join("README.txt"), "notes");

        let labels = parse_catalog("CO CO\nH2 H$_2$\n");
        let ds = ingest(&config, &labels).unwrap();

        let ids: Vec<&str> = ds.iter_ordered().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["H2", "CO", "NaCl"]);
        assert!(ds.get("NOPDB").is_none());

        let h2 = ds.get("H2").unwrap();
        assert_eq!(h2.label, "H$_2$");
        assert_eq!(h2.mass, Some(2.0));
        assert_eq!(ds.get("NaCl").unwrap().label, "NaCl");
        assert_eq!(ds.get("CO").unwrap().series.len(), 2);
        assert_eq!(h2.structure.as_str(), PDB.replace("\r\n", "\n"));

        let skipped: Vec<&str> = ds
            .diagnostics
            .iter()
            .filter(|d| d.skipped)
            .map(|d| d.molecule.as_str())
            .collect();
        assert_eq!(skipped, ["BAD", "HOT"]);
        assert!(ds.diagnostics.iter().all(|d| d.molecule != "NOPDB"));
        assert!(ds
            .diagnostics
            .iter()
            .any(|d| d.molecule == "NaCl" && !d.skipped));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let tables = [
            "h\nh\nnan 1\n",
            "h\nh\n10 NaN\n",
            "h\nh\n10 inf\n",
            "h\nh\n-infinity 2\n",
        ];
        for table in tables {
            assert!(
                matches!(parse_table(table, 2), Err(IngestError::Parse { line: 3, .. })),
                "accepted {table:?}"
            );
        }
    }

    #[test]
    fn non_finite_table_skips_the_molecule() {
        let (_dir, config) = dataset_dir();
        add_molecule(&config, "CO", "h\nh\n10 1\n", Some("C\nO\n"));
        add_molecule(&config, "N2", "h\nh\nnan 1\n10 2\n", Some("N\nN\n"));

        let ds = ingest(&config, &MoleculeLabels::default()).unwrap();
        assert!(ds.get("N2").is_none());
        assert!(ds
            .diagnostics
            .iter()
            .any(|d| d.molecule == "N2" && d.skipped));
        assert!(ds
            .iter_ordered()
            .flat_map(|r| r.series.points())
            .all(|(e, xs)| e.is_finite() && xs.is_finite()));
    }

    #[test]
    fn one_table_per_identifier() {
        let (_dir, config) = dataset_dir();
        add_molecule(&config, "CO", "h\nh\n10 1\n", Some("C\nO\n"));
        write_file(&config.cross_section_dir().join("CO.v2.dat"), "h\nh\n10 9\n20 9\n");

        let ds = ingest(&config, &MoleculeLabels::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.iter_ordered().count(), ds.len());

        // Sorted first path wins: CO.dat before CO.v2.dat.
        let co = ds.get("CO").unwrap();
        assert_eq!(co.series.energy(), &[10.0]);

        let duplicates: Vec<&Diagnostic> = ds
            .diagnostics
            .iter()
            .filter(|d| d.molecule == "CO")
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert!(duplicates[0].skipped);
        assert!(duplicates[0].message.contains("CO.v2.dat"));
    }

    #[test]
    fn missing_table_directory_is_an_error() {
        let (_dir, config) = dataset_dir();
        assert!(matches!(
            ingest(&config, &MoleculeLabels::default()),
            Err(IngestError::Io { .. })
        ));
    }
}
