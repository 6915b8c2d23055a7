use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CrossSectionSeries – one curve
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
#[error("energy has {energy} values but cross section has {cross_section}")]
pub struct LengthMismatch {
    pub energy: usize,
    pub cross_section: usize,
}

/// Cross section as a function of collision energy for one molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionSeries {
    /// Collision energy in eV, in file order.
    energy: Vec<f64>,
    /// Cross section in Å² – same length as `energy`.
    cross_section: Vec<f64>,
}

impl CrossSectionSeries {
    pub fn new(energy: Vec<f64>, cross_section: Vec<f64>) -> Result<Self, LengthMismatch> {
        if energy.len() != cross_section.len() {
            return Err(LengthMismatch {
                energy: energy.len(),
                cross_section: cross_section.len(),
            });
        }
        Ok(Self {
            energy,
            cross_section,
        })
    }

    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    pub fn cross_section(&self) -> &[f64] {
        &self.cross_section
    }

    /// Iterate `(energy, cross_section)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energy
            .iter()
            .copied()
            .zip(self.cross_section.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

// ---------------------------------------------------------------------------
// StructurePayload – opaque structure file text
// ---------------------------------------------------------------------------

/// Full text of a molecule's structure file with line endings normalized
/// to `\n`. The content is otherwise untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructurePayload(String);

impl StructurePayload {
    pub fn from_text(text: &str) -> Self {
        StructurePayload(text.replace("\r\n", "\n").replace('\r', "\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// MoleculeRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MoleculeRecord {
    pub id: String,
    pub label: String,
    /// Approximate molecular mass, only used for ordering. `None` when the
    /// atom list was missing or unreadable.
    pub mass: Option<f64>,
    pub series: CrossSectionSeries,
    pub structure: StructurePayload,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A non-fatal problem found while ingesting one molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub molecule: String,
    pub message: String,
    /// `true` when the molecule was left out of the dataset.
    pub skipped: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            write!(f, "{}: skipped ({})", self.molecule, self.message)
        } else {
            write!(f, "{}: {}", self.molecule, self.message)
        }
    }
}

// ---------------------------------------------------------------------------
// MoleculeDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All successfully ingested molecules plus the problems met on the way.
#[derive(Debug, Clone, Default)]
pub struct MoleculeDataset {
    records: BTreeMap<String, MoleculeRecord>,
    /// Identifiers sorted by mass (unknown masses last), then identifier.
    order: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MoleculeDataset {
    /// Build the dataset. Records are keyed by identifier, so a repeated
    /// identifier keeps its last record and appears once in the order.
    pub fn new(records: Vec<MoleculeRecord>, diagnostics: Vec<Diagnostic>) -> Self {
        let records: BTreeMap<String, MoleculeRecord> =
            records.into_iter().map(|r| (r.id.clone(), r)).collect();

        let mut sorted: Vec<&MoleculeRecord> = records.values().collect();
        sorted.sort_by(|a, b| {
            let by_mass = match (a.mass, b.mass) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_mass.then_with(|| a.id.cmp(&b.id))
        });
        let order = sorted.into_iter().map(|r| r.id.clone()).collect();

        MoleculeDataset {
            records,
            order,
            diagnostics,
        }
    }

    pub fn get(&self, id: &str) -> Option<&MoleculeRecord> {
        self.records.get(id)
    }

    /// Records for the requested identifiers, in request order. Unknown
    /// identifiers are ignored.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&MoleculeRecord> {
        ids.iter()
            .filter_map(|id| self.records.get(id.as_ref()))
            .collect()
    }

    /// Records in display order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &MoleculeRecord> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, mass: Option<f64>) -> MoleculeRecord {
        MoleculeRecord {
            id: id.to_string(),
            label: id.to_string(),
            mass,
            series: CrossSectionSeries::new(vec![1.0], vec![2.0]).unwrap(),
            structure: StructurePayload::from_text(""),
        }
    }

    #[test]
    fn series_rejects_unequal_lengths() {
        let err = CrossSectionSeries::new(vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            LengthMismatch {
                energy: 2,
                cross_section: 1
            }
        );
    }

    #[test]
    fn payload_normalizes_line_endings() {
        let payload = StructurePayload::from_text("ATOM 1\r\nATOM 2\rEND\n");
        assert_eq!(payload.as_str(), "ATOM 1\nATOM 2\nEND\n");
    }

    #[test]
    fn display_order_is_by_mass_then_id_with_unknown_last() {
        let ds = MoleculeDataset::new(
            vec![
                record("CO2", Some(44.0)),
                record("X", None),
                record("H2O", Some(18.0)),
                record("N2O", Some(44.0)),
            ],
            Vec::new(),
        );
        let ids: Vec<&str> = ds.iter_ordered().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["H2O", "CO2", "N2O", "X"]);
    }

    #[test]
    fn repeated_id_is_listed_once() {
        let ds = MoleculeDataset::new(
            vec![record("CO", Some(28.0)), record("CO", Some(28.0))],
            Vec::new(),
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.iter_ordered().count(), ds.len());
    }

    #[test]
    fn select_keeps_request_order_and_skips_unknown() {
        let ds = MoleculeDataset::new(
            vec![record("A", Some(1.0)), record("B", Some(2.0))],
            Vec::new(),
        );
        let ids: Vec<&str> = ds
            .select(&["B", "missing", "A"])
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, ["B", "A"]);
    }
}
