use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// Identifier → display label, as listed in the catalog file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoleculeLabels {
    labels: BTreeMap<String, String>,
}

impl MoleculeLabels {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Display label for `id`, falling back to the identifier itself.
    pub fn label_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Parse catalog text: one `<identifier> <label>` pair per line.
///
/// Lines with fewer than two tokens are skipped. Tokens after the second
/// are ignored. A repeated identifier keeps its last label.
pub fn parse_catalog(text: &str) -> MoleculeLabels {
    let mut labels = BTreeMap::new();
    for (line_no, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(id), Some(label)) => {
                labels.insert(id.to_string(), label.to_string());
            }
            (None, _) => {}
            (Some(id), None) => {
                log::warn!("Catalog line {}: '{id}' has no label, skipping", line_no + 1);
            }
        }
    }
    MoleculeLabels { labels }
}

/// Read and parse the catalog file. A missing file yields an empty catalog.
pub fn load_catalog(path: &Path) -> io::Result<MoleculeLabels> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let labels = parse_catalog(&text);
            if labels.is_empty() {
                log::warn!("Catalog {} has no entries", path.display());
            } else {
                log::info!("Read {} catalog labels from {}", labels.len(), path.display());
            }
            Ok(labels)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Catalog {} not found, using identifiers as labels", path.display());
            Ok(MoleculeLabels::default())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_valid_line_maps_id_to_second_token() {
        let labels = parse_catalog("CO CO\nH2O H$_2$O\nC2H2 C$_2$H$_2$ extra\n");
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get("H2O"), Some("H$_2$O"));
        assert_eq!(labels.get("C2H2"), Some("C$_2$H$_2$"));
    }

    #[test]
    fn short_and_blank_lines_are_skipped() {
        let labels = parse_catalog("CO CO\nlonely\n\n   \nNH3 NH$_3$\n");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("lonely"), None);
    }

    #[test]
    fn repeated_id_keeps_last_label() {
        let labels = parse_catalog("CO first\nCO second\n");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("CO"), Some("second"));
    }

    #[test]
    fn label_falls_back_to_identifier() {
        let labels = parse_catalog("CO carbon-monoxide\n");
        assert_eq!(labels.label_for("CO"), "carbon-monoxide");
        assert_eq!(labels.label_for("HCN"), "HCN");
    }

    #[test]
    fn missing_catalog_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let labels = load_catalog(&dir.path().join("molLatex.txt")).unwrap();
        assert!(labels.is_empty());
    }
}
