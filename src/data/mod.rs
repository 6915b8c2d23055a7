/// Data layer: catalog, ingestion, memoized store, export.
///
/// Architecture:
/// ```text
///  molLatex.txt      BEB/*.dat + pdbs/*.pdb + xyz/*.xyz
///       │                      │
///       ▼                      ▼
///   ┌─────────┐          ┌──────────┐
///   │ catalog │ ───────▶ │  loader  │  parse, convert to Å², filter, skip bad molecules
///   └─────────┘          └──────────┘
///                              │
///                              ▼
///                     ┌─────────────────┐
///                     │ store           │  one load per dataset root, shared Arc
///                     │ MoleculeDataset │
///                     └─────────────────┘
///                              │
///                              ▼
///                        ┌──────────┐
///                        │  export  │  selected series → CSV
///                        └──────────┘
/// ```

pub mod catalog;
pub mod constants;
pub mod export;
pub mod loader;
pub mod model;
pub mod store;
