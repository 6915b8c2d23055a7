//! Physical constants and fixed lookup tables used during ingestion.

// ---------------------------------------------------------------------------
// Unit conversion
// ---------------------------------------------------------------------------

/// Bohr radius a₀ in Ångström (CODATA 2018).
pub const BOHR_RADIUS_ANGSTROM: f64 = 0.529177210903;

/// One atomic unit of area (a₀²) expressed in Å².
///
/// The BEB tables are tabulated in atomic units; multiplying by this factor
/// yields cross sections in Å².
pub const ATOMIC_UNIT_TO_ANGSTROM2: f64 = BOHR_RADIUS_ANGSTROM * BOHR_RADIUS_ANGSTROM;

// ---------------------------------------------------------------------------
// Ingestion defaults
// ---------------------------------------------------------------------------

/// Highest collision energy kept in a series, in eV. Inclusive.
pub const DEFAULT_ENERGY_CEILING_EV: f64 = 5000.0;

/// Number of header lines preceding the numeric table in a BEB file.
pub const DEFAULT_HEADER_LINES: usize = 2;

/// Maximum number of molecules selectable at once in the UI.
pub const MAX_SELECTIONS: usize = 5;

// ---------------------------------------------------------------------------
// Atomic weights
// ---------------------------------------------------------------------------

/// Nominal atomic weights (g/mol, rounded to the mass number of the most
/// abundant isotope). Only good enough to order molecules by size.
const ATOMIC_WEIGHTS: [(&str, f64); 6] = [
    ("H", 1.0),
    ("C", 12.0),
    ("N", 14.0),
    ("O", 16.0),
    ("S", 32.0),
    ("P", 31.0),
];

/// Look up the nominal weight of an element symbol (case-sensitive).
pub fn atomic_weight(symbol: &str) -> Option<f64> {
    ATOMIC_WEIGHTS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|&(_, w)| w)
}
