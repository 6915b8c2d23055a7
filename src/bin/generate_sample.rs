use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Rough BEB-like ionization curve in atomic units of area:
/// zero below threshold, rising to a peak and falling off as ln(E)/E.
fn beb_like(energy: f64, threshold: f64, amplitude: f64) -> f64 {
    if energy <= threshold {
        return 0.0;
    }
    let t = energy / threshold;
    amplitude * (1.0 - 1.0 / t) * t.ln() / t
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[-half_width, half_width)`.
    fn jitter(&mut self, half_width: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * half_width
    }
}

struct SampleMolecule {
    id: &'static str,
    label: &'static str,
    /// Ionization threshold in eV.
    threshold: f64,
    /// Peak scale in atomic units of area.
    amplitude: f64,
    /// Element symbol and Cartesian coordinates in Å.
    atoms: &'static [(&'static str, [f64; 3])],
    /// Write the table with an extra middle column.
    three_columns: bool,
}

const MOLECULES: &[SampleMolecule] = &[
    SampleMolecule {
        id: "H2",
        label: "H$_2$",
        threshold: 15.4,
        amplitude: 3.4,
        atoms: &[("H", [0.0, 0.0, 0.0]), ("H", [0.0, 0.0, 0.74])],
        three_columns: false,
    },
    SampleMolecule {
        id: "H2O",
        label: "H$_2$O",
        threshold: 12.6,
        amplitude: 7.5,
        atoms: &[
            ("O", [0.0, 0.0, 0.117]),
            ("H", [0.0, 0.757, -0.467]),
            ("H", [0.0, -0.757, -0.467]),
        ],
        three_columns: true,
    },
    SampleMolecule {
        id: "CO",
        label: "CO",
        threshold: 14.0,
        amplitude: 9.6,
        atoms: &[("C", [0.0, 0.0, 0.0]), ("O", [0.0, 0.0, 1.128])],
        three_columns: false,
    },
    SampleMolecule {
        id: "CO2",
        label: "CO$_2$",
        threshold: 13.8,
        amplitude: 14.1,
        atoms: &[
            ("C", [0.0, 0.0, 0.0]),
            ("O", [0.0, 0.0, 1.16]),
            ("O", [0.0, 0.0, -1.16]),
        ],
        three_columns: true,
    },
    SampleMolecule {
        id: "H2S",
        label: "H$_2$S",
        threshold: 10.5,
        amplitude: 15.0,
        atoms: &[
            ("S", [0.0, 0.0, 0.103]),
            ("H", [0.0, 0.962, -0.825]),
            ("H", [0.0, -0.962, -0.825]),
        ],
        three_columns: false,
    },
];

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create output directory");
    }
    fs::write(path, content).expect("Failed to write output file");
}

fn beb_table(mol: &SampleMolecule, energies: &[f64], rng: &mut SimpleRng) -> String {
    let mut out = String::new();
    writeln!(out, "# BEB cross section for {} (atomic units)", mol.id).unwrap();
    if mol.three_columns {
        writeln!(out, "# E(eV)  T/B  sigma(a0^2)").unwrap();
    } else {
        writeln!(out, "# E(eV)  sigma(a0^2)").unwrap();
    }

    let amplitude = mol.amplitude * (1.0 + rng.jitter(0.05));
    for &e in energies {
        let sigma = beb_like(e, mol.threshold, amplitude);
        if mol.three_columns {
            writeln!(out, "{e:.4e}  {:.4e}  {sigma:.6e}", e / mol.threshold).unwrap();
        } else {
            writeln!(out, "{e:.4e}  {sigma:.6e}").unwrap();
        }
    }
    out
}

fn xyz_file(mol: &SampleMolecule) -> String {
    let mut out = String::new();
    for (symbol, [x, y, z]) in mol.atoms {
        writeln!(out, "{symbol} {x:.4} {y:.4} {z:.4}").unwrap();
    }
    out
}

fn pdb_file(mol: &SampleMolecule) -> String {
    let mut out = String::new();
    writeln!(out, "COMPND    {}", mol.id).unwrap();
    for (i, (symbol, [x, y, z])) in mol.atoms.iter().enumerate() {
        writeln!(
            out,
            "HETATM{:>5} {:<4} UNL     1    {x:>8.3}{y:>8.3}{z:>8.3}  1.00  0.00          {symbol:>2}",
            i + 1,
            format!("{symbol}{}", i + 1),
        )
        .unwrap();
    }
    writeln!(out, "END").unwrap();
    out
}

fn main() {
    let root = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    let mut rng = SimpleRng::new(42);

    // Energies: 10 eV → 10 keV, log-spaced. Rows above 5 keV exercise the ceiling.
    let energies: Vec<f64> = (0..120)
        .map(|i| 10f64.powf(1.0 + 3.0 * i as f64 / 119.0))
        .collect();

    let mut catalog = String::new();
    for mol in MOLECULES {
        writeln!(catalog, "{} {}", mol.id, mol.label).unwrap();
        write_file(
            &root.join("BEB").join(format!("{}.dat", mol.id)),
            &beb_table(mol, &energies, &mut rng),
        );
        write_file(&root.join("xyz").join(format!("{}.xyz", mol.id)), &xyz_file(mol));
        write_file(&root.join("pdbs").join(format!("{}.pdb", mol.id)), &pdb_file(mol));
    }
    write_file(&root.join("molLatex.txt"), &catalog);

    println!(
        "Wrote {} molecules ({} energies each) to {}",
        MOLECULES.len(),
        energies.len(),
        root.display()
    );
}
