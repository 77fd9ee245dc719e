use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic Palmer-penguins-shaped CSV for offline use.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", version)]
struct Args {
    /// Output CSV path.
    #[arg(default_value = "sample_penguins.csv")]
    output: PathBuf,

    /// Number of rows to generate.
    #[arg(long, default_value_t = 344)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Mean and standard deviation per measurement, plus where the species lives.
struct Profile {
    species: &'static str,
    islands: &'static [&'static str],
    bill_length: (f64, f64),
    bill_depth: (f64, f64),
    flipper_length: (f64, f64),
    body_mass: (f64, f64),
}

static PROFILES: [Profile; 3] = [
    Profile {
        species: "Adelie",
        islands: &["Torgersen", "Biscoe", "Dream"],
        bill_length: (38.8, 2.7),
        bill_depth: (18.3, 1.2),
        flipper_length: (190.0, 6.5),
        body_mass: (3700.0, 458.0),
    },
    Profile {
        species: "Chinstrap",
        islands: &["Dream"],
        bill_length: (48.8, 3.3),
        bill_depth: (18.4, 1.1),
        flipper_length: (195.8, 7.1),
        body_mass: (3733.0, 384.0),
    },
    Profile {
        species: "Gentoo",
        islands: &["Biscoe"],
        bill_length: (47.5, 3.1),
        bill_depth: (15.0, 1.0),
        flipper_length: (217.2, 6.5),
        body_mass: (5076.0, 504.0),
    },
];

/// Share of measurements left blank, to exercise missing-value handling.
const MISSING_RATE: f64 = 0.01;

#[derive(Serialize)]
struct Row {
    species: &'static str,
    island: &'static str,
    bill_length_mm: Option<f64>,
    bill_depth_mm: Option<f64>,
    flipper_length_mm: Option<f64>,
    body_mass_g: Option<f64>,
    sex: Option<&'static str>,
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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let i = (self.next_f64() * items.len() as f64) as usize;
        &items[i.min(items.len() - 1)]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// A rounded normal draw, or nothing at `MISSING_RATE`.
    fn measurement(&mut self, (mean, std_dev): (f64, f64), decimals: i32) -> Option<f64> {
        if self.next_f64() < MISSING_RATE {
            return None;
        }
        let scale = 10f64.powi(decimals);
        Some((self.gauss(mean, std_dev) * scale).round() / scale)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    for i in 0..args.rows {
        let profile = &PROFILES[i % PROFILES.len()];
        let row = Row {
            species: profile.species,
            island: *rng.pick(profile.islands),
            bill_length_mm: rng.measurement(profile.bill_length, 1),
            bill_depth_mm: rng.measurement(profile.bill_depth, 1),
            flipper_length_mm: rng.measurement(profile.flipper_length, 0),
            body_mass_g: rng.measurement(profile.body_mass, 0),
            sex: (rng.next_f64() >= 0.03).then(|| *rng.pick(&["Male", "Female"])),
        };
        writer
            .serialize(&row)
            .with_context(|| format!("writing row {i}"))?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {} penguins to {}", args.rows, args.output.display());
    Ok(())
}
