use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Sampling rate of the synthetic vibration signals (Hz).
const SAMPLE_RATE: f64 = 5_000.0;
const NUM_COLUMNS: usize = 7;

/// Box-Muller transform for normal noise.
fn gauss(rng: &mut ChaCha8Rng, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// One measurement: a shaft-frequency sine per channel plus a fault
/// harmonic, with a slightly different length per file.
fn write_measurement(
    path: &Path,
    rows: usize,
    shaft_hz: f64,
    fault_harmonic: Option<f64>,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let header: Vec<String> = (0..NUM_COLUMNS).map(|c| format!("ch{c}")).collect();
    writer.write_record(&header)?;

    for i in 0..rows {
        let t = i as f64 / SAMPLE_RATE;
        let record: Vec<String> = (0..NUM_COLUMNS)
            .map(|c| {
                let phase = c as f64 * PI / NUM_COLUMNS as f64;
                let mut v = (2.0 * PI * shaft_hz * t + phase).sin();
                if let Some(h) = fault_harmonic {
                    v += 0.3 * (2.0 * PI * shaft_hz * h * t).sin();
                }
                format!("{:.6}", v + gauss(rng, 0.05))
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let cases = [("Healthy", None), ("Bearing_fault", Some(3.6)), ("Gear_fault", Some(2.0))];
    // (speed frequency, load percent, rpm)
    let conditions = [(10, 50, 600), (20, 50, 1200), (40, 100, 2400)];
    let files_per_subcase = 4;

    let mut written = 0;
    for (case, harmonic) in &cases {
        for &(hz, load, rpm) in &conditions {
            let subcase = out_dir.join(case).join(format!("{hz}hz_{load}%_{rpm}rpm"));
            std::fs::create_dir_all(&subcase)
                .with_context(|| format!("creating {}", subcase.display()))?;
            for i in 0..files_per_subcase {
                let rows = rng.gen_range(900..=1000);
                let path = subcase.join(format!("measurement_{i}.csv"));
                write_measurement(&path, rows, rpm as f64 / 60.0, *harmonic, &mut rng)?;
                written += 1;
            }
        }
    }

    println!(
        "Wrote {written} measurement files ({NUM_COLUMNS} columns each) under {}",
        out_dir.display()
    );
    Ok(())
}
