//! Deterministic sample-data generator: writes an EAF export CSV and a
//! matching variable-schedule CSV for demos and manual testing.

use anyhow::{Context, Result};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let grades = ["G1234", "G5678", "G9012"];
    let families = ["F-BAR", "F-ROD", "F-WIRE"];
    let heats_per_day = 8;
    let days = 30;
    // 2023-03-15 as a spreadsheet day serial
    let first_serial = 45_000.0;

    // ---- EAF export ----
    let export_path = "sample_eaf.csv";
    let mut writer = csv::Writer::from_path(export_path)
        .with_context(|| format!("creating {export_path}"))?;
    writer.write_record([
        "colada",
        "fecha_colada",
        "grado_acero",
        "familia",
        "Status",
        "kwh_total",
        "kwh_tap4_original",
        "kwh_tap4_optimo",
    ])?;

    let mut heat_no = 7000;
    for day in 0..days {
        for slot in 0..heats_per_day {
            heat_no += 1;
            let serial = first_serial + day as f64 + slot as f64 / heats_per_day as f64;
            let grade = grades[(rng.next_u64() % grades.len() as u64) as usize];
            let family = families[(rng.next_u64() % families.len() as u64) as usize];
            let optimized = rng.next_f64() < 0.8;

            let total = rng.gauss(42_000.0, 2_500.0);
            let original = rng.gauss(4_200.0, 350.0);
            // the model usually shaves a few percent off, sometimes loses
            let optimum = original - rng.gauss(80.0, 60.0);

            // ~5 % of rows arrive with the sub-measurements missing
            let incomplete = rng.next_f64() < 0.05;
            let fmt_opt = |v: f64| if incomplete { String::new() } else { format!("{v:.1}") };

            writer.write_record([
                heat_no.to_string(),
                format!("{serial:.5}"),
                grade.to_string(),
                family.to_string(),
                (if optimized { "1" } else { "0" }).to_string(),
                format!("{total:.1}"),
                fmt_opt(original),
                fmt_opt(optimum),
            ])?;
        }
    }
    writer.flush()?;
    println!("Wrote {} heats to {export_path}", heat_no - 7000);

    // ---- Variable schedule (grade validity windows, for the PIT join) ----
    let schedule_path = "sample_schedule.csv";
    let mut writer = csv::Writer::from_path(schedule_path)
        .with_context(|| format!("creating {schedule_path}"))?;
    writer.write_record(["CodArtic", "FecInici", "FecFinal"])?;

    let mut serial = first_serial;
    let mut windows = 0;
    while serial < first_serial + days as f64 {
        let grade = grades[(rng.next_u64() % grades.len() as u64) as usize];
        // windows of 4–16 hours
        let span_days = (4.0 + rng.next_f64() * 12.0) / 24.0;
        writer.write_record([
            format!("ART-{grade}"),
            format!("{serial:.5}"),
            format!("{:.5}", serial + span_days),
        ])?;
        serial += span_days;
        windows += 1;
    }
    writer.flush()?;
    println!("Wrote {windows} schedule windows to {schedule_path}");

    Ok(())
}
