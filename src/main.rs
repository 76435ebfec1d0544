use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use furnace_lens::data::loader;
use furnace_lens::{AnalysisSession, FilterCriteria, FurnaceProfile, GradeSchedule};

const USAGE: &str = "usage: furnace-lens <export.csv|json> [schedule.csv] [--pit] [--optimized-only]";

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut export = None;
    let mut schedule = None;
    let mut profile = FurnaceProfile::eaf();
    let mut criteria = FilterCriteria::default();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--pit" => profile = FurnaceProfile::pit(),
            "--optimized-only" => criteria.optimized_only = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            path if export.is_none() => export = Some(path.to_string()),
            path => schedule = Some(path.to_string()),
        }
    }
    let export = export.context(USAGE)?;

    let mut session = AnalysisSession::new(profile);
    session.set_dataset(
        loader::load_file(Path::new(&export))
            .with_context(|| format!("loading {export}"))?,
    );
    if let Some(sched_path) = schedule {
        let table = loader::load_file(Path::new(&sched_path))
            .with_context(|| format!("loading schedule {sched_path}"))?;
        session.set_schedule(GradeSchedule::from_records(&table.records));
    }
    session.apply_criteria(criteria);

    print_report(&session);
    Ok(())
}

fn print_report(session: &AnalysisSession) {
    let filtered = session.filtered();
    println!(
        "{} of {} heats pass the current filter",
        filtered.len(),
        session.dataset().len()
    );

    match session.improvement_summary() {
        Some(s) => println!(
            "improvement %: mean {:.2}  min {:.2}  max {:.2}  stddev {:.2}",
            s.mean, s.min, s.max, s.stddev
        ),
        None => println!("improvement %: no data"),
    }

    let bins = session.consumption_distribution(10);
    if bins.is_empty() {
        println!("distribution: no data");
        return;
    }
    println!("\n{:<16} {:>9} {:>9} {:>9} {:>7}", "interval", "only-orig", "only-opt", "overlap", "total");
    for bin in bins {
        println!(
            "{:<16} {:>9} {:>9} {:>9} {:>7}",
            bin.label, bin.only_a, bin.only_b, bin.overlap, bin.total
        );
    }
}
