use std::path::Path;
use std::process::ExitCode;

use gs_inp::Deck;
use gs_io::{RunReport, format_solution, format_system, format_trace_table, unknown_names, write_report};
use gs_model::SystemDefinition;
use gs_solver::{
    DEFAULT_DOMINANCE_EPSILON, SolvePipeline, SolveReport, SolverConfig, failing_rows,
    is_strictly_dominant,
};
use nalgebra::DMatrix;

fn usage() {
    eprintln!("usage:");
    eprintln!("  gs-cli check <system.inp>");
    eprintln!("  gs-cli solve <system.inp>");
    eprintln!("  gs-cli report <system.inp> [out.json]");
}

fn load(path: &Path) -> Result<(SystemDefinition, SolverConfig), String> {
    let deck = Deck::parse_file(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let system =
        SystemDefinition::from_deck(&deck).map_err(|err| format!("{}: {err}", path.display()))?;
    let config = SolverConfig::from_deck(&deck).map_err(|err| format!("{}: {err}", path.display()))?;
    log::debug!(
        "loaded {}x{} system from {}",
        system.size(),
        system.size(),
        path.display()
    );
    Ok((system, config))
}

fn run(path: &Path) -> Result<SolveReport, String> {
    let (system, config) = load(path)?;
    SolvePipeline::new(config)
        .run(&system)
        .map_err(|err| format!("solver error: {err}"))
}

fn check_file(path: &Path) -> Result<bool, String> {
    let (system, config) = load(path)?;
    let n = system.size();
    let a = DMatrix::from_row_iterator(n, n, system.coefficients());
    let epsilon = config.dominance_epsilon;

    let dominant = is_strictly_dominant(&a, epsilon);
    println!("size: {n}x{n}");
    println!("epsilon: {epsilon:e}");
    println!("strictly_dominant: {dominant}");
    if !dominant {
        let rows: Vec<String> = failing_rows(&a, epsilon)
            .iter()
            .map(|r| (r + 1).to_string())
            .collect();
        println!("failing_rows: {}", rows.join(", "));
    }
    if epsilon != DEFAULT_DOMINANCE_EPSILON {
        log::info!("using non-default dominance epsilon {epsilon:e}");
    }
    Ok(dominant)
}

fn solve_file(path: &Path) -> Result<bool, String> {
    let report = run(path)?;

    println!("Dominance: {}", report.dominance.describe());
    println!("\nSystem solved:");
    print!("{}", format_system(&report.matrix, &report.rhs));
    if !report.boosted_rows.is_empty() {
        let rows: Vec<String> = report.boosted_rows.iter().map(|r| (r + 1).to_string()).collect();
        println!("(diagonal boosted in rows {}; this is not the input system)", rows.join(", "));
    }

    println!();
    let names = unknown_names(report.rhs.len());
    print!("{}", format_trace_table(&report.outcome.trace, &names));

    println!("\nSolution:");
    print!("{}", format_solution(&report.outcome));
    Ok(report.outcome.converged())
}

fn report_file(path: &Path, out: Option<&Path>) -> Result<bool, String> {
    let solved = run(path)?;
    let timestamp = chrono::Utc::now().to_rfc3339();
    let report = RunReport::from_solve(path.display().to_string(), timestamp, &solved);

    match out {
        Some(out) => {
            write_report(out, &report).map_err(|err| format!("{}: {err}", out.display()))?;
            log::info!("report written to {}", out.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|err| format!("failed to encode report: {err}"))?;
            println!("{json}");
        }
    }
    Ok(solved.outcome.converged())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("check") if args.len() == 3 => check_file(Path::new(&args[2])),
        Some("solve") if args.len() == 3 => solve_file(Path::new(&args[2])),
        Some("report") if args.len() == 3 || args.len() == 4 => {
            report_file(Path::new(&args[2]), args.get(3).map(Path::new))
        }
        _ => {
            usage();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(1)
        }
    }
}
