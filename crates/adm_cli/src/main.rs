//! `adm` — load a scenario, run admission and/or migration, emit a JSON
//! report with a digest of the terminal allocation.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const EXHAUSTED: i32 = 3;
    pub const IO: i32 = 4;
}

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use adm_engine::{Admission, EngineError, RoundSnapshot};
use adm_io::{allocation_digest, load_scenario, to_canonical_bytes, IoError};
use args::Args;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Scenario shape or configuration failures.
    Validation(String),
    /// Admission ran out of admissible resources mid-run.
    Exhausted(String),
    /// Filesystem / JSON emission errors.
    Io(String),
}

impl From<IoError> for MainError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Read(m) => MainError::Io(m),
            IoError::Json(m) | IoError::Scenario(m) | IoError::Config(m) => {
                MainError::Validation(m)
            }
        }
    }
}

impl From<EngineError> for MainError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::ResourceExhausted => MainError::Exhausted(e.to_string()),
            // CapacityExceeded is an invariant breach; report it as a
            // validation-class failure rather than panicking.
            other => MainError::Validation(other.to_string()),
        }
    }
}

fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Exhausted(_) => exitcodes::EXHAUSTED,
        MainError::Io(_) => exitcodes::IO,
    }
}

/// Report document printed to stdout.
#[derive(Debug, Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    admissions: Option<Vec<Admission>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rounds: Option<Vec<RoundSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_allocation: Option<adm_engine::FinalAllocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allocation_sha256: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let rc = match run_once(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            let msg = match &e {
                MainError::Validation(m) | MainError::Exhausted(m) | MainError::Io(m) => m,
            };
            eprintln!("adm: error: {msg}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let scenario = load_scenario(&args.scenario)?;

    if args.validate_only {
        // Exercise the setup builders without running anything.
        if let Some(admission) = &scenario.admission {
            admission.build_service(args.seed)?;
        }
        if let Some(migration) = &scenario.migration {
            migration.build_engine()?;
        }
        if !args.quiet {
            eprintln!("adm: scenario is valid");
        }
        return Ok(());
    }

    let mut report = Report {
        admissions: None,
        rounds: None,
        final_allocation: None,
        allocation_sha256: None,
    };

    if let Some(admission) = &scenario.admission {
        let mut service = admission.build_service(args.seed)?;
        let mut admitted = Vec::with_capacity(admission.applicants.len());
        for applicant in &admission.applicants {
            admitted.push(service.admit(applicant)?);
        }
        report.admissions = Some(admitted);
    }

    if let Some(migration) = &scenario.migration {
        let mut engine = migration.build_engine()?;
        let mut provider = migration.decisions.build_provider();
        let rounds = args.rounds.unwrap_or(migration.rounds);
        let allocation = engine.run(rounds, &mut provider);

        report.rounds = Some(engine.snapshots().to_vec());
        report.allocation_sha256 = Some(allocation_digest(&allocation)?);
        report.final_allocation = Some(allocation);
    }

    let stdout = if args.pretty {
        serde_json::to_string_pretty(&report).map_err(|e| MainError::Io(e.to_string()))?
    } else {
        String::from_utf8(to_canonical_bytes(&report)?)
            .map_err(|e| MainError::Io(e.to_string()))?
    };
    println!("{stdout}");
    Ok(())
}
