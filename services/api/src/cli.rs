use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use placement_portal::error::AppError;
use placement_portal::workflows::placement::{
    eligibility, AcademicRecord, DegreeMatch, EligibilityCriteria, EligibilityEvaluator,
    EligibilityVerdict, RawAcademicRecord,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Placement Portal",
    about = "Run the placement application gate or check eligibility offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate eligibility criteria against a stored academic record
    Eligibility {
        #[command(subcommand)]
        command: EligibilityCommand,
    },
}

#[derive(Subcommand, Debug)]
enum EligibilityCommand {
    /// Print the verdict for one criteria string and one record file
    Check(EligibilityCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct EligibilityCheckArgs {
    /// Criteria text, e.g. "Degree: B.Tech; MinCGPA: 7.5"
    #[arg(long)]
    pub(crate) criteria: String,
    /// JSON file holding the academic record (object or JSON-encoded string)
    #[arg(long)]
    pub(crate) record: PathBuf,
    /// Degree comparison to apply
    #[arg(long, value_enum, default_value_t = DegreeStrategy::Containment)]
    pub(crate) strategy: DegreeStrategy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DegreeStrategy {
    Containment,
    Bucket,
}

impl From<DegreeStrategy> for DegreeMatch {
    fn from(strategy: DegreeStrategy) -> Self {
        match strategy {
            DegreeStrategy::Containment => DegreeMatch::Containment,
            DegreeStrategy::Bucket => DegreeMatch::Bucket,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EligibilityReport {
    pub(crate) criteria: EligibilityCriteria,
    pub(crate) verdict: EligibilityVerdict,
    pub(crate) summary: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Eligibility {
            command: EligibilityCommand::Check(args),
        } => {
            let report = check_eligibility(&args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

pub(crate) fn check_eligibility(
    args: &EligibilityCheckArgs,
) -> Result<EligibilityReport, AppError> {
    let contents = std::fs::read_to_string(&args.record)?;
    let raw: RawAcademicRecord = serde_json::from_str(&contents)?;
    let record = AcademicRecord::from_raw(Some(raw));

    let criteria = eligibility::parse(Some(&args.criteria));
    let verdict = EligibilityEvaluator::new(args.strategy.into()).evaluate(&criteria, &record);
    let summary = verdict.summary();

    Ok(EligibilityReport {
        criteria,
        verdict,
        summary,
    })
}
