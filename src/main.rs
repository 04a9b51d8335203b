use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use movielens_interchange::{
    reporter::ReportError, ConversionReport, ConversionReporter, Converter, InputPaths,
    ReportFormat, SchemaVariant,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit code when a conversion phase failed
const EXIT_PHASE_FAILED: u8 = 1;
/// Exit code when fewer than three input files were given
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "movielens-interchange")]
#[command(about = "Convert MovieLens rating datasets to the entities/relations interchange format")]
struct Args {
    /// User data file (u.user or users.dat)
    users_file: PathBuf,

    /// Item data file (u.item or movies.dat)
    items_file: PathBuf,

    /// Rating data file (u.data or ratings.dat)
    ratings_file: PathBuf,

    /// Directory for entities.dat and relations.dat (defaults to the current directory)
    output_dir: Option<PathBuf>,

    /// Layout of the input files
    #[arg(long, value_enum, default_value_t = SchemaVariant::Ml100k)]
    schema: SchemaVariant,

    /// Format of the summary printed after conversion
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            print_usage();
            return ExitCode::from(EXIT_USAGE);
        }
        Err(e) => e.exit(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match convert(&args) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_PHASE_FAILED),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            ExitCode::from(EXIT_PHASE_FAILED)
        }
    }
}

fn print_usage() {
    let mut command = Args::command();
    if let Err(e) = command.print_help() {
        eprintln!("Failed to print usage: {}", e);
    }
    println!();
    println!("Please enter the paths to the required files.");
    println!("You need at least three arguments: user's data, item's data and rating's data.");
    println!("The 4th argument (optional) defines the path to the output directory.");
}

/// Run both conversion phases and print the summary
fn convert(args: &Args) -> Result<ConversionReport, ReportError> {
    let output_dir = args.output_dir.clone().unwrap_or_default();
    let inputs = InputPaths {
        users: args.users_file.clone(),
        items: args.items_file.clone(),
        ratings: args.ratings_file.clone(),
    };

    info!(schema = %args.schema, output = %output_dir.display(), "starting conversion");

    let converter = Converter::new(args.schema);
    let outcome = converter.run(&inputs, &output_dir);

    let reporter = ConversionReporter::new().with_format(args.report);
    let report = reporter.generate_report(args.schema, &output_dir, &outcome);
    println!("{}", reporter.format_report(&report)?);

    Ok(report)
}
