use anyhow::Result;
use blastn_seed::api::local_scan;
use blastn_seed::blastinput::ScanArgs;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blastn-seed")]
#[command(version = "0.1.0")]
#[command(about = "Nucleotide word hit finding and ungapped extension", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find, admit and extend word hits of FASTA queries against FASTA subjects
    Scan(ScanArgs),
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            setup_logging(args.verbose);
            local_scan::run(args)?;
        }
    }
    Ok(())
}
