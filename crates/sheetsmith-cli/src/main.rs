mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sheetsmith",
    version,
    about = "Convert statement and invoice PDFs into spreadsheets, and compile spreadsheet batches"
)]
struct Cli {
    /// Log pipeline decisions (pages, phases, sealed tables) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a monthly statement PDF into Summary, prepayment and reconciliation sheets
    Statement {
        /// Path to the statement PDF
        input_file: PathBuf,

        /// Custom statement layout JSON (default: built-in "statement" preset)
        #[arg(short, long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Workbook to write (default: <input>_converted.xlsx next to the input)
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Also print the extracted tables: table or json
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<String>,
    },
    /// Extract a single line-item table, such as an invoice
    Invoice {
        /// Path to the invoice PDF
        input_file: PathBuf,

        /// Custom table profile JSON (default: built-in "invoice" preset)
        #[arg(short, long, value_name = "FILE")]
        profile: Option<PathBuf>,

        /// Workbook to write (default: <input>_converted.xlsx next to the input)
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Also print the extracted table: table or json
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<String>,
    },
    /// Lay out every page with a column structure as a grid, without header knowledge
    Grid {
        /// Path to the PDF
        input_file: PathBuf,

        /// Workbook to write (default: <input>_converted.xlsx next to the input)
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Also print the extracted grid: table or json
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<String>,
    },
    /// Merge the first sheet of each spreadsheet (or ZIP of spreadsheets) into one workbook
    Compile {
        /// Spreadsheets (.xlsx, .xls, .csv) or ZIP archives of them
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Workbook to write
        #[arg(short = 'o', long = "out", value_name = "FILE", default_value = "compiled-report.xlsx")]
        out: PathBuf,
    },
    /// Flatten daily capacity reliability workbooks into one dated table
    Capacity {
        /// Capacity workbooks
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Workbook to write (default: Capacity-Reliability-Compiled-<today>.xlsx)
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Also print the compiled records: table or json
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<String>,
    },
    /// Inspect and validate table profiles
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,
    },
    /// Serve the spreadsheet compiler over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,

        /// Largest accepted request body, in megabytes
        #[arg(long, default_value_t = 50)]
        max_upload_mb: usize,
    },
}

#[derive(Subcommand)]
enum ProfilesAction {
    /// List built-in presets
    List,
    /// Print a preset's JSON, as a starting point for a custom profile
    Show {
        /// Preset name (e.g., "statement")
        preset: String,
    },
    /// Validate a custom profile or statement layout file
    Validate {
        /// Path to JSON profile file
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sheetsmith=debug" } else { "sheetsmith=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Statement {
            input_file,
            layout,
            out,
            format,
        } => commands::convert::statement(input_file, layout, out, format.as_deref()),
        Commands::Invoice {
            input_file,
            profile,
            out,
            format,
        } => commands::convert::invoice(input_file, profile, out, format.as_deref()),
        Commands::Grid {
            input_file,
            out,
            format,
        } => commands::convert::grid(input_file, out, format.as_deref()),
        Commands::Compile { files, out } => commands::batch::compile(files, out),
        Commands::Capacity { files, out, format } => {
            commands::batch::capacity(files, out, format.as_deref())
        }
        Commands::Profiles { action } => match action {
            ProfilesAction::List => commands::profiles::list(),
            ProfilesAction::Show { preset } => commands::profiles::show(&preset),
            ProfilesAction::Validate { file } => commands::profiles::validate(&file),
        },
        Commands::Serve {
            addr,
            max_upload_mb,
        } => commands::serve::run(&addr, max_upload_mb),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
