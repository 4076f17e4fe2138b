mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "concord",
    version,
    about = "Reconcile supplier reports against invoices by ISBN and render PDF reports"
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables found in a PDF
    Tables {
        /// Path to the PDF
        pdf_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Filter and concatenate PDF tables into one CSV
    Combine {
        /// Path to the PDF
        pdf_file: PathBuf,

        /// Table to include, as PAGE:ORDINAL (repeatable, order is kept)
        #[arg(short, long = "table", value_name = "PAGE:ORDINAL", required = true)]
        tables: Vec<String>,

        /// JSON file of saved filters: [{"page", "ordinal", "spec"}]
        #[arg(short, long, value_name = "FILE")]
        filters: Option<PathBuf>,

        /// Comma-separated header names for the combined table
        #[arg(long, value_delimiter = ',')]
        headers: Vec<String>,

        /// Write CSV to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Compare the ISBN columns of two datasets (presence only)
    Keys {
        /// First dataset (CSV or XLSX)
        dataset_a: PathBuf,

        /// Second dataset (CSV or XLSX)
        dataset_b: PathBuf,

        /// Key column in the first dataset
        #[arg(long, value_name = "NAME")]
        column_a: String,

        /// Key column in the second dataset
        #[arg(long, value_name = "NAME")]
        column_b: String,

        /// JSON catalog of titles: {"isbn": "title"}
        #[arg(long, value_name = "FILE")]
        titles: Option<PathBuf>,

        /// Render the presence report to this PDF
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Reconcile a supplier report against an invoice by ISBN, quantity and net total
    Reconcile {
        /// Supplier report (CSV or XLSX)
        report: PathBuf,

        /// Invoice (CSV or XLSX, e.g. the output of `concord combine`)
        invoice: PathBuf,

        /// Key column in the report
        #[arg(long, default_value = "f_articulo")]
        report_key: String,

        /// Quantity column in the report (default: first header containing "cnt")
        #[arg(long)]
        report_quantity: Option<String>,

        /// Net total column in the report
        #[arg(long, default_value = "total")]
        report_total: String,

        /// Key column in the invoice
        #[arg(long)]
        invoice_key: String,

        /// Quantity column in the invoice
        #[arg(long)]
        invoice_quantity: String,

        /// Net total column in the invoice
        #[arg(long)]
        invoice_total: String,

        /// Render the tier-selected report to this PDF
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "concord=debug,concord_core=debug"
    } else {
        "concord=warn,concord_core=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Tables { pdf_file, output } => commands::tables::run(pdf_file, &output),
        Commands::Combine {
            pdf_file,
            tables,
            filters,
            headers,
            out,
        } => commands::combine::run(pdf_file, &tables, filters, headers, out),
        Commands::Keys {
            dataset_a,
            dataset_b,
            column_a,
            column_b,
            titles,
            pdf,
            output,
        } => commands::keys::run(commands::keys::KeysArgs {
            dataset_a,
            dataset_b,
            column_a,
            column_b,
            titles,
            pdf,
            output,
        }),
        Commands::Reconcile {
            report,
            invoice,
            report_key,
            report_quantity,
            report_total,
            invoice_key,
            invoice_quantity,
            invoice_total,
            pdf,
            output,
        } => commands::reconcile::run(commands::reconcile::ReconcileArgs {
            report,
            invoice,
            report_columns: concord_core::ColumnSelection {
                key: report_key,
                quantity: report_quantity,
                total: report_total,
            },
            invoice_columns: concord_core::ColumnSelection {
                key: invoice_key,
                quantity: Some(invoice_quantity),
                total: invoice_total,
            },
            pdf,
            output,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
