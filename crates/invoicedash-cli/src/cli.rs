use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use invoicedash_client::ingest::LineItemPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

fn parse_positive(value: &str) -> Result<i64, String> {
    match value.parse::<i64>() {
        Ok(parsed) if parsed >= 1 => Ok(parsed),
        _ => Err("value must be a whole number of 1 or greater".to_string()),
    }
}

/// Extended help shown after `invoicedash ingest --help`.
pub const INGEST_AFTER_HELP: &str = "\
How ingestion works:
  The input is one JSON array of extraction records, as exported from the
  document store. Each record becomes one document and one invoice, plus the
  vendor, customer, payment and line items it carries.

  <path> is a local file path.
  To read stdin explicitly, use `-` as the path.
  Example: cat export.json | invoicedash ingest -

  Re-ingesting the same export is safe: documents, invoices, payments,
  vendors and customers are matched on their natural keys and reused.
  Line items are appended on every run unless `--line-items skip-existing`
  is given.

Record shape (abridged):
  [
    {
      \"_id\": \"665f1c2e9b1d\",
      \"name\": \"acme-march.pdf\",
      \"createdAt\": { \"$date\": \"2024-03-16T09:12:00Z\" },
      \"extractedData\": {
        \"llmData\": {
          \"vendor\":  { \"value\": { \"vendorName\": { \"value\": \"Acme Corp\" } } },
          \"invoice\": { \"value\": { \"invoiceId\": { \"value\": \"INV-1\" },
                                    \"invoiceDate\": { \"value\": \"2024-03-15\" } } },
          \"summary\": { \"value\": { \"invoiceTotal\": { \"value\": 1200.50 } } },
          \"payment\": { \"value\": { \"dueDate\": { \"value\": \"2024-04-14\" } } },
          \"lineItems\": { \"value\": { \"items\": { \"value\": [
            { \"totalPrice\": { \"value\": 200 }, \"category\": { \"value\": \"Office Supplies\" } }
          ] } } }
        }
      }
    }
  ]

What to do next:
  1. Run `invoicedash ingest <path>` and review the summary.
  2. Run `invoicedash db status` to check row counts.
  3. Run `invoicedash ingest list` to see earlier runs.
";

#[derive(Debug, Parser)]
#[command(
    name = "invoicedash",
    version,
    about = "invoice analytics over extracted documents",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log progress to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LineItemMode {
    Append,
    SkipExisting,
}

impl From<LineItemMode> for LineItemPolicy {
    fn from(mode: LineItemMode) -> Self {
        match mode {
            LineItemMode::Append => LineItemPolicy::Append,
            LineItemMode::SkipExisting => LineItemPolicy::SkipExisting,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load extraction records into the analytics store
    #[command(args_conflicts_with_subcommands = true, after_long_help = INGEST_AFTER_HELP)]
    Ingest {
        #[command(subcommand)]
        command: Option<IngestCommand>,
        #[command(flatten)]
        run: IngestArgs,
    },
    /// Year-to-date headline numbers
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Invoice count and value per month
    Trends {
        #[arg(long)]
        json: bool,
    },
    /// Vendor rankings
    #[command(arg_required_else_help = true)]
    Vendors {
        #[command(subcommand)]
        command: VendorsCommand,
    },
    /// Spend per category
    Categories {
        #[arg(long)]
        json: bool,
    },
    /// Invoice totals grouped by payment due day
    CashOutflow {
        /// First due date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// Last due date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        #[arg(long)]
        json: bool,
    },
    /// Paginated, filterable invoice list
    Invoices(InvoicesArgs),
    /// Ask a question about your invoices in plain language
    Chat {
        query: String,
        /// Print the answer as server-sent-event frames
        #[arg(long)]
        stream: bool,
        #[arg(long)]
        json: bool,
    },
    /// Store inspection commands
    #[command(arg_required_else_help = true)]
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    /// Export the normalized tables
    #[command(arg_required_else_help = true)]
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
    /// Liveness check
    Health,
}

#[derive(Debug, Clone, Args)]
pub struct IngestArgs {
    /// Path to a JSON export, or `-` for stdin
    pub path: Option<String>,
    /// Errors tolerated before the batch aborts
    #[arg(long)]
    pub error_threshold: Option<usize>,
    /// What to do with line items of invoices that already exist
    #[arg(long, value_enum, default_value_t = LineItemMode::Append)]
    pub line_items: LineItemMode,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum IngestCommand {
    /// Show earlier ingestion runs, newest first
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum VendorsCommand {
    /// Top vendors by total spend
    Top {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct InvoicesArgs {
    #[arg(long, value_parser = parse_positive)]
    pub page: Option<i64>,
    #[arg(long, value_parser = parse_positive)]
    pub limit: Option<i64>,
    /// Case-insensitive match on invoice number or vendor name
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub vendor_id: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Earliest invoice date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_iso_date)]
    pub from: Option<IsoDate>,
    /// Latest invoice date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_iso_date)]
    pub to: Option<IsoDate>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DbCommand {
    /// Row counts and a sample invoice
    Status {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ExportCommand {
    /// Write one CSV file per table into <dir>
    Csv { dir: String },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
