use std::path::Path;

use invoicedash_client::chat::ChatMode;
use invoicedash_client::commands::chat::ChatRunOptions;
use invoicedash_client::commands::dashboard::{CashOutflowFilter, InvoiceFilter};
use invoicedash_client::commands::ingest::{IngestListOptions, IngestRunOptions};
use invoicedash_client::commands::{self, dashboard};
use invoicedash_client::config::AppConfig;
use invoicedash_client::ingest::IngestOptions;
use invoicedash_client::{ClientResult, SuccessEnvelope};

use crate::cli::{
    Cli, Commands, DbCommand, ExportCommand, IngestArgs, IngestCommand, InvoicesArgs, IsoDate,
    VendorsCommand,
};

pub fn dispatch(cli: &Cli, config: &AppConfig) -> ClientResult<SuccessEnvelope> {
    let home = config.home.as_deref();
    match &cli.command {
        Commands::Ingest { command, run } => match command {
            Some(IngestCommand::List { .. }) => {
                commands::ingest::list_with_options(IngestListOptions { home_override: home })
            }
            None => commands::ingest::run_with_options(ingest_run_options(run, config, home)),
        },
        Commands::Stats { .. } => dashboard::stats(home),
        Commands::Trends { .. } => dashboard::trends(home),
        Commands::Vendors { command } => match command {
            VendorsCommand::Top { .. } => dashboard::vendors_top(home),
        },
        Commands::Categories { .. } => dashboard::categories(home),
        Commands::CashOutflow { from, to, .. } => dashboard::cash_outflow_forecast(
            &CashOutflowFilter {
                start_date: date_value(from.as_ref()),
                end_date: date_value(to.as_ref()),
            },
            home,
        ),
        Commands::Invoices(args) => dashboard::invoices(&invoice_filter(args), home),
        Commands::Chat { query, stream, .. } => commands::chat::run(ChatRunOptions {
            query,
            mode: if *stream {
                ChatMode::Segmented
            } else {
                ChatMode::Buffered
            },
            config,
        }),
        Commands::Db { command } => match command {
            DbCommand::Status { .. } => commands::db::status_with_home_override(home),
        },
        Commands::Export { command } => match command {
            ExportCommand::Csv { dir } => {
                commands::export::csv_with_home_override(Path::new(dir), home)
            }
        },
        Commands::Health => commands::health::run(),
    }
}

fn ingest_run_options<'a>(
    args: &IngestArgs,
    config: &AppConfig,
    home: Option<&'a Path>,
) -> IngestRunOptions<'a> {
    let mut ingest = IngestOptions::from_config(config);
    if let Some(threshold) = args.error_threshold {
        ingest.error_threshold = threshold;
    }
    ingest.line_item_policy = args.line_items.into();

    IngestRunOptions {
        path: args.path.clone(),
        ingest,
        home_override: home,
        stdin_override: None,
    }
}

fn invoice_filter(args: &InvoicesArgs) -> InvoiceFilter {
    InvoiceFilter {
        page: args.page,
        limit: args.limit,
        search: args.search.clone(),
        vendor_id: args.vendor_id.clone(),
        status: args.status.clone(),
        start_date: date_value(args.from.as_ref()),
        end_date: date_value(args.to.as_ref()),
    }
}

fn date_value(date: Option<&IsoDate>) -> Option<String> {
    date.map(|value| value.as_str().to_string())
}
