use crate::cli::{Commands, DbCommand, IngestCommand, VendorsCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
    /// `data: {json}` frames, one per chat event.
    EventStream,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Ingest { command, run } => match command {
            Some(IngestCommand::List { json }) => *json,
            None => run.json,
        },
        Commands::Vendors {
            command: VendorsCommand::Top { json },
        }
        | Commands::Db {
            command: DbCommand::Status { json },
        }
        | Commands::Stats { json }
        | Commands::Trends { json }
        | Commands::Categories { json }
        | Commands::CashOutflow { json, .. } => *json,
        Commands::Invoices(args) => args.json,
        Commands::Chat { stream, json, .. } => {
            if *stream {
                return OutputMode::EventStream;
            }
            *json
        }
        Commands::Export { .. } | Commands::Health => false,
    };

    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}
