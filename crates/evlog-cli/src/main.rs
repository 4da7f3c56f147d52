mod cli;

use clap::Parser;
use evlog::{EventLogger, LoggerConfig, Page};
use evlog_core::{FilterConfig, LogsConfig, SENTINEL, parse_timestamp};
use evlog_logging::{EvlogSubscriberBuilder, LogConfig};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = EvlogSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .with_level(&cli.log_level)
        .init()?;

    let config = LoggerConfig::with_db_path(&cli.db).with_refresh_interval(None);
    let logger = EventLogger::open(config).await?;

    match cli.command {
        Command::Submit {
            event,
            level,
            props,
            user,
        } => {
            if let Some(user) = user {
                logger.set_user(user, SENTINEL, None);
            }
            let rendered = logger.submit(event, props, level).await?;
            println!("{}", rendered.record.id());
        }

        Command::Query {
            config,
            after,
            before,
            filters,
            count,
            page_size,
        } => {
            let filter = match config {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)?;
                    LogsConfig::from_json(&json)?.filter_config()
                }
                None => {
                    let mut filter = FilterConfig::new()
                        .with_events_count(count)
                        .with_page_size(page_size);
                    if let Some(after) = after {
                        filter = filter.with_logs_after(parse_timestamp(&after)?);
                    }
                    if let Some(before) = before {
                        filter = filter.with_logs_before(parse_timestamp(&before)?);
                    }
                    for (field, values) in filters {
                        filter = filter.with_filter(field, values);
                    }
                    filter
                }
            };

            let pages = logger.query_async(filter).await?;
            print_pages(&pages);
        }

        Command::Get { id } => match logger.get(&id)? {
            Some(record) => println!("{}", record.rendered_payload()),
            None => anyhow::bail!("no record with id {id}"),
        },

        Command::Count => {
            println!("{}", logger.count()?);
        }
    }

    logger.shutdown().await;
    Ok(())
}

fn print_pages(pages: &[Page]) {
    let multi = pages.len() > 1;
    for page in pages {
        if multi {
            println!("# page {} ({} records)", page.index + 1, page.len());
        }
        for record in page.iter() {
            println!("{}", record.rendered_payload());
        }
    }
}
