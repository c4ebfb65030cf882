/*!
# Daily Paths

Inspection binary for the daily reading core: maps dates to content slots,
resolves readings through the local cache and the remote source, and fills or
maintains the cache.

## Usage

```
daily-paths [OPTIONS] <COMMAND>

Commands:
  slot      Print the content slot of a date
  read      Resolve the reading for a date and print each update
  prefetch  Fill the cache for a window of dates starting at a date
  dates     List the dates of a year that have a reading
  cache     Inspect or maintain the local cache

Options:
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
      --log-level <LOG_LEVEL>    Log level filter (overridden by RUST_LOG) [default: warn]
```

## Configuration

See [`daily_paths::config`] for the environment variables. Without
`DAILY_PATHS_API_URL` and `DAILY_PATHS_API_KEY` the binary runs offline and
serves cached readings only.
*/

use daily_paths::cache::ReadingCache;
use daily_paths::calendar::{dates_for_slots, format_local_key, to_scheduled_slot, CalendarDate};
use daily_paths::cli::{date_or_today, CacheCommand, CliArgs, Command};
use daily_paths::config::Config;
use daily_paths::db::Database;
use daily_paths::errors::{AppError, AppResult};
use daily_paths::logging::init_tracing;
use daily_paths::prefetch::{PrefetchLedger, Prefetcher};
use daily_paths::reading::ReadingContent;
use daily_paths::remote::{ReadingSource, RestReadingSource};
use daily_paths::resolver::{ReadingUpdate, Resolver};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// One resolver update as printed by `read`.
#[derive(Serialize)]
struct UpdateLine<'a> {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a ReadingContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<'a> From<&'a ReadingUpdate> for UpdateLine<'a> {
    fn from(update: &'a ReadingUpdate) -> Self {
        UpdateLine {
            state: update.state().as_str(),
            content: update.content(),
            message: update.message(),
        }
    }
}

/// The wired-up subsystem.
struct Services {
    config: Config,
    cache: ReadingCache,
    resolver: Resolver,
}

impl Services {
    fn open() -> AppResult<Self> {
        info!("Loading configuration");
        let config = Config::load()?;
        debug!("Configuration: {:?}", config);

        let db = Database::open(&config.cache_path)?;
        let cache = ReadingCache::new(db, config.cache_max_entries)?;
        cache.purge_legacy()?;

        let source: Arc<dyn ReadingSource> = Arc::new(RestReadingSource::from_config(&config)?);
        let resolver = Resolver::new(source, cache.clone());

        Ok(Services {
            config,
            cache,
            resolver,
        })
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_format, &args.log_level)?;
    debug!("CLI arguments: {:?}", args);

    match args.command {
        Command::Slot { date } => {
            let date = date_or_today(date.as_deref())?;
            println!("{}", to_scheduled_slot(date));
        }
        Command::Read { date } => {
            let date = date_or_today(date.as_deref())?;
            let services = Services::open()?;
            read(&services.resolver, date).await?;
        }
        Command::Prefetch { date, days } => {
            let date = date_or_today(date.as_deref())?;
            let services = Services::open()?;
            let days = days.unwrap_or(services.config.prefetch_days);

            let prefetcher = Prefetcher::new(services.resolver.clone(), PrefetchLedger::new());
            let report = prefetcher.prefetch_window(date, days).await;
            println!(
                "{} dates: {} stored, {} already cached, {} absent, {} failed",
                report.total, report.stored, report.already_cached, report.absent, report.failed
            );
        }
        Command::Dates { year } => {
            let year = year.unwrap_or_else(|| CalendarDate::today().year());
            let services = Services::open()?;
            let slots = services.resolver.source().available_slots().await?;
            for date in dates_for_slots(year, &slots)? {
                println!("{}", format_local_key(date));
            }
        }
        Command::Cache(command) => {
            let services = Services::open()?;
            cache_command(&services, command)?;
        }
    }

    Ok(())
}

/// Prints each update of a resolution as a JSON line.
async fn read(resolver: &Resolver, date: CalendarDate) -> AppResult<()> {
    let mut updates = resolver.resolve(date);
    while let Some(update) = updates.next().await {
        let line = serde_json::to_string(&UpdateLine::from(&update))
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        println!("{}", line);
    }
    Ok(())
}

fn cache_command(services: &Services, command: CacheCommand) -> AppResult<()> {
    match command {
        CacheCommand::Stats => {
            let stats = services.cache.stats()?;
            println!("entries: {}", stats.entries);
            println!("legacy entries: {}", stats.legacy_entries);
            match stats.date_range {
                Some((first, last)) => println!("dates: {} .. {}", first, last),
                None => println!("dates: none"),
            }
        }
        CacheCommand::Prune { max } => {
            let max = max
                .or(services.config.cache_max_entries)
                .ok_or_else(|| {
                    AppError::Config("No cache bound configured; pass --max".to_string())
                })?;
            let removed = services.cache.prune(max)?;
            println!("removed {} entries", removed);
        }
        CacheCommand::PurgeLegacy => {
            let removed = services.cache.purge_legacy()?;
            println!("removed {} entries", removed);
        }
    }
    Ok(())
}
