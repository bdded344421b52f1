use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use glowbook::backend::SupabaseBackend;
use glowbook::collaborators::{ConsoleToaster, LoggingScheduler, TracingDiagnostics};
use glowbook::store::MemoryMedium;
use glowbook::{AppointmentStore, CachedCatalog, Collaborators, Config, KeyedStore};
use glowbook_core::appointment::{
    count_by_status, Appointment, AppointmentStatus, CreateAppointmentRequest,
};
use glowbook_core::cache::{feature_namespace, StorageMedium};
use glowbook_core::serde::parse_time;

/// Glowbook - book and manage beauty and wellness appointments
#[derive(Parser, Debug)]
#[command(name = "glowbook")]
#[command(version, about, long_about = None)]
struct Cli {
    /// ID of the signed-in user
    #[arg(long, global = true, env = "GLOWBOOK_USER_ID")]
    user: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List appointments, optionally by status
    List {
        #[arg(long)]
        status: Option<AppointmentStatus>,
    },
    /// Active appointments that have not started yet
    Upcoming,
    /// Past, completed and cancelled appointments
    Past,
    /// Book a new appointment
    Book {
        #[arg(long)]
        service: String,
        #[arg(long)]
        provider: String,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Time as HH:MM
        #[arg(long, value_parser = parse_time_arg)]
        time: NaiveTime,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Confirm a scheduled appointment
    Confirm { id: Uuid },
    /// Cancel an appointment
    Cancel { id: Uuid },
    /// Mark a confirmed appointment as completed
    Complete { id: Uuid },
    /// List services offered by a provider
    Services {
        #[arg(long)]
        provider: Option<String>,
    },
    /// Show what the local cache holds
    CacheInfo,
    /// Remove every cached entry
    CacheClear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glowbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let medium = open_medium(&config).await;
    let diagnostics = Arc::new(TracingDiagnostics);
    let root =
        KeyedStore::new(medium, config.namespace.clone()).with_diagnostics(diagnostics.clone());
    let appointments_cache =
        root.with_namespace(feature_namespace(&config.namespace, "appointments"));
    let catalog_cache = root.with_namespace(feature_namespace(&config.namespace, "catalog"));

    let backend = Arc::new(
        SupabaseBackend::from_config(&config).context("Failed to build Supabase client")?,
    );

    match cli.command {
        Command::CacheInfo => {
            for cache in [&appointments_cache, &catalog_cache] {
                let keys = cache.get_all_keys().await;
                println!(
                    "{}: {} key(s), {} bytes",
                    cache.namespace(),
                    keys.len(),
                    cache.get_size().await
                );
                for key in keys {
                    let fresh = if cache.has_item(&key).await { "fresh" } else { "expired" };
                    println!("  {key} ({fresh})");
                }
            }
            return Ok(());
        }
        Command::CacheClear => {
            appointments_cache.clear().await;
            catalog_cache.clear().await;
            println!("Cache cleared");
            return Ok(());
        }
        Command::Services { provider } => {
            let catalog = CachedCatalog::new(backend, catalog_cache, config.cache_ttl());
            let services = match provider {
                Some(provider) => catalog.services_by_provider(&provider).await?,
                None => catalog.services().await?,
            };
            for service in services {
                println!(
                    "{:<12} {:<30} {:>4} min  {:>8.2}  provider={}",
                    service.id,
                    service.name,
                    service.duration_minutes,
                    f64::from(service.price_cents) / 100.0,
                    service.provider_id
                );
            }
            return Ok(());
        }
        _ => {}
    }

    let user_id = cli
        .user
        .context("A user ID is required (--user or GLOWBOOK_USER_ID)")?;
    let store = AppointmentStore::new(
        user_id,
        backend,
        appointments_cache,
        Collaborators {
            scheduler: Arc::new(LoggingScheduler),
            diagnostics,
            toaster: Arc::new(ConsoleToaster),
        },
    )
    .with_cache_ttl(config.cache_ttl())
    .with_reminder_lead(config.reminder_lead());

    let now = Local::now().naive_local();

    match cli.command {
        Command::List { status } => {
            store.ensure_loaded().await?;
            match status {
                Some(status) => print_appointments(&store.filter_by_status(status).await),
                None => {
                    let rows = store.appointments().await;
                    print_appointments(&rows);
                    print_status_counts(&rows);
                }
            }
        }
        Command::Upcoming => {
            store.ensure_loaded().await?;
            print_appointments(&store.upcoming(now).await);
        }
        Command::Past => {
            store.ensure_loaded().await?;
            print_appointments(&store.past(now).await);
        }
        Command::Book {
            service,
            provider,
            date,
            time,
            notes,
        } => {
            store.load_appointments().await?;
            let mut request = CreateAppointmentRequest::new(service, provider, date, time);
            request.notes = notes;
            let row = store.create_appointment(request).await?;
            print_appointments(&[row]);
        }
        Command::Confirm { id } => {
            store.load_appointments().await?;
            print_appointments(&[store.confirm_appointment(id).await?]);
        }
        Command::Cancel { id } => {
            store.load_appointments().await?;
            print_appointments(&[store.cancel_appointment(id).await?]);
        }
        Command::Complete { id } => {
            store.load_appointments().await?;
            print_appointments(&[store.complete_appointment(id).await?]);
        }
        Command::Services { .. } | Command::CacheInfo | Command::CacheClear => {}
    }

    Ok(())
}

/// Opens the durable medium, falling back to memory if it cannot be opened.
async fn open_medium(config: &Config) -> Arc<dyn StorageMedium> {
    #[cfg(feature = "sqlite")]
    {
        match glowbook::store::SqliteMedium::open(&config.sqlite_path).await {
            Ok(medium) => {
                tracing::debug!(path = %config.sqlite_path, "Using SQLite medium");
                return Arc::new(medium);
            }
            Err(err) => {
                tracing::warn!(
                    path = %config.sqlite_path,
                    error = %err,
                    "Falling back to memory medium"
                );
            }
        }
    }

    Arc::new(MemoryMedium::new(config.cache_max_entries))
}

fn parse_time_arg(value: &str) -> Result<NaiveTime, String> {
    parse_time(value).map_err(|e| format!("expected HH:MM ({e})"))
}

fn print_status_counts(rows: &[Appointment]) {
    let counts: Vec<String> = count_by_status(rows)
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    println!("{}", counts.join(", "));
}

fn print_appointments(rows: &[Appointment]) {
    if rows.is_empty() {
        println!("No appointments");
        return;
    }
    for row in rows {
        println!(
            "{}  {} {}  {:<9}  service={} provider={}",
            row.id,
            row.date,
            row.time.format("%H:%M"),
            row.status.as_str(),
            row.service_id,
            row.provider_id
        );
    }
}
