use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sislab_client::config::environment::Config;
use sislab_client::modules::auth::schema::RegisterRequest;
use sislab_client::modules::system::ServerStatus;
use sislab_client::services::session::DemoTarget;
use sislab_client::AppContext;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "sislab")]
#[command(about = "Observe and exercise the lab-inventory cluster's failover behaviour")]
struct Cli {
    /// Overrides SISLAB_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print Prometheus metrics on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow cluster status, health and inventory feeds
    Watch {
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Run a load session against a demo target (round-robin, least, two, ip, uri, random)
    Load {
        target: DemoTarget,
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Create random items to saturate the primary store
    Flood {
        #[arg(long, default_value_t = 10)]
        items: u32,
    },
    /// Zero the request counters of every node
    Reset,
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List laboratories
    Labs,
    /// List the global inventory and the store that served it
    Items,
    /// Flat report of every lab item
    Report,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sislab_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load environment configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(api_url) = cli.api_url.clone() {
        config.api_url = api_url;
    }

    let ctx = match sislab_client::create_context(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to initialise metrics: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Using API at {}", config.api_url);

    let result = run(&ctx, cli.command).await;
    ctx.dashboard.stop();

    if cli.metrics {
        match ctx.metrics.export() {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!("Failed to export metrics: {}", e),
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &AppContext, command: Command) -> CliResult {
    match command {
        Command::Watch { seconds } => watch(ctx, seconds).await,
        Command::Load { target, seconds } => load(ctx, target, seconds).await,
        Command::Flood { items } => flood(ctx, items).await,
        Command::Reset => {
            let zeroed = ctx.dashboard.reset_coordinator().reset().await?;
            println!("Counters reset ({} node(s) held locally)", zeroed);
            Ok(())
        }
        Command::Login { username, password } => {
            let response = ctx.auth.login(&username, &password).await?;
            println!("Logged in as {}", response.usuario);
            if let Some(token) = response.token {
                println!("export SISLAB_TOKEN={}", token);
            }
            Ok(())
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let user = ctx
                .auth
                .register(&RegisterRequest {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("Registered {} (id {})", user.username, user.id);
            Ok(())
        }
        Command::Labs => {
            for lab in ctx.inventory.list_labs().await? {
                println!(
                    "{:<26} {:<24} {} item(s)",
                    lab.id.unwrap_or_default(),
                    lab.name,
                    lab.items.len()
                );
            }
            Ok(())
        }
        Command::Items => {
            let page = ctx.inventory.list_items().await?;
            let marker = if page.source.is_backup() { " (backup path)" } else { "" };
            println!("Source: {}{}", page.source, marker);
            for item in page.data {
                println!("{:<28} {:<10} {:<17} {}", item.code, item.item_type, item.status, item.area);
            }
            Ok(())
        }
        Command::Report => {
            for row in ctx.inventory.report_rows().await? {
                println!(
                    "{:<28} {:<20} {:<10} {}",
                    row.code.unwrap_or_default(),
                    row.lab_name.unwrap_or_default(),
                    row.status.unwrap_or_default(),
                    row.last_desc.unwrap_or_default()
                );
            }
            Ok(())
        }
    }
}

async fn watch(ctx: &AppContext, seconds: Option<u64>) -> CliResult {
    ctx.dashboard.start();
    let mut cluster = ctx.dashboard.cluster().subscribe();
    let health = ctx.dashboard.health();
    let sync = ctx.dashboard.sync();
    let deadline = until(seconds);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = &mut deadline => break,
            changed = cluster.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = cluster.borrow_and_update().clone();
                if let Some(error) = state.last_error {
                    println!("⚠️  cluster status unavailable: {}", error);
                }
                if let Some(servers) = state.value {
                    print_cluster(&servers);
                }
                if let Some(health) = health.value() {
                    println!("   health: {}", health.overall());
                }
                let sync_state = sync.current();
                match (sync_state.value, sync_state.last_error) {
                    (_, Some(error)) => println!("   sync: unavailable ({})", error),
                    (Some(snapshot), None) => println!(
                        "   sync: {} (pending {})",
                        snapshot.status,
                        snapshot.pending_total()
                    ),
                    (None, None) => {}
                }
            }
        }
    }
    Ok(())
}

async fn load(ctx: &AppContext, target: DemoTarget, seconds: Option<u64>) -> CliResult {
    ctx.dashboard.start();
    ctx.dashboard.set_fast_status(true);
    let session = ctx.load_generator.start_target(target)?;
    println!("Load on {} ({}), Ctrl-C to stop", target.path(), target.label());

    let deadline = until(seconds);
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = deadline => {}
    }

    let report = session.stop_and_wait().await;
    ctx.dashboard.set_fast_status(false);
    println!(
        "{} request(s) to {} in {:.1}s",
        report.requests_issued,
        report.target,
        report.elapsed.as_secs_f64()
    );
    if let Some(servers) = ctx.dashboard.cluster().value() {
        print_cluster(&servers);
    }
    Ok(())
}

async fn flood(ctx: &AppContext, items: u32) -> CliResult {
    let session = ctx.flooder.with_max_items(items).start()?;
    let mut progress = session.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.stop();
                break;
            }
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
                let p = progress.borrow_and_update().clone();
                println!("{}/{} created ({} failed, {} on backup)", p.created, p.max_items, p.failed, p.saved_to_backup);
                if p.finished {
                    break;
                }
            }
        }
    }

    let summary = session.wait().await;
    if summary.created < summary.max_items {
        println!("Partial flood: {} of {} item(s) created", summary.created, summary.max_items);
    }
    Ok(())
}

fn print_cluster(servers: &[ServerStatus]) {
    for server in servers {
        let icon = if server.is_online() { "🟢" } else { "🔴" };
        println!("{} {:<6} {:<8} {:>8} req", icon, server.port, server.status, server.requests);
    }
}

async fn until(seconds: Option<u64>) {
    match seconds {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => std::future::pending().await,
    }
}
