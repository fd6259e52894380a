use cricket_arena::api;
use cricket_arena::interaction::EventFeed;
use cricket_arena::ledger::Ledger;
use cricket_arena::records::MatchRecordStore;
use cricket_arena::roster::{load_players_csv, InMemoryPlayerStore, PlayerStore, RosterService};
use cricket_arena::{config::Config, db::init_db, MatchOrchestrator, MatchRegistry, Repository, Settler};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    let repo = Arc::new(Repository::new(pool));

    let players = match &config.roster_path {
        Some(path) => match load_players_csv(path) {
            Ok(players) => {
                tracing::info!(path = %path, players = players.len(), "player catalogue loaded");
                InMemoryPlayerStore::new(players)
            }
            Err(e) => {
                eprintln!("Failed to load roster {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => InMemoryPlayerStore::builtin(),
    };
    let store: Arc<dyn PlayerStore> = Arc::new(players);

    let ledger: Arc<dyn Ledger> = repo.clone();
    let records: Arc<dyn MatchRecordStore> = repo.clone();
    let roster: Arc<dyn RosterService> = repo.clone();

    let settler = Settler::new(ledger.clone(), records.clone(), config.rewards());
    let orchestrator = Arc::new(MatchOrchestrator::new(store, settler, config.timeouts()));
    let registry = MatchRegistry::new(
        orchestrator,
        roster,
        ledger.clone(),
        Arc::new(EventFeed::new()),
        config.starting_balance,
    )
    .with_retention(config.finished_retention);

    let app = api::create_router(api::AppState::new(registry, ledger, records));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        addr = %addr,
        decision_timeout_secs = config.decision_timeout_secs,
        lineup_timeout_secs = config.lineup_timeout_secs,
        "cricket arena listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
