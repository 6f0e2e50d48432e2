use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use whodtheyplayfor::{
    cache::CachedRepository,
    db::{Db, DbConfig},
    names,
    services::quiz::QuizService,
    session::SessionStore,
    AppState,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Database server, `host` or `host:port`.
    #[arg(long, env = "DB_SERVER")]
    server: String,

    /// Database name.
    #[arg(long, env = "DB_NAME")]
    database: String,

    /// Database user.
    #[arg(long, env = "DB_USERNAME")]
    username: String,

    /// Database password.
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    password: String,

    /// Competition players and clubs are filtered by.
    #[arg(long, env, default_value = names::DEFAULT_COMPETITION)]
    competition: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,

    /// How long query results are reused, in seconds.
    #[arg(long, env, default_value_t = names::DEFAULT_CACHE_TTL_SECS)]
    cache_ttl_secs: u64,

    /// How long a wrong answer stays on screen before the fresh board loads, in seconds.
    #[arg(long, env, default_value_t = names::DEFAULT_RESET_DELAY_SECS)]
    reset_delay_secs: u64,

    /// Game sessions idle for longer than this are dropped, in minutes.
    #[arg(long, env, default_value_t = names::DEFAULT_SESSION_IDLE_MINS)]
    session_idle_mins: u64,

    /// Mark the session cookie `Secure` (serve over HTTPS).
    #[arg(long, env)]
    secure_cookies: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,axum=debug,whodtheyplayfor=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let config = DbConfig {
        server: args.server,
        database: args.database,
        username: args.username,
        password: args.password,
        competition: args.competition,
    };
    let db = Db::new(&config).await?;

    let repo = CachedRepository::new(db, Duration::from_secs(args.cache_ttl_secs));
    let state = AppState {
        quiz: Arc::new(QuizService::new(repo)),
        sessions: SessionStore::new(Duration::from_secs(args.session_idle_mins * 60)),
        competition: Arc::from(config.competition.as_str()),
        reset_delay: Duration::from_secs(args.reset_delay_secs),
        secure_cookies: args.secure_cookies,
    };

    let address = args.address.parse::<std::net::SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, competition = %config.competition, "listening");
    axum::serve(listener, whodtheyplayfor::router(state)).await?;

    Ok(())
}
