use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use estimo::api::{self, ServerConfig};
use estimo::client::EstimoClient;
use estimo::db;
use estimo::gateway::LockScope;
use estimo::render;

#[derive(Parser)]
#[command(name = "estimo")]
#[command(about = "Planning poker: estimate together, agree on a number")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Estimo server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// SQLite database file (defaults to the platform data directory)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Mutation lock scope: global or per-game (overrides ESTIMO_LOCK)
        #[arg(long)]
        lock: Option<LockScope>,
    },
    /// Create a game owned by you
    NewGame {
        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Start a round in a game
    Round {
        id: Uuid,
        subject: String,
        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Finish the open round with the agreed value
    Finish {
        id: Uuid,
        consensus: String,
        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Drop your card in the open round
    Estimate {
        id: Uuid,
        value: String,
        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Show a game table
    Show { id: Uuid },
    /// List game ids
    List,
}

#[derive(clap::Args)]
struct PlayerArgs {
    /// Player name (defaults to ESTIMO_PLAYER)
    #[arg(long)]
    player: Option<String>,
}

impl PlayerArgs {
    fn client(self) -> EstimoClient {
        let client = EstimoClient::from_env();
        match self.player {
            Some(player) => client.with_player(player),
            None => client,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "estimo=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(
    port: u16,
    host: &str,
    db_path: Option<PathBuf>,
    lock: Option<LockScope>,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(lock) = lock {
        config.lock_scope = lock;
    }

    tracing::info!("Starting Estimo server on port {}", port);

    let db = match db_path {
        Some(path) => db::Database::open(path)?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;

    let app = api::create_router(db, &config);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Estimo server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            db,
            lock,
        }) => serve(port, &host, db, lock).await?,
        Some(Commands::NewGame { player }) => {
            let id = player.client().new_game().await?;
            println!("{}", id);
        }
        Some(Commands::Round {
            id,
            subject,
            player,
        }) => {
            player.client().new_round(id, &subject).await?;
            println!("Round started: {}", subject);
        }
        Some(Commands::Finish {
            id,
            consensus,
            player,
        }) => {
            player.client().finish_round(id, &consensus).await?;
            println!("Round finished with consensus {}", consensus);
        }
        Some(Commands::Estimate { id, value, player }) => {
            player.client().estimate(id, &value).await?;
            println!("Estimated {}", value);
        }
        Some(Commands::Show { id }) => {
            let game = EstimoClient::from_env().get_game(id).await?;
            print!("{}", render::render_game(&game));
        }
        Some(Commands::List) => {
            for id in EstimoClient::from_env().game_ids().await? {
                println!("{}", id);
            }
        }
        None => serve(3000, "127.0.0.1", None, None).await?,
    }

    Ok(())
}
