use std::path::PathBuf;
use std::sync::Arc;

use anyhow::ensure;
use clap::Parser;
use config::File;
use futures::future::join_all;
use rand::Rng;
use tracing::{debug, info};

use actor_core::config::ConfigBuilder;
use actor_core::config::core_config::CoreConfig;
use actor_core::ext::init_logger_with_filter;
use actor_core::system::ActorSystem;
use actor_test_client::config::TestClientConfig;
use actor_test_client::player::{Player, PlayerActor};
use actor_test_client::register_test_client;
use actor_test_client::store::etcd::EtcdPlayerStore;
use actor_test_client::store::memory::InMemoryPlayerStore;
use actor_test_client::store::PlayerStore;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "test-client")]
    system_name: String,
    #[arg(short, long, default_value_t = 4)]
    players: usize,
    #[arg(short, long, default_value_t = 3)]
    games: usize,
    #[arg(short, long, default_value_t = 5)]
    rounds: usize,
    /// Comma separated etcd endpoints, players are kept in memory when absent.
    #[arg(short, long)]
    etcd: Option<String>,
    /// Overrides the player record prefix from the config.
    #[arg(long)]
    prefix: Option<String>,
    /// TOML file layered over the built in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "info,h2=info,tower=info,hyper=info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Args { system_name, players, games, rounds, etcd, prefix, config, log } = Args::try_parse()?;
    init_logger_with_filter(log.as_str());
    ensure!(games > 0, "at least one game is required");
    let mut core_builder = CoreConfig::builder();
    let mut client_builder = TestClientConfig::builder();
    if let Some(path) = config {
        core_builder = core_builder.add_source(File::from(path.clone()))?;
        client_builder = client_builder.add_source(File::from(path))?;
    }
    let core_config = core_builder.build()?;
    let mut client_config = client_builder.build()?;
    if let Some(prefix) = prefix {
        client_config.store.prefix = prefix;
    }
    debug!("core config:\n{}", toml::to_string(&core_config)?);
    debug!("test client config:\n{}", toml::to_string(&client_config)?);
    let store: Arc<dyn PlayerStore> = match etcd {
        None => Arc::new(InMemoryPlayerStore::default()),
        Some(endpoints) => {
            let endpoints = endpoints.split(',').map(|endpoint| endpoint.trim().to_string()).collect::<Vec<_>>();
            Arc::new(EtcdPlayerStore::connect(&endpoints, client_config.store.prefix.clone()).await?)
        }
    };
    let system = ActorSystem::new(system_name, core_config);
    register_test_client(&system, store, &client_config)?;
    let player_refs = (0..players)
        .map(|index| system.actor_ref::<PlayerActor>(format!("player-{}", index)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    for round in 0..rounds {
        let plays = player_refs.iter().map(|player| {
            let game_id = format!("game-{}", rand::thread_rng().gen_range(0..games));
            async move { player.play_game(&game_id).await }
        });
        let results = join_all(plays).await;
        let wins = results.iter().filter(|result| matches!(result, Ok(result) if result.winner)).count();
        for result in results {
            result?;
        }
        info!("round {} finished with {} wins", round, wins);
    }
    for player in &player_refs {
        let data = player.get_data().await?;
        println!("{}: {:?}", player.key(), data.rewards);
    }
    system.shutdown().await?;
    Ok(())
}
