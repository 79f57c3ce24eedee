//! Aetheria Operator CLI
//!
//! Drives battle-send, bridge, vault and send-and-compose operations from the
//! command line and prints every state transition as it happens.

mod config;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aetheria::evm::{EvmGateway, HubClient};
use aetheria::{
    from_fixed_point, parse_token_id, BattleRequest, BridgeRequest, ChainDescriptor,
    ComposeSendRequest, ContractRole, EndpointId, ExecutorOptions, FlowKind, FlowReceipt,
    Operation, OperationState, Orchestrator, OrchestratorError, Registry, Resource, StatsHub,
    SubmitSettings, VaultRequest, VaultResource, DEFAULT_DECIMALS,
};
use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "aetheria")]
#[command(about = "Cross-chain battle, bridge and vault operations for Aetheria", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results and logs as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported chains and their deployed contracts
    Chains,

    /// Show resource and NFT balances of the configured wallet
    Balances,

    /// Send a player NFT to the opposing arena to battle
    Battle {
        /// Player NFT token id
        token_id: String,

        /// Destination arena (chain id or name); defaults to the other arena
        #[arg(long)]
        to: Option<String>,
    },

    /// Bridge a resource or player NFT to another chain
    Bridge {
        /// energy, wood, ore or nft
        asset: String,

        /// Decimal amount, or the token id when bridging the NFT
        amount: String,

        /// Destination chain (chain id or name)
        #[arg(long)]
        to: String,
    },

    /// Burn energy in a resource vault to mint wood or ore
    Vault {
        /// wood or ore
        resource: String,

        /// Energy to burn (decimal)
        amount: String,
    },

    /// Show a player's battle record from the stats hub
    Stats {
        /// Player NFT token id
        token_id: String,
    },

    /// Send a resource to a destination composer with a compose message
    SendCompose {
        /// Source resource contract (EnergyOFT, WoodResourceOFT, OreResourceOFT)
        src_contract: String,

        /// LayerZero endpoint id of the destination
        dst_endpoint_id: String,

        /// Composer contract on the destination
        composer_address: String,

        /// Decimal amount to send
        amount: String,

        /// Final recipient; defaults to the sender
        #[arg(long)]
        recipient: Option<String>,

        /// Whether the composer returns its output to the source chain
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        send_back: bool,

        /// Gas for lzReceive on the destination
        #[arg(long, default_value_t = 200_000)]
        lz_receive_gas: u128,

        /// Gas for lzCompose on the destination
        #[arg(long, default_value_t = 500_000)]
        lz_compose_gas: u128,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json);

    let config = Config::load()?;
    info!(config = ?config, "Loaded configuration");
    let registry = config.registry();

    match cli.command {
        Commands::Chains => print_chains(&registry, cli.json),
        Commands::Stats { token_id } => {
            let token_id = parse_token_id(&token_id)?;
            let hub = HubClient::from_registry(&registry)?;
            let stats = hub.player_stats(token_id).await?;

            if cli.json {
                #[derive(Serialize)]
                struct StatsReport {
                    token_id: String,
                    #[serde(flatten)]
                    stats: aetheria::PlayerStats,
                    win_rate: Option<f64>,
                }
                let report = StatsReport {
                    token_id: token_id.to_string(),
                    stats,
                    win_rate: stats.win_rate(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Player #{}", token_id);
                println!("  Battles:        {}", stats.total_battles);
                println!("  Goblins killed: {}", stats.goblins_killed);
                println!("  Battles lost:   {}", stats.battles_lost);
                match stats.win_rate_percent() {
                    Some(rate) => println!("  Win rate:       {}%", rate),
                    None => println!("  Win rate:       -"),
                }
            }
            Ok(())
        }
        command => {
            let orchestrator = connect(&config, registry).await?;
            run(&orchestrator, command, cli.json).await
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,aetheria=debug"))
    };

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

/// Connect the wallet on the configured chain
async fn connect(config: &Config, registry: Registry) -> Result<Orchestrator<EvmGateway>> {
    let chain = registry
        .chain(config.chain_id)
        .ok_or_else(|| eyre!("Chain {} is not supported", config.chain_id))?;

    let gateway = EvmGateway::connect(
        &chain.rpc_url,
        chain.chain_id,
        config.private_key.as_deref(),
    )
    .await?
    .with_poll_interval(config.poll_interval());

    let mut settings = SubmitSettings::default();
    if let Some(timeout) = config.confirmation_timeout() {
        settings = settings.with_confirmation_timeout(timeout);
    }

    Ok(Orchestrator::new(Arc::new(gateway), Arc::new(registry)).with_settings(settings))
}

async fn run(orchestrator: &Orchestrator<EvmGateway>, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Balances => {
            let portfolio = orchestrator.portfolio().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&portfolio)?);
                return Ok(());
            }

            let chain_name = orchestrator
                .current_chain()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| portfolio.chain_id.to_string());
            println!("{} on {}", portfolio.account, chain_name);
            for balance in &portfolio.resources {
                println!(
                    "  {:<8} {}",
                    balance.resource.as_str(),
                    from_fixed_point(balance.amount, DEFAULT_DECIMALS)
                );
            }
            if let Some(nfts) = portfolio.player_nfts {
                println!("  {:<8} {}", "players", nfts);
            }
            Ok(())
        }

        Commands::Battle { token_id, to } => {
            let destination = match to {
                Some(to) => resolve_chain(orchestrator.registry(), &to)?,
                None => orchestrator
                    .battle_destination()
                    .map(|c| c.chain_id)
                    .ok_or_else(|| eyre!("Battle-send requires an arena chain"))?,
            };
            let request = BattleRequest::parse(&token_id, destination)?;

            let operation = Arc::new(Operation::new(FlowKind::BattleSend));
            let progress = Progress::watch(&operation, json);
            let result = orchestrator.battle_send(&operation, request).await;
            report(orchestrator, &operation, progress, result, json).await
        }

        Commands::Bridge { asset, amount, to } => {
            let destination = resolve_chain(orchestrator.registry(), &to)?;
            let request = match asset.trim().to_ascii_lowercase().as_str() {
                "nft" | "onft" | "player" => BridgeRequest::player_nft(&amount, destination)?,
                other => {
                    let resource: Resource = other.parse()?;
                    BridgeRequest::fungible(resource, &amount, destination)?
                }
            };

            let operation = Arc::new(Operation::new(FlowKind::Bridge));
            let progress = Progress::watch(&operation, json);
            let result = orchestrator.bridge(&operation, request).await;
            report(orchestrator, &operation, progress, result, json).await
        }

        Commands::Vault { resource, amount } => {
            let resource: VaultResource = resource.parse()?;
            let request = VaultRequest::parse(resource, &amount)?;

            let operation = Arc::new(Operation::new(FlowKind::VaultBurn));
            let progress = Progress::watch(&operation, json);
            let result = orchestrator.vault_burn(&operation, request).await;
            report(orchestrator, &operation, progress, result, json).await
        }

        Commands::SendCompose {
            src_contract,
            dst_endpoint_id,
            composer_address,
            amount,
            recipient,
            send_back,
            lz_receive_gas,
            lz_compose_gas,
        } => {
            let resource: Resource = src_contract.parse()?;
            let dst_eid: EndpointId = dst_endpoint_id.parse()?;
            let composer = parse_address(&composer_address, "composer address")?;

            let mut request = ComposeSendRequest::parse(resource, dst_eid, composer, &amount)?
                .with_send_back(send_back)
                .with_options(ExecutorOptions {
                    receive_gas: lz_receive_gas,
                    compose_gas: lz_compose_gas,
                });
            if let Some(recipient) = recipient {
                request = request.with_recipient(parse_address(&recipient, "recipient")?);
            }

            let operation = Arc::new(Operation::new(FlowKind::ComposeSend));
            let progress = Progress::watch(&operation, json);
            let result = orchestrator.send_with_compose(&operation, request).await;
            report(orchestrator, &operation, progress, result, json).await
        }

        Commands::Chains | Commands::Stats { .. } => Ok(()),
    }
}

/// Accept a chain id or a case-insensitive chain name
fn resolve_chain(registry: &Registry, chain: &str) -> Result<u64> {
    let found = match chain.trim().parse::<u64>() {
        Ok(chain_id) => registry.chain(chain_id),
        Err(_) => registry.chain_by_name(chain.trim()),
    };
    found
        .map(|c| c.chain_id)
        .ok_or_else(|| eyre!("Unknown chain: {}", chain))
}

fn parse_address(value: &str, what: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .map_err(|e| eyre!("Invalid {} '{}': {}", what, value, e))
}

/// Prints transitions from the operation's history while the flow runs
struct Progress {
    operation: Arc<Operation>,
    printed: Arc<AtomicUsize>,
    watcher: JoinHandle<()>,
    json: bool,
}

impl Progress {
    fn watch(operation: &Arc<Operation>, json: bool) -> Self {
        let printed = Arc::new(AtomicUsize::new(0));
        let mut rx = operation.subscribe();
        let watcher = {
            let operation = Arc::clone(operation);
            let printed = Arc::clone(&printed);
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    rx.borrow_and_update();
                    print_new_transitions(&operation, &printed, json);
                }
            })
        };

        Self {
            operation: Arc::clone(operation),
            printed,
            watcher,
            json,
        }
    }

    /// Stop the watcher, then print whatever it has not printed yet
    async fn finish(self) {
        self.watcher.abort();
        let _ = self.watcher.await;
        print_new_transitions(&self.operation, &self.printed, self.json);
    }
}

fn print_new_transitions(operation: &Operation, printed: &AtomicUsize, json: bool) {
    let history = operation.history();
    let start = printed.load(Ordering::Acquire);
    if !json {
        for line in progress_lines(&history, start) {
            eprintln!("  {}", line);
        }
    }
    printed.store(history.len().max(start), Ordering::Release);
}

/// Status lines for the history entries from `start` on, skipping `idle`
fn progress_lines(history: &[OperationState], start: usize) -> Vec<String> {
    history
        .iter()
        .skip(start)
        .filter(|state| **state != OperationState::Idle)
        .map(OperationState::describe)
        .collect()
}

async fn report(
    orchestrator: &Orchestrator<EvmGateway>,
    operation: &Operation,
    progress: Progress,
    result: Result<FlowReceipt, OrchestratorError>,
    json: bool,
) -> Result<()> {
    progress.finish().await;

    let receipt = match result {
        Ok(receipt) => receipt,
        Err(e) if e.is_precondition() => return Err(e.into()),
        Err(e) => {
            if let Some(hash) = operation.last_tx_hash() {
                eprintln!("Last submitted transaction: {}", hash);
            }
            return Err(eyre!("{} failed: {}", operation.kind(), e));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
        return Ok(());
    }

    let chain = orchestrator.registry().chain(receipt.chain_id);
    println!("{} {}", operation.kind(), operation.state());
    if let Some(fee) = receipt.native_fee {
        println!("  Native fee: {} ETH", from_fixed_point(fee, DEFAULT_DECIMALS));
    }
    for tx in &receipt.transactions {
        let hash = tx.tx_hash.to_string();
        match chain.and_then(|c| c.tx_url(&hash)) {
            Some(url) => println!("  {} ({})", hash, url),
            None => println!("  {}", hash),
        }
    }
    if receipt.kind == FlowKind::BattleSend {
        println!("  Battle results settle on the destination arena once the message is delivered");
    }
    Ok(())
}

fn print_chains(registry: &Registry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(registry.chains())?);
        return Ok(());
    }

    const ROLES: [ContractRole; 6] = [
        ContractRole::PlayerNft,
        ContractRole::Composer,
        ContractRole::Energy,
        ContractRole::Wood,
        ContractRole::Ore,
        ContractRole::StatsHub,
    ];

    for chain in registry.chains() {
        print_chain(chain);
        for role in ROLES {
            if let Some(address) = registry.resolve_address(chain.chain_id, role) {
                println!("    {:<9} {}", role.as_str(), address);
            }
        }
    }
    Ok(())
}

fn print_chain(chain: &ChainDescriptor) {
    println!(
        "{} (chain {}, endpoint {}, {})",
        chain.name, chain.chain_id, chain.endpoint_id, chain.role
    );
    println!("    rpc       {}", chain.rpc_url);
}
