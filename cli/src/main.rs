use aave_supply::{
    alloy::primitives::Address,
    config::{parse_address, NetworkFile},
    process::constants::{DEFAULT_DEPOSIT_UNITS, MAX_TOKEN_DECIMALS},
    AlloyChainClient, DepositWorkflow, ErrorKind, GasMultiplier, SecretString, SupplyConfig,
    SupplyError, Wallet,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::{fs, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Infura project key, used to reach Sepolia
    #[arg(long, env = "INFURA_API_KEY", hide_env_values = true, global = true)]
    infura_api_key: Option<String>,
    /// JSON-RPC endpoint, replaces the Infura endpoint when set
    #[arg(long, env = "RPC_URL", global = true)]
    rpc_url: Option<String>,
    /// Wallet private key (hex)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true, global = true)]
    private_key: Option<String>,
    /// Path to a file holding the wallet private key, preferred over --private-key
    #[arg(long, global = true)]
    private_key_file: Option<String>,
    /// JSON file describing another network: rpc_url, token_address, pool_address
    #[arg(long, global = true)]
    network_file: Option<String>,
    /// Token contract address
    #[arg(long, env = "TOKEN_ADDRESS", global = true, requires = "pool")]
    token: Option<String>,
    /// Lending pool contract address
    #[arg(long, env = "POOL_ADDRESS", global = true, requires = "token")]
    pool: Option<String>,
    /// Whole tokens to deposit
    #[arg(long, env = "DEPOSIT_UNITS", default_value_t = DEFAULT_DEPOSIT_UNITS, global = true)]
    amount: u64,
    /// Safety factor applied to every gas estimate
    #[arg(long, env = "GAS_MULTIPLIER", default_value = "1.2", global = true)]
    gas_multiplier: GasMultiplier,
    /// Largest token decimals accepted from the contract
    #[arg(long, default_value_t = MAX_TOKEN_DECIMALS, global = true)]
    max_decimals: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Approve the pool and supply the tokens
    Deposit,
    /// Show decimals, balance and the allowance granted to the pool
    Position,
    /// Check the endpoint, wallet and contracts without sending anything
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = load_dotenv(".env");
    init_tracing();
    if let Err(err) = dotenv {
        error!("{err:#}");
        return ExitCode::from(2);
    }
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

// A missing .env file is fine, the variables may come from the shell
fn load_dotenv(path: &str) -> Result<()> {
    match dotenvy::from_path(path) {
        Err(err) if err.not_found() => Ok(()),
        result => result.with_context(|| format!("Failed to load {path}")),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SupplyError>().map(SupplyError::kind) {
        Some(ErrorKind::ConfigurationMissing) | Some(ErrorKind::InvalidConfiguration) => 2,
        Some(ErrorKind::InsufficientFunds) => 3,
        Some(ErrorKind::ApprovalFailed) => 4,
        Some(ErrorKind::SupplyFailed) => 5,
        Some(ErrorKind::UnexpectedFailure) | None => 1,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli.config)?;
    let wallet = Wallet::from_secret(&config.wallet_secret)?;
    info!(wallet = %wallet.address(), endpoint = %config.endpoint, "Using wallet");

    let client = AlloyChainClient::connect(config.endpoint.rpc_url()?, &wallet);
    client.preflight(&config.deposit).await?;
    let workflow = DepositWorkflow::new(client, config.deposit, wallet.address())?;

    match cli.command {
        Commands::Deposit => {
            let receipt = workflow.run().await?;
            info!(
                amount = %receipt.amount,
                approve_tx = %receipt.approval.receipt.transaction_hash,
                supply_tx = %receipt.supply.receipt.transaction_hash,
                "Deposit finished"
            );
        }
        Commands::Position => {
            let position = workflow.position().await?;
            info!(
                decimals = position.decimals,
                balance = %position.balance,
                allowance = %position.allowance,
                pool = %workflow.params().pool_address,
                "Token position"
            );
        }
        Commands::Check => {
            info!(
                token = %workflow.params().token_address,
                pool = %workflow.params().pool_address,
                "Configuration and contracts look good"
            );
        }
    }
    Ok(())
}

fn build_config(args: &ConfigArgs) -> Result<SupplyConfig> {
    let network = args
        .network_file
        .as_deref()
        .map(load_network_file)
        .transpose()?;

    let mut builder = SupplyConfig::builder()
        .target_whole_units(args.amount)
        .gas_multiplier(args.gas_multiplier)
        .max_decimals(args.max_decimals);

    if let Some(key) = &args.infura_api_key {
        builder = builder.infura_api_key(key.as_str());
    }
    let rpc_url = args
        .rpc_url
        .clone()
        .or_else(|| network.as_ref().and_then(|n| n.rpc_url.clone()));
    if let Some(url) = rpc_url {
        builder = builder.rpc_url(url);
    }

    let secret = match (&args.private_key, &args.private_key_file) {
        (_, Some(path)) => Some(load_private_key(path)?),
        (Some(key), None) => Some(SecretString::from(key.as_str())),
        (None, None) => None,
    };
    if let Some(secret) = secret {
        builder = builder.wallet_secret(secret);
    }

    if let Some((token, pool)) = network_addresses(args, network.as_ref())? {
        builder = builder.network(token, pool);
    }

    Ok(builder.build()?)
}

// Flags win over the network file; the two addresses always come from the same place.
fn network_addresses(
    args: &ConfigArgs,
    network: Option<&NetworkFile>,
) -> Result<Option<(Address, Address)>> {
    if let (Some(token), Some(pool)) = (&args.token, &args.pool) {
        return Ok(Some((
            parse_address("TOKEN_ADDRESS", token)?,
            parse_address("POOL_ADDRESS", pool)?,
        )));
    }
    match network {
        Some(network) => Ok(Some(network.addresses()?)),
        None => Ok(None),
    }
}

fn load_network_file(path: &str) -> Result<NetworkFile> {
    let expanded_path = shellexpand::tilde(path);
    let json = fs::read_to_string(expanded_path.as_ref())
        .with_context(|| format!("Failed to read network file: {}", path))?;
    Ok(NetworkFile::from_json(&json)?)
}

// Helper function to load the private key from file, accepting the usual formats
fn load_private_key(path: &str) -> Result<SecretString> {
    let expanded_path = shellexpand::tilde(path);
    let key_data = SecretString::new(
        fs::read_to_string(expanded_path.as_ref())
            .with_context(|| format!("Failed to read private key file: {}", path))?,
    );
    let trimmed = key_data.expose_secret().trim();

    let key = if trimmed.starts_with('"') {
        // JSON string
        serde_json::from_str::<String>(trimmed)
            .with_context(|| "Failed to parse private key JSON string")?
    } else if trimmed.starts_with('{') {
        // JSON object with a "private_key" field
        #[derive(serde::Deserialize)]
        struct KeyFile {
            private_key: String,
        }

        let key_file: KeyFile = serde_json::from_str(trimmed)
            .with_context(|| "Failed to parse private key JSON object")?;
        key_file.private_key
    } else {
        // Bare hex
        trimmed.to_string()
    };

    let key = SecretString::new(key);
    if key.is_blank() {
        return Err(anyhow::anyhow!("Private key file is empty: {}", path));
    }
    Ok(key)
}
