//! `memegent` command-line launcher

use alloy_primitives::Address;
use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use memegent_launch::{
    ApprovalPolicy, JsonFileStore, LaunchConfig, LaunchCoordinator, LaunchRequest,
    MemecoinAddressStore, TokenInspector, WalletProvider,
};
use memegent_rpc::RpcWallet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("memegent")
        .version(memegent_launch::VERSION)
        .about("Launch memecoins through the launchpad contract")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("rpc-url")
                .long("rpc-url")
                .global(true)
                .help("JSON-RPC endpoint of the signing node"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Address store file"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("launch")
                .about("Approve the paired token and launch a new memecoin")
                .arg(Arg::new("name").long("name").required(true).help("Token name"))
                .arg(
                    Arg::new("symbol")
                        .long("symbol")
                        .help("Token symbol (defaults to the name's initials)"),
                )
                .arg(
                    Arg::new("supply")
                        .long("supply")
                        .help("Initial supply in whole tokens (defaults to 1000000)"),
                )
                .arg(
                    Arg::new("liquidity-memecoin")
                        .long("liquidity-memecoin")
                        .help("Memecoin amount seeded into the pool (defaults to half the supply)"),
                )
                .arg(
                    Arg::new("liquidity-paired")
                        .long("liquidity-paired")
                        .help("Paired token amount seeded into the pool (defaults to 10)"),
                )
                .arg(
                    Arg::new("paired-token")
                        .long("paired-token")
                        .help("Paired token address (defaults to the configured one)"),
                )
                .arg(
                    Arg::new("approval")
                        .long("approval")
                        .value_parser(value_parser!(ApprovalPolicy))
                        .help("Approval policy: always | when-insufficient"),
                ),
        )
        .subcommand(
            Command::new("address")
                .about("Manage the stored memecoin address")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the stored address"))
                .subcommand(Command::new("clear").about("Forget the stored address")),
        )
        .subcommand(
            Command::new("token-info")
                .about("Read name, symbol, supply and balance of a memecoin")
                .arg(
                    Arg::new("token")
                        .long("token")
                        .value_parser(value_parser!(Address))
                        .help("Token to inspect (defaults to the stored address)"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<LaunchConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => LaunchConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LaunchConfig::new(),
    }
    .with_env_overrides()?;

    if let Some(url) = matches.get_one::<String>("rpc-url") {
        config = config.with_rpc_url(url.clone());
    }
    if let Some(path) = matches.get_one::<PathBuf>("store") {
        config = config.with_store_path(path.clone());
    }
    Ok(config)
}

fn address_store(config: &LaunchConfig) -> MemecoinAddressStore {
    MemecoinAddressStore::new(Arc::new(JsonFileStore::new(config.store_path.clone())))
}

/// Fill unset launch fields from the name-based suggestion
///
/// A supply given without a memecoin liquidity amount seeds half of it.
fn build_request(config: &LaunchConfig, args: &ArgMatches) -> anyhow::Result<LaunchRequest> {
    let arg = |name: &str| args.get_one::<String>(name).cloned();

    let mut request = LaunchRequest::suggested(arg("name").unwrap_or_default());
    request.paired_token = config.default_paired_token.to_string();
    if let Some(symbol) = arg("symbol") {
        request.symbol = symbol;
    }
    if let Some(supply) = arg("supply") {
        request.liquidity_memecoin_amount = half_of(&supply).unwrap_or_else(|| supply.clone());
        request.initial_supply = supply;
    }
    if let Some(amount) = arg("liquidity-memecoin") {
        request.liquidity_memecoin_amount = amount;
    }
    if let Some(amount) = arg("liquidity-paired") {
        request.liquidity_paired_token_amount = amount;
    }
    if let Some(token) = arg("paired-token") {
        request.paired_token = token;
    }

    if let Some(field) = request.blank_field() {
        bail!("token {field} must not be empty");
    }
    Ok(request)
}

/// Half of a whole-number amount; `None` for anything else
fn half_of(amount: &str) -> Option<String> {
    amount.trim().parse::<u128>().ok().map(|n| (n / 2).to_string())
}

async fn run_launch(mut config: LaunchConfig, args: &ArgMatches) -> anyhow::Result<bool> {
    if let Some(policy) = args.get_one::<ApprovalPolicy>("approval") {
        config = config.with_approval_policy(*policy);
    }

    let request = build_request(&config, args)?;
    tracing::debug!(?request, "launch request");

    let wallet = Arc::new(RpcWallet::from_config(&config));
    let store = Arc::new(JsonFileStore::new(config.store_path.clone()));
    let coordinator = LaunchCoordinator::new(config, store).with_wallet(wallet);

    let outcome = coordinator.launch(request).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(outcome.success)
}

fn run_address(config: &LaunchConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let store = address_store(config);
    match args.subcommand() {
        Some(("show", _)) => match store.get()? {
            Some(address) => println!("{address}"),
            None => println!("no memecoin address stored"),
        },
        Some(("clear", _)) => {
            store.clear()?;
            tracing::info!(path = %config.store_path.display(), "memecoin address cleared");
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}

async fn run_token_info(config: &LaunchConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let wallet = RpcWallet::from_config(config);
    let account = wallet
        .request_accounts()
        .await?
        .into_iter()
        .next()
        .context("node returned no accounts")?;
    let signer = wallet.signer_for(account);

    let inspector = TokenInspector::new();
    let info = match args.get_one::<Address>("token") {
        Some(token) => inspector.inspect(&signer, *token).await?,
        None => inspector.inspect_stored(&address_store(config), &signer).await?,
    };

    println!("{} ({}) at {}", info.name, info.symbol, info.address);
    println!("  decimals:     {}", info.decimals);
    println!("  total supply: {}", info.formatted_total_supply()?);
    println!("  balance:      {}", info.formatted_balance()?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("launch", args)) => {
            if !run_launch(config, args).await? {
                std::process::exit(1);
            }
        }
        Some(("address", args)) => run_address(&config, args)?,
        Some(("token-info", args)) => run_token_info(&config, args).await?,
        Some((other, _)) => bail!("unknown command `{other}`"),
        None => unreachable!("subcommand_required"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn launch_args_parse() {
        let matches = cli()
            .try_get_matches_from([
                "memegent",
                "--rpc-url",
                "http://127.0.0.1:8545",
                "launch",
                "--name",
                "Papi",
                "--symbol",
                "PAPI",
                "--supply",
                "1000000",
                "--liquidity-memecoin",
                "500000",
                "--liquidity-paired",
                "10",
                "--approval",
                "when-insufficient",
            ])
            .unwrap();

        let config = load_config(&matches).unwrap();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");

        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "launch");
        assert_eq!(
            args.get_one::<ApprovalPolicy>("approval"),
            Some(&ApprovalPolicy::WhenInsufficient)
        );
    }

    fn launch_request(extra: &[&str]) -> anyhow::Result<LaunchRequest> {
        let argv = ["memegent", "launch"].iter().chain(extra).copied();
        let matches = cli().try_get_matches_from(argv)?;
        let (_, args) = matches.subcommand().context("no subcommand")?;
        build_request(&LaunchConfig::new(), args)
    }

    #[test]
    fn launch_requires_name() {
        let err = cli().try_get_matches_from(["memegent", "launch"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn blank_name_or_symbol_is_refused() {
        let err = launch_request(&["--name", "", "--symbol", "   "]).unwrap_err();
        assert!(err.to_string().contains("name"), "{err}");

        let err = launch_request(&["--name", "Papi", "--symbol", " "]).unwrap_err();
        assert!(err.to_string().contains("symbol"), "{err}");
    }

    #[test]
    fn name_alone_fills_in_suggested_parameters() {
        let request = launch_request(&["--name", "Papi Coin"]).unwrap();
        assert_eq!(request.symbol, "PC");
        assert_eq!(request.initial_supply, "1000000");
        assert_eq!(request.liquidity_memecoin_amount, "500000");
        assert_eq!(request.liquidity_paired_token_amount, "10");
        assert_eq!(
            request.paired_token,
            memegent_launch::DEFAULT_PAIRED_TOKEN.to_string()
        );
    }

    #[test]
    fn explicit_values_override_suggestion() {
        let request = launch_request(&[
            "--name",
            "Papi",
            "--symbol",
            "PAPI",
            "--supply",
            "3000000",
            "--liquidity-paired",
            "25.5",
        ])
        .unwrap();
        assert_eq!(request.symbol, "PAPI");
        assert_eq!(request.initial_supply, "3000000");
        assert_eq!(request.liquidity_memecoin_amount, "1500000");
        assert_eq!(request.liquidity_paired_token_amount, "25.5");

        let request =
            launch_request(&["--name", "Papi", "--liquidity-memecoin", "42"]).unwrap();
        assert_eq!(request.liquidity_memecoin_amount, "42");
        assert_eq!(request.initial_supply, "1000000");
    }

    #[test]
    fn token_flag_parses_addresses() {
        let matches = cli()
            .try_get_matches_from([
                "memegent",
                "token-info",
                "--token",
                "0x039e2fB66102314Ce7b64Ce5Ce3E5183bc94aD38",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(
            args.get_one::<Address>("token"),
            Some(&memegent_launch::DEFAULT_PAIRED_TOKEN)
        );
    }
}
