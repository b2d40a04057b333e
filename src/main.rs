//! 0x Swap CLI
//!
//! Prices, approves and executes token swaps through the 0x API from a
//! local-key wallet.

use std::sync::Arc;

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::Address;
use anyhow::Result;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use zrx_swap_api::{SwapAmount, SwapQuoteRequest, ZrxClient, ZrxPrice, ZrxQuote};
use zrx_swap_chain::{WalletSigner, WalletSignerBuilder};
use zrx_swap_core::{SwapConfig, SwapOrchestrator, SwapStore};

/// Environment variable names.
mod env {
    pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
}

#[derive(Debug, Parser)]
#[command(name = "zrx-swap", version, about = "Swap tokens through the 0x API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch an indicative price and report whether approval is needed
    Price(TradeArgs),
    /// Fetch a firm, fillable quote
    Quote(TradeArgs),
    /// Price, approve if needed, quote and execute
    Swap(TradeArgs),
    /// Grant a spender an unlimited allowance on a token
    Approve {
        /// Token contract address
        token: Address,
        /// Spender (allowance target)
        spender: Address,
    },
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("amount").required(true).args(["sell_amount", "buy_amount"])))]
struct TradeArgs {
    /// Symbol of the asset to sell
    sell: String,
    /// Symbol of the asset to buy
    buy: String,
    /// Amount of the sell asset (human-readable)
    #[arg(long)]
    sell_amount: Option<String>,
    /// Amount of the buy asset (human-readable)
    #[arg(long)]
    buy_amount: Option<String>,
    /// Slippage tolerance as a fraction (overrides config)
    #[arg(long)]
    slippage: Option<f64>,
    /// Gas price in gwei (defaults to the node's current price)
    #[arg(long, value_parser = parse_gwei)]
    gas_price_gwei: Option<u128>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,zrx_swap_core=debug")),
        )
        .init();

    let cli = Cli::parse();

    let config = SwapConfig::from_env()?;
    config.log_config();

    let signer = Arc::new(load_signer(&config).await?);
    let client = ZrxClient::new(config.api.credentials(), config.api.request_timeout())?;
    let store = SwapStore::new();
    spawn_state_logger(&store);

    let orchestrator = SwapOrchestrator::new(
        client,
        signer.clone(),
        store,
        config.chain.network(),
    );

    match cli.command {
        Command::Price(args) => {
            let request = build_request(&config, &signer, &args).await?;
            match orchestrator.fetch_price(&request).await? {
                Some(outcome) => {
                    print_price(&outcome.quote);
                    println!("needs approval: {}", outcome.needs_approval);
                }
                None => println!("No valid price available, try again"),
            }
        }
        Command::Quote(args) => {
            let request = build_request(&config, &signer, &args).await?;
            match orchestrator.fetch_quote(&request).await? {
                Some(quote) => print_quote(&quote),
                None => println!("No valid quote available, try again"),
            }
        }
        Command::Swap(args) => {
            let request = build_request(&config, &signer, &args).await?;
            run_swap(&orchestrator, &request).await?;
        }
        Command::Approve { token, spender } => {
            orchestrator.approve_transfer(token, spender).await;
            println!("Approval flow finished for {token} -> {spender}");
        }
    }

    Ok(())
}

async fn load_signer(config: &SwapConfig) -> Result<WalletSigner> {
    let private_key = std::env::var(env::PRIVATE_KEY)
        .map_err(|_| anyhow::anyhow!("Missing env var: {}", env::PRIVATE_KEY))?;

    WalletSignerBuilder::new(&config.chain.rpc_url, config.chain.chain_id)
        .poll_interval(config.chain.receipt_poll_interval())
        .build(&private_key)
        .await
}

async fn build_request(
    config: &SwapConfig,
    signer: &WalletSigner,
    args: &TradeArgs,
) -> Result<SwapQuoteRequest> {
    let amount = match (&args.sell_amount, &args.buy_amount) {
        (Some(sell), None) => SwapAmount::Sell(sell.clone()),
        (None, Some(buy)) => SwapAmount::Buy(buy.clone()),
        _ => anyhow::bail!("Specify exactly one of --sell-amount or --buy-amount"),
    };

    let gas_price = match args.gas_price_gwei {
        Some(wei) => wei,
        None => signer.gas_price().await?,
    };

    Ok(SwapQuoteRequest {
        sell_asset: config.find_asset(&args.sell)?,
        buy_asset: config.find_asset(&args.buy)?,
        amount,
        slippage_tolerance: args.slippage.unwrap_or(config.swap.slippage_tolerance),
        gas_price,
    })
}

/// Parse a non-negative decimal gwei amount into wei.
fn parse_gwei(value: &str) -> Result<u128, String> {
    if let Some((_, fraction)) = value.split_once('.') {
        if fraction.len() > 9 {
            return Err("gwei amounts have at most 9 decimals".to_string());
        }
    }

    match parse_units(value, "gwei").map_err(|e| e.to_string())? {
        ParseUnits::U256(wei) => u128::try_from(wei).map_err(|e| e.to_string()),
        ParseUnits::I256(_) => Err("gas price must not be negative".to_string()),
    }
}

async fn run_swap(orchestrator: &SwapOrchestrator, request: &SwapQuoteRequest) -> Result<()> {
    let Some(priced) = orchestrator.fetch_price(request).await? else {
        anyhow::bail!("No valid price available, try again");
    };
    print_price(&priced.quote);

    if priced.needs_approval {
        info!(
            token = %priced.quote.sell_token_address,
            spender = %priced.quote.allowance_target,
            "Sell token needs approval"
        );
        orchestrator
            .approve_transfer(priced.quote.sell_token_address, priced.quote.allowance_target)
            .await;

        let Some(repriced) = orchestrator.fetch_price(request).await? else {
            anyhow::bail!("No valid price available after approval, try again");
        };
        if repriced.needs_approval {
            anyhow::bail!("Approval did not complete; retry the swap to approve again");
        }
    }

    let Some(quote) = orchestrator.fetch_quote(request).await? else {
        anyhow::bail!("No valid quote available, try again");
    };
    print_quote(&quote);

    let tx_hash = orchestrator.execute_swap(&quote).await?;
    println!("Swap submitted: {tx_hash}");
    Ok(())
}

/// Log every state transition at debug level.
fn spawn_state_logger(store: &SwapStore) {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            debug!(
                has_request = state.latest_quote_request.is_some(),
                has_quote = state.final_quote.is_some(),
                approving = ?state.in_progress_approval_contract,
                "Swap state changed"
            );
        }
    });
}

fn print_price(price: &ZrxPrice) {
    println!("price:      {}", price.price);
    println!("sell:       {} of {}", price.sell_amount, price.sell_token_address);
    println!("buy:        {} of {}", price.buy_amount, price.buy_token_address);
    println!("est. gas:   {}", price.estimated_gas);
    let sources: Vec<_> = price
        .active_sources()
        .map(|s| format!("{} ({})", s.name, s.proportion))
        .collect();
    println!("sources:    {}", sources.join(", "));
}

fn print_quote(quote: &ZrxQuote) {
    print_price(&quote.price);
    println!("guaranteed: {}", quote.guaranteed_price);
    println!("to:         {}", quote.to);
    println!("gas limit:  {}", quote.gas);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gwei() {
        assert_eq!(parse_gwei("30").unwrap(), 30_000_000_000);
        assert_eq!(parse_gwei("1.5").unwrap(), 1_500_000_000);
        assert_eq!(parse_gwei("0.000000001").unwrap(), 1);
        assert!(parse_gwei("-1").is_err());
        assert!(parse_gwei("NaN").is_err());
        assert!(parse_gwei("0.0000000001").is_err());
    }

    #[test]
    fn test_cli_rejects_negative_gas_price() {
        let result = Cli::try_parse_from([
            "zrx-swap",
            "price",
            "ETH",
            "USDC",
            "--sell-amount",
            "1",
            "--gas-price-gwei=-5",
        ]);
        assert!(result.is_err());
    }
}
