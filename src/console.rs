//! Terminal front-end
//!
//! Drives the same page controller as the web interface, with a node's
//! unlocked accounts standing in for the browser wallet.

#![cfg(feature = "server")]

use crate::page::{CONNECT_PROMPT, INSTALL_PROMPT, Page, View};
use crate::rpc::RpcWallet;
use alloy_primitives::Address;
use std::io::{self as std_io, Write};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Connects to the node and reads commands until `/quit`, end of input or
/// Ctrl-C
pub async fn run(
    rpc_url: &str,
    contract: Address,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page: Page<RpcWallet> = Page::new(contract, poll_interval);
    let detected = RpcWallet::detect(rpc_url).await;
    page.acquire_wallet(detected).await?;
    if page.contract().is_some() {
        page.refresh_balance().await?;
    }

    log::info!("Welcome to the Metacrafters ATM, write /help to get the command list");
    render(&page);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std_io::stdout().flush()?;
        tokio::select! {
            line = lines.next_line() => {
                let command = parse_command(line);
                if command == Command::Quit {
                    break;
                }
                if let Err(e) = process_command(&mut page, command, &mut lines).await {
                    log::error!("Error handling command:\n{}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    log::info!("👋 Bye !");
    Ok(())
}

/// Available commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Authorize the first account of the wallet
    Connect,
    /// Re-read the balance
    Balance,
    /// Deposit ether into the ATM
    Deposit,
    /// Withdraw ether from the ATM
    Withdraw,
    /// Fetch the owner information
    Owner,
    /// Edit and submit both minimums
    Limits,
    /// Show the page state
    Info,
    /// List confirmed transactions of this session
    Activity,
    /// Display help information
    Help,
    /// Leave the console
    Quit,
    /// Unknown command
    Unknown(String),
    /// Stdin could not be read
    Error(String),
}

/// Parse a line of input from the console into a Command
pub fn parse_command(line: Result<Option<String>, std::io::Error>) -> Command {
    match line {
        Ok(Some(cmd)) => match cmd.trim() {
            "/connect" => Command::Connect,
            "/balance" => Command::Balance,
            "/deposit" => Command::Deposit,
            "/withdraw" => Command::Withdraw,
            "/owner" => Command::Owner,
            "/limits" => Command::Limits,
            "/info" => Command::Info,
            "/activity" => Command::Activity,
            "/help" => Command::Help,
            "/quit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        },
        Ok(None) => Command::Quit,
        Err(e) => {
            log::error!("Error reading stdin: {}", e);
            Command::Error("Error reading stdin".to_string())
        }
    }
}

/// Execute one command against the page
pub async fn process_command<R: AsyncBufRead + Unpin>(
    page: &mut Page<RpcWallet>,
    cmd: Command,
    input: &mut Lines<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Connect => {
            page.connect_account().await?;
            render(page);
        }

        Command::Balance => {
            page.refresh_balance().await?;
            render(page);
        }

        Command::Deposit => {
            page.deposit_amount = prompt(input, "Deposit amount (ETH)").await?;
            page.deposit().await?;
            report(page);
        }

        Command::Withdraw => {
            page.withdrawal_amount = prompt(input, "Withdrawal amount (ETH)").await?;
            page.withdraw().await?;
            report(page);
        }

        Command::Owner => {
            page.fetch_owner_info().await?;
            match page.owner_info() {
                Some(info) => {
                    println!("Owner Name: {}", info.name);
                    println!("Age: {}", info.age);
                    println!("Gender: {}", info.gender);
                    println!("Loans: {}", info.loans);
                }
                None => render(page),
            }
        }

        Command::Limits => {
            let min_deposit =
                prompt_default(input, "Minimum Deposit (ETH)", page.min_deposit()).await?;
            page.set_min_deposit(&min_deposit);
            let min_withdrawal =
                prompt_default(input, "Minimum Withdrawal (ETH)", page.min_withdrawal()).await?;
            page.set_min_withdrawal(&min_withdrawal);
            page.set_limits().await?;
            println!(
                "✅ Limits submitted: deposit >= {} ETH, withdrawal >= {} ETH",
                page.min_deposit(),
                page.min_withdrawal()
            );
        }

        Command::Info => {
            println!("📊 ATM Information:");
            println!("----------------------------------------");
            println!("Contract: {}", page.contract_address());
            println!("Node: {}", node_url(page));
            if let Some(atm) = page.contract() {
                println!("Signing account: {}", atm.account());
            }
            render(page);
            println!("Minimum Deposit: {} ETH", page.min_deposit());
            println!("Minimum Withdrawal: {} ETH", page.min_withdrawal());
            println!("----------------------------------------");
        }

        Command::Activity => {
            if page.activity().is_empty() {
                println!("No transactions yet.");
            }
            for entry in page.activity().entries() {
                println!(
                    "{}  {:<10} {:<14} {} (block {})",
                    entry.time(),
                    entry.kind.to_string(),
                    entry.summary,
                    entry.short_hash(),
                    entry
                        .block
                        .map_or_else(|| "?".to_string(), |b| b.to_string())
                );
            }
        }

        Command::Help => {
            println!("📜 Command list:");
            println!("----------------------------------------");
            println!("/connect    - Connect your wallet account");
            println!("/balance    - Refresh your balance");
            println!("/deposit    - Deposit ether");
            println!("/withdraw   - Withdraw ether");
            println!("/owner      - Show the account owner info");
            println!("/limits     - Set the minimum deposit and withdrawal");
            println!("/info       - Show the page state");
            println!("/activity   - Show this session's transactions");
            println!("/help       - Show this help message");
            println!("/quit       - Leave");
            println!("----------------------------------------");
        }

        Command::Quit => {}

        Command::Unknown(msg) => {
            println!("❌ Unknown command: {}", msg);
        }

        Command::Error(msg) => {
            println!("❌ Error: {}", msg);
        }
    }

    Ok(())
}

/// Text rendering of the current view
pub fn render_lines(page: &Page<RpcWallet>) -> Vec<String> {
    match page.view() {
        View::InstallPrompt => vec![INSTALL_PROMPT.to_string()],
        View::ConnectButton => vec![format!("{} (type /connect)", CONNECT_PROMPT)],
        View::Account => {
            let account = page.account().map(|a| a.to_string()).unwrap_or_default();
            let balance = page
                .balance()
                .map_or_else(|| "Loading...".to_string(), |b| b.to_string());
            vec![
                format!("Your Account: {}", account),
                format!("Your Balance: {}", balance),
            ]
        }
    }
}

fn node_url(page: &Page<RpcWallet>) -> String {
    page.wallet()
        .map_or_else(|| "not reachable".to_string(), |w| w.url().to_string())
}

fn render(page: &Page<RpcWallet>) {
    for line in render_lines(page) {
        println!("{}", line);
    }
}

/// Shows the validation error if the last action was rejected, the view
/// otherwise
fn report(page: &Page<RpcWallet>) {
    if page.error().is_empty() {
        render(page);
    } else {
        println!("❌ {}", page.error());
    }
}

/// Prompts the user for one line of input, end of input reads as empty
async fn prompt<R: AsyncBufRead + Unpin>(
    input: &mut Lines<R>,
    label: &str,
) -> std_io::Result<String> {
    print!("{}: ", label);
    std_io::stdout().flush()?;
    let line = input.next_line().await?.unwrap_or_default();
    Ok(line.trim().to_string())
}

/// Prompts with the current value, an empty answer keeps it
async fn prompt_default<R: AsyncBufRead + Unpin>(
    input: &mut Lines<R>,
    label: &str,
    current: u64,
) -> std_io::Result<String> {
    let answer = prompt(input, &format!("{} [{}]", label, current)).await?;
    if answer.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(answer)
    }
}
