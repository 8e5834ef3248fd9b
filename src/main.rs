mod activity;
mod amount;
mod browser;
mod console;
mod contract;
mod page;
mod rpc;
mod views;
mod wallet;

use dioxus::prelude::*;

#[cfg(feature = "server")]
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Drive the ATM from the terminal instead of serving the web page
    #[arg(long, default_value_t = false)]
    console: bool,
    /// JSON-RPC endpoint of a node with unlocked accounts, used by the console
    #[arg(long, default_value_t = String::from("http://127.0.0.1:8545"))]
    rpc_url: String,
    /// Address of the deployed ATM contract
    #[arg(long, default_value_t = contract::DEFAULT_ATM_ADDRESS)]
    contract: alloy_primitives::Address,
    /// Delay between two receipt polls, in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "server")]
    {
        use clap::Parser;
        use std::time::Duration;

        env_logger::init();
        let args = Args::parse();
        if args.console {
            let runtime = tokio::runtime::Runtime::new()?;
            return runtime.block_on(console::run(
                &args.rpc_url,
                args.contract,
                Duration::from_millis(args.poll_interval_ms),
            ));
        }
        log::debug!("Serving the web interface");
    }

    dioxus::launch(App);
    Ok(())
}

#[component]
fn App() -> Element {
    rsx! {
        views::Home {}
    }
}
