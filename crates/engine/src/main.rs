use anyhow::{Context, bail};
use serde::Serialize;

use billforge_engine::{BillingEngine, EngineConfig};
use billforge_invoicing::{LedgerFilter, PaymentStatus};

const USAGE: &str = "usage: billforge [summary | ledger [unpaid|partial|paid] | customers | next-number]";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    billforge_observability::init();

    let config = EngineConfig::from_env().context("invalid billforge configuration")?;
    let engine = BillingEngine::open(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] | ["summary"] => print_json(&engine.summary(&LedgerFilter::all())?),
        ["ledger"] => print_json(&engine.query(&LedgerFilter::all())?),
        ["ledger", status] => {
            let status: PaymentStatus = status.parse()?;
            print_json(&engine.query(&LedgerFilter::all().status(status))?)
        }
        ["customers"] => print_json(&engine.list_customers()?),
        ["next-number"] => print_json(&engine.peek_next_number()?),
        _ => bail!("{USAGE}"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
