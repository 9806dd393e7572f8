#![forbid(unsafe_code)]
//! Interactive menu over an in-memory powledger chain.

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use powledger::amount::{amount_from_f64, format_amount, parse_amount, Amount};
use powledger::blockchain::Blockchain;
use powledger::cli::{
    balances_table, chain_table, format_hash, pending_summary, print_banner, print_menu,
    rejection_report, transactions_table,
};
use powledger::config::{load_config, DEFAULT_CONFIG_PATH};
use powledger::transaction::Transaction;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "powledger", about = "Proof-of-work ledger simulator")]
struct Args {
    /// Path to the TOML config file; defaults apply when it does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the configured mining difficulty.
    #[arg(short, long)]
    difficulty: Option<u32>,

    /// Miner credited when none is entered at the prompt.
    #[arg(short, long)]
    miner: Option<String>,
}

/// Prints `label` and reads one trimmed line. `None` on end of input.
fn prompt(input: &mut impl BufRead, label: &str) -> io::Result<Option<String>> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn add_transaction(
    chain: &mut Blockchain,
    input: &mut impl BufRead,
    fee: Amount,
) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(sender) = prompt(input, "Enter sender address: ")? else {
        return Ok(false);
    };
    let Some(receiver) = prompt(input, "Enter receiver address: ")? else {
        return Ok(false);
    };
    let Some(raw_amount) = prompt(input, "Enter amount: ")? else {
        return Ok(false);
    };
    let amount = match parse_amount(&raw_amount) {
        Ok(amount) => amount,
        Err(e) => {
            println!("{}", format!("❌ {}", e).red());
            return Ok(true);
        }
    };
    let Some(raw_count) = prompt(input, "Enter number of authorizations: ")? else {
        return Ok(false);
    };
    let count: usize = match raw_count.parse() {
        Ok(count) => count,
        Err(_) => {
            println!("{}", format!("❌ '{}' is not a number", raw_count).red());
            return Ok(true);
        }
    };

    let mut tx = Transaction::new(sender.as_str(), receiver.as_str(), amount).with_fee(fee);
    for i in 1..=count {
        let Some(token) = prompt(input, &format!("Enter authorization {}: ", i))? else {
            return Ok(false);
        };
        tx.add_authorization(token);
    }

    match chain.try_submit_transaction(tx, None) {
        Ok(()) => println!("{}", "✅ Transaction added!".green().bold()),
        Err(e) => {
            println!("{}", format!("❌ Failed to add transaction: {}", e).red().bold());
            for line in rejection_report(chain, &sender, amount, fee, count) {
                println!("   {}", line.yellow());
            }
        }
    }
    Ok(true)
}

fn mine(chain: &mut Blockchain, input: &mut impl BufRead, default_miner: Option<&str>) -> io::Result<bool> {
    let label = match default_miner {
        Some(miner) => format!("Enter miner address [{}]: ", miner),
        None => "Enter miner address: ".to_string(),
    };
    let Some(entered) = prompt(input, &label)? else {
        return Ok(false);
    };
    let miner = match (entered.is_empty(), default_miner) {
        (true, Some(miner)) => miner.to_string(),
        _ => entered,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Mining at difficulty {}...", chain.difficulty()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = chain.try_mine_pending(&miner);
    spinner.finish_and_clear();

    match result {
        Ok((block, outcome)) => {
            let elapsed = humantime::format_duration(Duration::from_millis(outcome.elapsed.as_millis() as u64));
            println!("{}", "⛏️  New block mined!".green().bold());
            println!("   Index:        #{}", block.header.index);
            println!("   Nonce:        {}", block.header.nonce);
            println!("   Attempts:     {}", outcome.attempts);
            println!("   Hash:         {}", format_hash(&block.hash_str()).yellow());
            println!("   Transactions: {}", block.transactions.len());
            println!("   Mining time:  {}", elapsed);
        }
        Err(e) => println!("{}", format!("Mining failed: {}", e).red()),
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    let fee = amount_from_f64(config.default_fee)?;
    let mut chain = Blockchain::with_config(&config)?;

    print_banner();
    println!(
        "Difficulty {}, reward {}, {} authorizations required",
        chain.difficulty(),
        format_amount(chain.mining_reward()),
        chain.required_authorizations()
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print_menu();
        let Some(choice) = prompt(&mut input, "Choose an action: ")? else {
            break;
        };
        let keep_going = match choice.as_str() {
            "1" => add_transaction(&mut chain, &mut input, fee)?,
            "2" => mine(&mut chain, &mut input, args.miner.as_deref())?,
            "3" => {
                println!("{}", chain_table(&chain));
                for block in chain.chain().iter().filter(|b| !b.transactions.is_empty()) {
                    println!("{}", format!("Block #{} transactions:", block.header.index).cyan());
                    println!("{}", transactions_table(&block.transactions));
                }
                true
            }
            "4" => {
                if chain.pending_transactions().is_empty() {
                    println!("{}", "No pending transactions.".yellow());
                } else {
                    println!("{}", transactions_table(chain.pending_transactions()));
                    println!("{}", pending_summary(&chain).cyan());
                }
                true
            }
            "5" => {
                println!("{}", balances_table(&chain));
                true
            }
            "6" => {
                match chain.verify_chain() {
                    Ok(()) => println!("{}", format!("✅ Chain of {} blocks is valid", chain.len()).green()),
                    Err(e) => println!("{}", format!("❌ Chain is invalid: {}", e).red().bold()),
                }
                true
            }
            "7" => {
                println!("{}", chain.to_json()?);
                true
            }
            "8" => false,
            other => {
                println!("{}", format!("Unknown option '{}'", other).red());
                true
            }
        };
        if !keep_going {
            break;
        }
    }

    Ok(())
}
