//! Rendering helpers for the interactive front end. Nothing here decides
//! ledger outcomes; it only formats what the [`Blockchain`] reports.

use crate::amount::{format_amount, Amount};
use crate::blockchain::Blockchain;
use crate::transaction::Transaction;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

fn header_cells(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| {
            Cell::new(title)
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold)
        })
        .collect()
}

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header_cells(titles));
    table
}

/// Shortens a 64-char hex hash to `first10...last10`.
pub fn format_hash(hash: &str) -> String {
    if hash.len() > 20 {
        format!("{}...{}", &hash[..10], &hash[hash.len() - 10..])
    } else {
        hash.to_string()
    }
}

pub fn format_timestamp(secs: u64) -> String {
    chrono::DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn transactions_table(transactions: &[Transaction]) -> Table {
    let mut table = new_table(&["Sender", "Receiver", "Amount", "Fee", "Auth", "Created"]);
    for tx in transactions {
        table.add_row(vec![
            Cell::new(&tx.sender).fg(TableColor::Red),
            Cell::new(&tx.receiver).fg(TableColor::Green),
            Cell::new(format_amount(tx.amount)).fg(TableColor::White),
            Cell::new(format_amount(tx.fee)).fg(TableColor::Grey),
            Cell::new(tx.authorizations.len()).fg(TableColor::White),
            Cell::new(format_timestamp(tx.timestamp)).fg(TableColor::Grey),
        ]);
    }
    table
}

pub fn chain_table(chain: &Blockchain) -> Table {
    let mut table = new_table(&["Block", "Nonce", "Hash", "Previous", "Txs", "Mined"]);
    for block in chain.chain() {
        table.add_row(vec![
            Cell::new(format!("#{}", block.header.index)).fg(TableColor::White),
            Cell::new(block.header.nonce).fg(TableColor::Magenta),
            Cell::new(format_hash(&block.hash_str())).fg(TableColor::Yellow),
            Cell::new(format_hash(&block.previous_hash_str())).fg(TableColor::Grey),
            Cell::new(block.transactions.len()).fg(TableColor::White),
            Cell::new(format_timestamp(block.header.timestamp)).fg(TableColor::Grey),
        ]);
    }
    table
}

pub fn balances_table(chain: &Blockchain) -> Table {
    let mut table = new_table(&["Account", "Balance"]);
    for (account, balance) in chain.balances() {
        let color = if balance < Amount::ZERO {
            TableColor::Red
        } else {
            TableColor::Green
        };
        table.add_row(vec![
            Cell::new(&account).fg(TableColor::White),
            Cell::new(format_amount(balance)).fg(color),
        ]);
    }
    table
}

/// Lines explaining why a transfer may have been refused: the authorization
/// threshold against what was supplied, and the sender's funds against the cost.
pub fn rejection_report(
    chain: &Blockchain,
    sender: &str,
    amount: Amount,
    fee: Amount,
    provided_authorizations: usize,
) -> Vec<String> {
    vec![
        format!(
            "Required authorizations: {}, provided: {}",
            chain.required_authorizations(),
            provided_authorizations
        ),
        format!(
            "Sender balance: {}, required: {}",
            format_amount(chain.balance_of(sender)),
            amount
                .checked_add(fee)
                .map(format_amount)
                .unwrap_or_else(|| "out of range".to_string())
        ),
    ]
}

/// One-line summary of the pending pool: count and total fees.
pub fn pending_summary(chain: &Blockchain) -> String {
    let fees = chain
        .mempool()
        .total_fees()
        .map(format_amount)
        .unwrap_or_else(|| "out of range".to_string());
    format!("{} pending, total fees {}", chain.mempool().len(), fees)
}

pub fn print_banner() {
    println!("{}", "powledger".bright_cyan().bold());
    println!("{}", "---------".bright_cyan());
}

pub fn print_menu() {
    println!();
    println!("{}", "1. Add transaction".bright_white());
    println!("{}", "2. Mine pending transactions".bright_white());
    println!("{}", "3. Show blockchain".bright_white());
    println!("{}", "4. Show pending transactions".bright_white());
    println!("{}", "5. Show balances".bright_white());
    println!("{}", "6. Verify chain".bright_white());
    println!("{}", "7. Export chain as JSON".bright_white());
    println!("{}", "8. Exit".bright_white());
}
