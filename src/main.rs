use std::{fs::File, io::Write, path::PathBuf};

use anyhow::Context;
use cashback_ledger::{
    config::AppConfig, domain::ledger::filter_by_kind, request_withdrawal, CsvStore,
    LedgerSummary, PayoutMethod, Session, TransactionKind, TransactionStore,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "cashback-ledger")]
#[command(about = "Cashback wallet balances and withdrawal requests", long_about = None)]
struct Cli {
    /// Ledger CSV file, overrides the configured one
    #[arg(long, global = true, value_name = "FILE")]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Available balance, inflows, outflows and pending amounts
    Summary {
        #[arg(long)]
        user: Uuid,
    },

    /// Summaries for every user in the ledger
    Report,

    /// Transactions, newest first
    History {
        #[arg(long)]
        user: Uuid,
        /// Only show one kind
        #[arg(long, value_enum, ignore_case = true)]
        kind: Option<TransactionKind>,
    },

    /// Request a withdrawal of the available balance
    Withdraw {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        amount: String,
        /// Defaults to the configured method
        #[arg(long, value_enum, ignore_case = true)]
        method: Option<PayoutMethod>,
        /// PIX key or bank details
        #[arg(long)]
        key: String,
    },

    /// Statement export as CSV
    Export {
        #[arg(long)]
        user: Uuid,
        /// Output file, stdout when omitted
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn print_summary(summary: &LedgerSummary) {
    println!("available: {}", summary.balance);
    println!("inflows:   {}", summary.inflows);
    println!("outflows:  {}", summary.outflows);
    println!("pending:   {}", summary.pending_net);
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut store = CsvStore::new(cli.ledger.unwrap_or(config.ledger_path));
    tracing::debug!(ledger = %store.path().display(), "using ledger");

    match cli.command {
        Commands::Summary { user } => {
            let txns = store.list_transactions(&Session::new(user))?;
            print_summary(&LedgerSummary::from_transactions(&txns));
        }
        Commands::Report => {
            for (user, summary) in LedgerSummary::per_user(store.load()?) {
                println!("{user}");
                print_summary(&summary);
            }
        }
        Commands::History { user, kind } => {
            let txns = store.list_transactions(&Session::new(user))?;
            let shown = match kind {
                Some(kind) => filter_by_kind(&txns, kind),
                None => txns.iter().collect(),
            };

            if shown.is_empty() {
                println!("no transactions found");
            }
            for tx in shown {
                let sign = if tx.kind.is_inflow() { "+" } else { "-" };
                println!(
                    "{} {:<10} {:<13} {:<9} {}",
                    tx.created_at.format("%d/%m/%Y"),
                    tx.kind.to_string(),
                    format!("{sign}{}", tx.amount),
                    tx.status.to_string(),
                    tx.description.as_deref().unwrap_or("-"),
                );
            }
        }
        Commands::Withdraw {
            user,
            amount,
            method,
            key,
        } => {
            let created = request_withdrawal(
                &mut store,
                &Session::new(user),
                amount,
                method.unwrap_or(config.payout_method),
                &key,
            )?;
            println!("withdrawal {} of {} is {}", created.id, created.amount, created.status);
        }
        Commands::Export { user, out } => {
            let txns = store.list_transactions(&Session::new(user))?;
            let writer: Box<dyn Write> = match out {
                Some(path) => Box::new(
                    File::create(&path)
                        .with_context(|| format!("cannot create {}", path.display()))?,
                ),
                None => Box::new(std::io::stdout()),
            };
            cashback_ledger::csv::write_statement(txns, writer)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn withdraw_arguments_parse() {
        let user = Uuid::new_v4();
        let user_arg = user.to_string();
        let cli = Cli::try_parse_from([
            "cashback-ledger",
            "--ledger",
            "wallet.csv",
            "withdraw",
            "--user",
            user_arg.as_str(),
            "--amount",
            "12.50",
            "--method",
            "bank",
            "--key",
            "001 1234",
        ])
        .unwrap();

        assert_eq!(cli.ledger, Some(PathBuf::from("wallet.csv")));
        match cli.command {
            Commands::Withdraw {
                user: parsed,
                amount,
                method,
                key,
            } => {
                assert_eq!(parsed, user);
                assert_eq!(amount.parse::<Decimal>().unwrap(), Decimal::new(1250, 2));
                assert_eq!(method, Some(PayoutMethod::Bank));
                assert_eq!(key, "001 1234");
            }
            _ => panic!("expected withdraw"),
        }
    }

    #[test]
    fn history_kind_parses() {
        let user = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from([
            "cashback-ledger",
            "history",
            "--user",
            user.as_str(),
            "--kind",
            "Cashback",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::History {
                kind: Some(TransactionKind::Cashback),
                ..
            }
        ));
        assert!(Cli::try_parse_from([
            "cashback-ledger",
            "history",
            "--user",
            user.as_str(),
            "--kind",
            "refund",
        ])
        .is_err());
    }
}
