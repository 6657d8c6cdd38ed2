use std::error::Error;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ledger::{
    Engine, Money, NewGroup, NewObligation, NewOrganization, NewTransaction, ObligationKind,
    TransactionKind,
};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;

mod settings;

type ResultApp<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "ledgerctl")]
#[command(about = "Operate the ledger: organizations, transactions, groups and obligations")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, default_value = "settings")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Org(Org),
    Tx(Tx),
    Group(Group),
    Obligation(Obligation),
    /// Balance, income, expense and pending obligations of an organization.
    Stats {
        #[arg(long)]
        org: String,
    },
}

#[derive(Args, Debug)]
struct Org {
    #[command(subcommand)]
    command: OrgCommand,
}

#[derive(Subcommand, Debug)]
enum OrgCommand {
    /// List the organizations of a user, creating the personal one if needed.
    List {
        #[arg(long)]
        user: String,
    },
    Create {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        currency: Option<String>,
    },
    Rename {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        user: String,
    },
    Delete {
        #[arg(long)]
        id: String,
        #[arg(long)]
        user: String,
    },
}

#[derive(Args, Debug)]
struct Tx {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Add {
        #[arg(long)]
        org: String,
        #[arg(long)]
        amount: Money,
        #[arg(long, value_enum)]
        kind: TxKind,
        #[arg(long)]
        category: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },
    List {
        #[arg(long)]
        org: String,
    },
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create {
        #[arg(long)]
        org: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    Total {
        #[arg(long)]
        org: String,
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
struct Obligation {
    #[command(subcommand)]
    command: ObligationCommand,
}

#[derive(Subcommand, Debug)]
enum ObligationCommand {
    Add {
        #[arg(long)]
        org: String,
        #[arg(long)]
        person: String,
        #[arg(long)]
        amount: Money,
        #[arg(long, value_enum)]
        kind: ObligationSide,
        #[arg(long)]
        notes: Option<String>,
    },
    Settle {
        #[arg(long)]
        org: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        amount: Money,
        /// Also record the payment as a transaction.
        #[arg(long)]
        record: bool,
    },
    List {
        #[arg(long)]
        org: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TxKind {
    Income,
    Expense,
}

impl From<TxKind> for TransactionKind {
    fn from(kind: TxKind) -> Self {
        match kind {
            TxKind::Income => TransactionKind::Income,
            TxKind::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ObligationSide {
    Give,
    Take,
}

impl From<ObligationSide> for ObligationKind {
    fn from(side: ObligationSide) -> Self {
        match side {
            ObligationSide::Give => ObligationKind::Give,
            ObligationSide::Take => ObligationKind::Take,
        }
    }
}

#[tokio::main]
async fn main() -> ResultApp<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger_app={level},ledger={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let database = sea_orm::Database::connect(&settings.database.url).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!(url = %settings.database.url, "database ready");

    let engine = Engine::builder().database(database).build().await?;
    run(&engine, cli.command).await
}

fn print<T: Serialize>(value: &T) -> ResultApp<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(engine: &Engine, command: Command) -> ResultApp<()> {
    match command {
        Command::Org(org) => match org.command {
            OrgCommand::List { user } => {
                engine.ensure_default_personal(&user).await?;
                print(&engine.organizations_for_user(&user).await?)
            }
            OrgCommand::Create {
                owner,
                name,
                currency,
            } => {
                let mut cmd = NewOrganization::new(owner, name);
                if let Some(currency) = currency {
                    cmd = cmd.currency(currency);
                }
                print(&engine.new_organization(cmd).await?)
            }
            OrgCommand::Rename { id, name, user } => {
                print(&engine.rename_organization(&id, &name, &user).await?)
            }
            OrgCommand::Delete { id, user } => {
                print(&engine.delete_organization(&id, &user).await?)
            }
        },
        Command::Tx(tx) => match tx.command {
            TxCommand::Add {
                org,
                amount,
                kind,
                category,
                notes,
                group,
            } => {
                let mut cmd = NewTransaction::new(org, kind.into(), amount, category, Utc::now());
                if let Some(notes) = notes {
                    cmd = cmd.notes(notes);
                }
                if let Some(group) = group {
                    cmd = cmd.group(group);
                }
                print(&engine.new_transaction(cmd).await?)
            }
            TxCommand::List { org } => print(&engine.transactions(&org).await?),
        },
        Command::Group(group) => match group.command {
            GroupCommand::Create {
                org,
                title,
                description,
            } => {
                let mut cmd = NewGroup::new(org, title, Utc::now());
                if let Some(description) = description {
                    cmd = cmd.description(description);
                }
                print(&engine.new_group(cmd).await?)
            }
            GroupCommand::Total { org, id } => print(&engine.group_total(&org, &id).await?),
        },
        Command::Obligation(obligation) => match obligation.command {
            ObligationCommand::Add {
                org,
                person,
                amount,
                kind,
                notes,
            } => {
                let mut cmd = NewObligation::new(org, person, amount, kind.into());
                if let Some(notes) = notes {
                    cmd = cmd.notes(notes);
                }
                print(&engine.new_obligation(cmd).await?)
            }
            ObligationCommand::Settle {
                org,
                id,
                amount,
                record,
            } => print(&engine.settle(&org, &id, amount, record).await?),
            ObligationCommand::List { org } => print(&engine.obligations(&org).await?),
        },
        Command::Stats { org } => print(&engine.statistics(&org).await?),
    }
}
