use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Account, Engine, Role};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

mod accounts {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "accounts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub email: String,
        pub address: String,
        pub password: String,
        pub role: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "pacco_admin")]
#[command(about = "Admin utilities for pacco (bootstrap accounts/shipping methods)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./pacco.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(AccountCmd),
    Method(MethodCmd),
    /// Apply pending migrations and exit.
    Migrate,
}

#[derive(Args, Debug)]
struct AccountCmd {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: String,
    /// `customer` or `admin`. The server's signup only ever creates
    /// customers; this flag is how the first admin comes to exist.
    #[arg(long, default_value = "customer")]
    role: String,
}

#[derive(Args, Debug)]
struct MethodCmd {
    #[command(subcommand)]
    command: MethodCommand,
}

#[derive(Subcommand, Debug)]
enum MethodCommand {
    Create(MethodCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct MethodCreateArgs {
    #[arg(long)]
    label: String,
    /// Rate per kilogram, e.g. `4.00`.
    #[arg(long)]
    rate: Decimal,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|_| format!("unsupported role: {raw}"))
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// A synthetic admin identity for engine calls made from this tool. The CLI
/// runs with direct database access, so it is trusted by definition.
fn cli_admin() -> Account {
    Account::new(
        "pacco_admin".to_string(),
        "admin@localhost".to_string(),
        "local".to_string(),
        Role::Admin,
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Account(AccountCmd {
            command: AccountCommand::Create(args),
        }) => {
            let role = match parse_role(&args.role) {
                Ok(role) => role,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let email = args.email.trim().to_lowercase();
            if accounts::Entity::find()
                .filter(accounts::Column::Email.eq(email.clone()))
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("account already exists: {email}");
                std::process::exit(1);
            }

            let password = prompt_password_twice()?;

            let account = accounts::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                name: Set(args.name.clone()),
                email: Set(email.clone()),
                address: Set(args.address),
                password: Set(password),
                role: Set(role.as_str().to_string()),
                created_at: Set(Utc::now()),
            };
            accounts::Entity::insert(account).exec(&db).await?;

            println!("created {} account: {email}", role.as_str());
        }
        Command::Method(MethodCmd {
            command: MethodCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let method = engine
                .create_shipping_method(&cli_admin(), &args.label, args.rate)
                .await?;
            println!(
                "created method: {} at {}/kg ({})",
                method.label, method.rate_per_kg, method.id
            );
        }
        Command::Method(MethodCmd {
            command: MethodCommand::List,
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            for method in engine.list_shipping_methods().await? {
                println!("{}  {}/kg  {}", method.label, method.rate_per_kg, method.id);
            }
        }
        Command::Migrate => {
            // connect_db already ran the migrations.
            println!("migrations applied");
        }
    }

    Ok(())
}
