use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError};
use server::JwtVerifier;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "wallettrack_admin")]
#[command(about = "Admin utilities for WalletTrack (users and development tokens)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./wallettrack.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Mint a bearer token for an existing user.
    Token(TokenArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user; the password is prompted for and stored bcrypt-hashed.
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct TokenArgs {
    #[arg(long)]
    email: String,
    /// Must match the server's `auth.jwt_secret`.
    #[arg(long, env = "WALLETTRACK__AUTH__JWT_SECRET", hide_env_values = true)]
    secret: String,
    /// Token lifetime in hours.
    #[arg(long, default_value_t = 24)]
    ttl_hours: i64,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn notice(message: &str) -> CliResult<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Reads a line without echoing it, printing `*` per character.
fn prompt_password(prompt: &str) -> CliResult<String> {
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
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_new_password() -> CliResult<String> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            notice("Password must not be empty.")?;
            continue;
        }

        if first == prompt_password("Confirm password: ")? {
            return Ok(first);
        }
        notice("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn create_user(engine: &Engine, args: UserCreateArgs) -> CliResult<()> {
    if engine.user_by_email(&args.email).await?.is_some() {
        eprintln!("user already exists: {}", args.email);
        std::process::exit(1);
    }

    let password = prompt_new_password()?;
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    match engine.create_user(&args.email, &args.name, &hash).await {
        Ok(user) => println!("created user: {} ({})", user.email, user.id),
        Err(EngineError::ExistingKey(email)) => {
            eprintln!("user already exists: {email}");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn list_users(engine: &Engine) -> CliResult<()> {
    for user in engine.list_users().await? {
        println!(
            "{}\t{}\t{}\t{}",
            user.id,
            user.email,
            user.display_name,
            user.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

async fn mint_token(engine: &Engine, args: TokenArgs) -> CliResult<()> {
    let Some(user) = engine.user_by_email(&args.email).await? else {
        eprintln!("user not found: {}", args.email);
        std::process::exit(1);
    };

    let token = JwtVerifier::new(args.secret.as_bytes())
        .issue(&user.id, chrono::Duration::hours(args.ttl_hours))?;
    println!("{token}");
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let engine = Engine::builder().database_url(cli.database_url).build()?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => create_user(&engine, args).await?,
        Command::User(User {
            command: UserCommand::List,
        }) => list_users(&engine).await?,
        Command::Token(args) => mint_token(&engine, args).await?,
    }

    Ok(())
}
