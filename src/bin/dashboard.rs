//! Terminal dashboard for the tracker API.
//!
//! Usage: `cargo run --bin dashboard`
//!
//! Requires `IDENTITY_SECRET`; signs in with `RMDN_ID_TOKEN` (see the `seed`
//! binary) and talks to `RMDN_API_URL`.

use std::sync::Arc;

use rmdn::client::command::{Command, CommandError, HELP};
use rmdn::client::render::Screen;
use rmdn::client::{CrudClient, DashboardSession, TokenIdentityProvider};
use rmdn::config::DashboardConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "rmdn=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DashboardConfig::from_env()?;
    let identity = Arc::new(TokenIdentityProvider::new(
        config.identity_secret.clone(),
        config.id_token.clone(),
    ));
    let api = CrudClient::new(&config.api_url)?;

    let mut session =
        DashboardSession::new(api, identity, config.update_match, config.poll_interval);
    let mut updates = session.updates();
    session.mount();

    if config.id_token.is_some() {
        // Failures land in the view notice.
        session.sign_in().await.ok();
    }
    println!("{}", Screen(&session.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => run(&session, command).await,
                    Err(CommandError::Empty) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", Screen(&session.snapshot()));
            }
        }
    }

    session.unmount().await;
    Ok(())
}

async fn run(session: &DashboardSession, command: Command) {
    let result = match command {
        Command::Login => session.sign_in().await.map(|_| ()),
        Command::Logout => session.sign_out().await,
        Command::Day(day) => {
            if !session.select_day(day) {
                eprintln!("day must be between 1 and 30");
            }
            Ok(())
        }
        Command::Add(category, text) => {
            session.set_draft(category, text);
            session.submit(category, None).await.map(|submitted| {
                if !submitted {
                    eprintln!("select a day (and sign in) first");
                }
            })
        }
        Command::Draft(category, text) => {
            session.set_draft(category, text);
            Ok(())
        }
        Command::Edit(id) => {
            if !session.start_edit(id) {
                eprintln!("no task #{id}");
            }
            Ok(())
        }
        Command::InProcess(id) => session.mark_in_process(id).await.map(|_| ()),
        Command::Success(id) => session.mark_success(id).await.map(|_| ()),
        Command::Delete(id) => session.delete(id).await,
        Command::Skip => {
            if session.toggle_skip().is_none() {
                eprintln!("select a day first");
            }
            Ok(())
        }
        Command::Show => {
            println!("{}", Screen(&session.snapshot()));
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("{e}");
    }
}
