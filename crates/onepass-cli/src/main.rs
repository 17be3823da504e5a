#![doc = include_str!("../README.md")]

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

use crate::command::{Cli, Commands};

mod command;
mod commands;
mod render;
mod session;

fn main() {
    // log level: RUST_LOG at runtime, RUST_LOG at compile time, then info
    let filter = EnvFilter::builder()
        .with_default_directive(
            option_env!("RUST_LOG")
                .unwrap_or("info")
                .parse()
                .expect("valid compile-time log level"),
        )
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if color_eyre::install().is_err() {
        tracing::debug!("error report handler was already installed");
    }

    if let Err(err) = run(cli) {
        eprintln!("1pass: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // commands that do not operate on an existing vault
    match &cli.command {
        Commands::New {
            path,
            iterations,
            hint,
        } => return commands::vault::new_vault(path, *iterations, hint.as_deref()),
        Commands::GenPassword { length } => return commands::tools::generate_password(*length),
        Commands::Types => return commands::items::types(),
        Commands::Agent => return commands::tools::run_agent(),
        _ => {}
    }

    let mut vault = session::open_vault(cli.vault.as_deref())?;

    // content operations need decrypted keys; everything else works on the
    // unencrypted parts of the vault
    if matches!(
        cli.command,
        Commands::Show { .. }
            | Commands::ShowJson { .. }
            | Commands::Add { .. }
            | Commands::Remove { .. }
            | Commands::Field { .. }
            | Commands::Export { .. }
            | Commands::Import { .. }
    ) {
        session::unlock(&mut vault, cli.no_agent)?;
    }

    match cli.command {
        Commands::List { pattern } => commands::items::list(&vault, pattern.as_deref()),
        Commands::Show { pattern } => commands::items::show(&vault, &pattern, false),
        Commands::ShowJson { pattern } => commands::items::show(&vault, &pattern, true),
        Commands::Add { item_type, title } => commands::items::add(&vault, &item_type, &title),
        Commands::Remove { pattern, yes } => commands::items::remove(&vault, &pattern, yes),
        Commands::Trash { pattern } => commands::items::trash(&vault, &pattern),
        Commands::Restore { pattern } => commands::items::restore(&vault, &pattern),
        Commands::Rename { pattern, new_title } => {
            commands::items::rename(&vault, &pattern, &new_title)
        }
        Commands::Tag { pattern, tag } => commands::items::tag(&vault, &pattern, &tag),
        Commands::Untag { pattern, tag } => commands::items::untag(&vault, &pattern, &tag),
        Commands::Tags => commands::items::tags(&vault),
        Commands::Move { pattern, folder } => {
            commands::items::move_to_folder(&vault, &pattern, folder.as_deref())
        }
        Commands::Folders => commands::items::folders(&vault),
        Commands::Field { pattern, field } => commands::items::field(&vault, &pattern, &field),
        Commands::Export { path, pattern } => {
            commands::tools::export(&vault, &path, pattern.as_deref())
        }
        Commands::Import { path } => commands::tools::import(&vault, &path),
        Commands::SetPassword => commands::vault::set_password(&vault),
        Commands::Hint => commands::vault::hint(&vault),
        Commands::SetHint { hint } => commands::vault::set_hint(&vault, &hint),
        Commands::Lock => commands::tools::lock(&vault),
        Commands::New { .. } | Commands::GenPassword { .. } | Commands::Types | Commands::Agent => {
            unreachable!("handled before the vault is opened")
        }
    }
}
