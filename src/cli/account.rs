use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use crate::session::{load_session, sign_in, sign_out};

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    #[command(about = "Sign in to the document store as the given owner")]
    Login { owner: String },
    #[command(about = "Sign out of the document store")]
    Logout {},
    #[command(about = "Show who is signed in")]
    Whoami {},
}

pub fn process_account_command(dir: &Path, command: AccountCommand) -> Result<()> {
    match command {
        AccountCommand::Login { owner } => {
            let session = sign_in(dir, &owner)?;
            println!("Signed in as {}", session.owner_id);
        }
        AccountCommand::Logout {} => {
            if sign_out(dir)? {
                println!("Signed out");
            } else {
                println!("Nobody was signed in");
            }
        }
        AccountCommand::Whoami {} => match load_session(dir)? {
            Some(session) => println!("{}", session.owner_id),
            None => println!("Not signed in"),
        },
    }
    Ok(())
}
