use anyhow::Result;
use rpassword::prompt_password;
use std::env;
use std::sync::Arc;
use taskboard::cli::{self, CliArgs, Command};
use taskboard::context::{SharedContext, StandardContext};

#[tokio::main]
async fn main() -> Result<()> {
    let args = match CliArgs::parse(env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run 'taskboard --help' for usage.");
            std::process::exit(2);
        }
    };

    let ctx: SharedContext = Arc::new(StandardContext::new(args.root));

    match args.command {
        Command::Help => {
            cli::print_help("taskboard");
            Ok(())
        }
        Command::Login { email } => {
            let password = prompt_password("Password: ")?;
            cli::login(ctx.as_ref(), &email, password).await
        }
        Command::Logout => cli::logout(ctx.as_ref()),
        Command::Whoami => cli::whoami(ctx.as_ref()).await,
        Command::Tasks { page } => cli::tasks(ctx.as_ref(), page).await,
        Command::Interactive { open } => taskboard::tui::run(ctx, open).await,
    }
}
