// File: ./src/cli.rs
//! Shared command-line interface logic: argument parsing, help, and the
//! non-interactive subcommands.
use crate::client::{ApiClient, UnauthorizedHook};
use crate::config::Config;
use crate::context::AppContext;
use crate::model::{Credentials, TaskPage};
use crate::session::{FileSessionStore, SessionStore};
use crate::validation::validate_login;
use anyhow::{Result, bail};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive TUI, optionally opening a specific screen path.
    Interactive { open: Option<String> },
    Login { email: String },
    Logout,
    Whoami,
    Tasks { page: u32 },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub command: Command,
}

impl CliArgs {
    /// Parses `args` without the binary name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut root = None;
        let mut open = None;
        let mut positional: Vec<String> = Vec::new();
        let mut page: Option<u32> = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--help" | "-h" | "help" => {
                    return Ok(Self {
                        root,
                        command: Command::Help,
                    });
                }
                "--root" | "-r" => {
                    let Some(value) = args.get(i + 1) else {
                        bail!("--root needs a path");
                    };
                    root = Some(PathBuf::from(value));
                    i += 1; // Also consumed the value
                }
                "--open" => {
                    let Some(value) = args.get(i + 1) else {
                        bail!("--open needs a path such as /profile");
                    };
                    open = Some(value.clone());
                    i += 1;
                }
                "--page" | "-p" => {
                    let Some(value) = args.get(i + 1) else {
                        bail!("--page needs a number");
                    };
                    page = match value.parse::<u32>() {
                        Ok(n) if n >= 1 => Some(n),
                        _ => bail!("--page must be a positive number, got {:?}", value),
                    };
                    i += 1;
                }
                arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
                arg => positional.push(arg.to_string()),
            }
            i += 1;
        }

        let command = match positional.first().map(String::as_str) {
            None => Command::Interactive { open },
            Some("login") => match positional.get(1) {
                Some(email) => Command::Login {
                    email: email.clone(),
                },
                None => bail!("Usage: taskboard login <email>"),
            },
            Some("logout") => Command::Logout,
            Some("whoami") => Command::Whoami,
            Some("tasks") => Command::Tasks {
                page: page.unwrap_or(1),
            },
            Some(other) => bail!("Unknown command: {}", other),
        };
        Ok(Self { root, command })
    }
}

pub fn print_help(binary_name: &str) {
    println!(
        "Taskboard v{} - Terminal client for your task list",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] [--open <screen>]", binary_name);
    println!("    {} login <email>", binary_name);
    println!("    {} logout", binary_name);
    println!("    {} whoami", binary_name);
    println!("    {} tasks [--page <n>]", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    --open <screen>       Start on a screen: /, /profile, /login, /register.");
    println!("    -p, --page <n>        Page to print with the 'tasks' command.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("ENVIRONMENT:");
    println!(
        "    {}     Overrides api_url from the config file.",
        crate::config::API_URL_ENV
    );
    println!();
    println!("KEYBINDINGS:");
    println!("    Press '?' inside the app for the key list of the current screen");
}

fn client_for(ctx: &dyn AppContext) -> Result<(ApiClient, Config)> {
    let config = Config::load(ctx)?;
    if config.api_url.is_empty() {
        bail!("No api_url configured. Run the interactive app once or edit the config file.");
    }
    let session = FileSessionStore::shared(ctx)?;
    let client = ApiClient::new(
        &config.api_url,
        session,
        UnauthorizedHook::new(|| eprintln!("Session expired. Please log in again.")),
    )?;
    Ok((client, config))
}

pub async fn login(ctx: &dyn AppContext, email: &str, password: String) -> Result<()> {
    let credentials = Credentials {
        email: email.trim().to_string(),
        password,
    };
    if let Err(errors) = validate_login(&credentials) {
        bail!("{}", errors);
    }
    let (client, _) = client_for(ctx)?;
    match client.sign_in(&credentials).await {
        Ok(()) => {
            println!("Logged in successfully");
            Ok(())
        }
        Err(e) => bail!("{}", e.message_or("Login failed")),
    }
}

pub fn logout(ctx: &dyn AppContext) -> Result<()> {
    let session = FileSessionStore::open(ctx)?;
    session.clear()?;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(ctx: &dyn AppContext) -> Result<()> {
    let (client, _) = client_for(ctx)?;
    if !client.session().is_authenticated() {
        bail!("Not logged in.");
    }
    let user = client
        .get_profile()
        .await
        .map_err(|e| anyhow::anyhow!(e.message_or("Failed to load profile")))?;
    println!("{} <{}>", user.name, user.email);
    Ok(())
}

pub async fn tasks(ctx: &dyn AppContext, page: u32) -> Result<()> {
    let (client, config) = client_for(ctx)?;
    if !client.session().is_authenticated() {
        bail!("Not logged in.");
    }
    let result = client
        .list_tasks(page, config.page_size)
        .await
        .map_err(|e| anyhow::anyhow!(e.message_or("Failed to fetch tasks")))?;
    print!("{}", format_page(&result));
    Ok(())
}

/// Plain-text rendering used by the `tasks` command.
pub fn format_page(page: &TaskPage) -> String {
    let mut out = String::new();
    if page.items.is_empty() {
        out.push_str("No tasks found. Add your first task!\n");
    }
    for task in &page.items {
        let check = if task.completed { "[x]" } else { "[ ]" };
        out.push_str(&format!("{} {}  ({})\n", check, task.title, task.id));
        if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("      {}\n", desc));
        }
    }
    out.push_str(&format!(
        "Page {} of {}\n",
        page.current_page, page.total_pages
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    #[test]
    fn parses_interactive_flags() {
        let args = CliArgs::parse(["--root", "/tmp/x", "--open", "/profile"]).unwrap();
        assert_eq!(args.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(
            args.command,
            Command::Interactive {
                open: Some("/profile".to_string())
            }
        );
        assert_eq!(
            CliArgs::parse(Vec::<String>::new()).unwrap().command,
            Command::Interactive { open: None }
        );
    }

    #[test]
    fn parses_subcommands() {
        assert_eq!(
            CliArgs::parse(["login", "ann@example.com"]).unwrap().command,
            Command::Login {
                email: "ann@example.com".to_string()
            }
        );
        assert_eq!(
            CliArgs::parse(["tasks", "--page", "3"]).unwrap().command,
            Command::Tasks { page: 3 }
        );
        assert_eq!(CliArgs::parse(["logout"]).unwrap().command, Command::Logout);
        assert_eq!(CliArgs::parse(["-h"]).unwrap().command, Command::Help);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(CliArgs::parse(["login"]).is_err());
        assert!(CliArgs::parse(["tasks", "--page", "0"]).is_err());
        assert!(CliArgs::parse(["--root"]).is_err());
        assert!(CliArgs::parse(["frobnicate"]).is_err());
        assert!(CliArgs::parse(["--verbose"]).is_err());
    }

    #[test]
    fn formats_page() {
        let page = TaskPage {
            items: vec![Task {
                id: "1".into(),
                title: "Buy milk".into(),
                description: Some("2 litres".into()),
                completed: true,
            }],
            current_page: 1,
            total_pages: 2,
        };
        let text = format_page(&page);
        assert!(text.contains("[x] Buy milk  (1)"));
        assert!(text.contains("2 litres"));
        assert!(text.ends_with("Page 1 of 2\n"));
    }
}
