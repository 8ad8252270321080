//! Interactive administration shell working directly on the database.
//! Run it while the server is stopped, the server only reads the database
//! at startup.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

use vidshare::importer::{import_files, scan_directory};
use vidshare::kv_store::SqliteKvStore;
use vidshare::user::IdentitySettings;
use vidshare::{AppState, GuardedAppState, UserRole};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database of the server.
    #[clap(value_parser = parse_path)]
    pub db_path: PathBuf,
}

#[derive(Parser)]
#[command(name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Shows all users with their role.
    Users,

    /// Sets the role of a user, either Admin or Regular.
    SetRole { username: String, role: String },

    /// Logs the given user in and imports every folder of the directory
    /// holding an MP4 video and an image as one video.
    Import {
        directory: PathBuf,
        username: String,
        password: String,
    },

    /// Clears the stored session.
    Logout,

    /// Shows the path of the current database.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

fn print_users(app: &GuardedAppState) {
    let state = app.lock().unwrap();
    let current = state.current_user().map(|u| u.id.clone());
    for user in state.users() {
        println!(
            "{}{} [{}] id={} registered={}",
            if current.as_deref() == Some(user.id.as_str()) { "* " } else { "  " },
            user.username,
            user.role.as_str(),
            user.id,
            user.registered.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn run_import(
    app: &GuardedAppState,
    runtime: &tokio::runtime::Runtime,
    directory: PathBuf,
    username: &str,
    password: &str,
) -> CommandExecutionResult {
    if let Err(err) = app.lock().unwrap().identity().login(username, password) {
        return CommandExecutionResult::Error(format!("{}", err));
    }
    let report = runtime.block_on(async {
        let files = scan_directory(directory).await?;
        anyhow::Ok(import_files(app, files).await)
    });
    match report {
        Ok(report) => {
            for title in report.created.iter() {
                println!("  + {}", title);
            }
            for folder in report.skipped.iter() {
                println!("  - {} (needs a video and an image)", folder);
            }
            for (folder, reason) in report.failed.iter() {
                println!("  ! {}: {}", folder, reason);
            }
            println!("{}", report.summary());
            CommandExecutionResult::Ok
        }
        Err(err) => CommandExecutionResult::Error(format!("{:#}", err)),
    }
}

fn execute_command(
    line: String,
    app: &GuardedAppState,
    runtime: &tokio::runtime::Runtime,
    db_path: String,
) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match cli.command {
                InnerCommand::Users => print_users(app),
                InnerCommand::SetRole { username, role } => {
                    let Some(role) = UserRole::from_str(&role) else {
                        return CommandExecutionResult::Error(format!(
                            "Unknown role {}, use Admin or Regular.",
                            role
                        ));
                    };
                    match app.lock().unwrap().identity().set_role(&username, role) {
                        Ok(user) => println!("{} is now {}", user.username, user.role.as_str()),
                        Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                    }
                }
                InnerCommand::Import {
                    directory,
                    username,
                    password,
                } => return run_import(app, runtime, directory, &username, &password),
                InnerCommand::Logout => {
                    if let Err(err) = app.lock().unwrap().identity().logout() {
                        return CommandExecutionResult::Error(format!("{}", err));
                    }
                }
                InnerCommand::Where => {
                    println!("{}", db_path);
                }
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct CommandsHelper {
    commands_names: Vec<String>,
}

impl CommandsHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();
        CommandsHelper { commands_names }
    }
}

impl Completer for CommandsHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        Ok((0, matches))
    }
}

impl Highlighter for CommandsHelper {}
impl Validator for CommandsHelper {}
impl Helper for CommandsHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let store = Arc::new(SqliteKvStore::new(&cli_args.db_path)?);
    let app = AppState::load(store, IdentitySettings::default()).into_guarded();
    let runtime = tokio::runtime::Runtime::new()?;

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<CommandsHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(CommandsHelper::new()));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(
                    line,
                    &app,
                    &runtime,
                    cli_args.db_path.display().to_string(),
                ) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => {
                        eprintln!("Error: {}", err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
