use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use minus::Pager;
use sprout::areas::repository::Repository;
use sprout::artifacts::core::PagerWriter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sprout",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small content-addressed version control system",
    long_about = "sprout tracks a flat directory of files with commits, branches \
    and three-way merges. All state lives in a .sprout directory at the root \
    of the working directory.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path. \
        The repository starts on the main branch with a single root commit."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage a file for the next commit",
        long_about = "This command stages the current content of a file. \
        Adding a file whose content matches the current commit unstages it instead."
    )]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        file: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit on the current branch from the staged changes."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file or stage it for removal",
        long_about = "This command unstages a staged file. If the file is tracked by the current commit \
        it is staged for removal and deleted from the working directory."
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        file: String,
    },
    #[command(
        name = "log",
        about = "Show the history of the current branch",
        long_about = "This command shows the commits from the current branch back to the root, \
        following first parents only."
    )]
    Log,
    #[command(
        name = "global-log",
        about = "Show every commit ever made",
        long_about = "This command shows every commit in the object database, ordered by id."
    )]
    GlobalLog,
    #[command(
        name = "find",
        about = "Print the ids of commits with the given message",
        long_about = "This command prints the id of every commit whose message is exactly the given one."
    )]
    Find {
        #[arg(index = 1, help = "The commit message to look for")]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show the working tree status",
        long_about = "This command lists branches, staged and removed files, \
        unstaged modifications and untracked files."
    )]
    Status,
    #[command(
        name = "checkout",
        about = "Switch branches or restore a file",
        long_about = "This command switches to a branch (checkout <branch>), \
        restores a file from the current commit (checkout -- <file>) \
        or restores a file from a given commit (checkout <commit> -- <file>)."
    )]
    Checkout {
        #[arg(index = 1, help = "The branch to switch to, or the commit to restore from")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(
        name = "branch",
        about = "Create a new branch",
        long_about = "This command creates a branch pointing at the current commit. It does not switch to it."
    )]
    Branch {
        #[arg(index = 1, help = "The name of the branch")]
        name: String,
    },
    #[command(
        name = "rm-branch",
        about = "Delete a branch",
        long_about = "This command deletes a branch pointer. Commits made on it are kept."
    )]
    RmBranch {
        #[arg(index = 1, help = "The name of the branch")]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Move the current branch to another commit",
        long_about = "This command checks out all files of the given commit and points the current branch at it. \
        The commit may be given as an unambiguous id prefix."
    )]
    Reset {
        #[arg(index = 1, help = "The commit id or prefix")]
        commit: String,
    },
    #[command(
        name = "merge",
        about = "Merge a branch into the current branch",
        long_about = "This command merges the given branch into the current one, \
        fast-forwarding when possible and creating a merge commit otherwise."
    )]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SPROUT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let mut repository = match path {
                Some(path) => Repository::new(&path, Box::new(std::io::stdout()))?,
                None => open_repository(Box::new(std::io::stdout()))?,
            };

            repository.init()
        }
        Commands::Add { file } => open_repository(Box::new(std::io::stdout()))?.add(&file),
        Commands::Commit { message } => open_repository(Box::new(std::io::stdout()))?
            .commit(&message)
            .map(|_| ()),
        Commands::Rm { file } => open_repository(Box::new(std::io::stdout()))?.rm(&file),
        Commands::Log => with_pager(|repository| repository.log()),
        Commands::GlobalLog => with_pager(|repository| repository.global_log()),
        Commands::Find { message } => open_repository(Box::new(std::io::stdout()))?.find(&message),
        Commands::Status => open_repository(Box::new(std::io::stdout()))?.show_status(),
        Commands::Checkout { target, file } => {
            let mut repository = open_repository(Box::new(std::io::stdout()))?;

            match (target, file) {
                (target, Some(file)) => repository.checkout_file(target.as_deref(), &file),
                (Some(branch), None) => repository.checkout_branch(&branch),
                (None, None) => bail!("Incorrect operands."),
            }
        }
        Commands::Branch { name } => open_repository(Box::new(std::io::stdout()))?.branch(&name),
        Commands::RmBranch { name } => {
            open_repository(Box::new(std::io::stdout()))?.rm_branch(&name)
        }
        Commands::Reset { commit } => open_repository(Box::new(std::io::stdout()))?.reset(&commit),
        Commands::Merge { branch } => open_repository(Box::new(std::io::stdout()))?
            .merge(&branch)
            .map(|_| ()),
    }
}

fn open_repository(writer: Box<dyn std::io::Write>) -> Result<Repository> {
    let pwd = std::env::current_dir()?;

    Repository::new(&pwd.to_string_lossy(), writer)
}

/// Run a history command through the pager when stdout is interactive
fn with_pager(command: impl FnOnce(&Repository) -> Result<()>) -> Result<()> {
    if std::env::var_os("NO_PAGER").is_some() || !std::io::stdout().is_terminal() {
        let repository = open_repository(Box::new(std::io::stdout()))?;
        return command(&repository);
    }

    let pager = Pager::new();
    let repository = open_repository(Box::new(PagerWriter::new(pager.clone())))?;
    command(&repository)?;
    minus::page_all(pager)?;

    Ok(())
}
