use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use dedlin::{
    load_from, Collaborators, CommandSource, Console, Editor, FileHistory, FileStore, Outcome,
    ScriptSource, StdoutOutput, Store,
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Line editor driven by an edlin-style command language.
#[derive(Parser, Debug)]
#[command(name = "dedlin", version, about)]
struct Args {
    /// File to edit. Created when it does not exist.
    file: Option<PathBuf>,

    /// Run the commands in this file instead of reading commands from stdin.
    #[arg(long = "macro", value_name = "FILE")]
    macro_file: Option<PathBuf>,

    /// No interactive input; bare line numbers are refused. Requires a file.
    #[arg(long)]
    headless: bool,

    /// Stop at the first unknown command.
    #[arg(long)]
    halt_on_error: bool,

    /// Print the canonical form of each command.
    #[arg(long)]
    echo: bool,

    /// Suppress feedback messages.
    #[arg(long)]
    quiet: bool,

    /// Concise status lines suited to screen readers.
    #[arg(long)]
    blind: bool,

    /// Disable high-trust commands and saving under a new name. Requires a file.
    #[arg(long)]
    untrusted: bool,

    /// Do not write a history log.
    #[arg(long)]
    no_history: bool,

    /// Quit without saving even when the document is modified.
    #[arg(long)]
    no_quit_safety: bool,

    /// Config file (overrides discovery of `dedlin.toml`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let name = path.file_name()?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .ok()?;
            Some(guard)
        }
        None => {
            // Already-installed subscribers are fine.
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.as_deref());

    if (args.headless || args.untrusted) && args.file.is_none() {
        Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "--headless and --untrusted need a FILE to edit",
            )
            .exit();
    }

    let config = load_from(args.config.clone());
    let mut options = config.options(args.headless);
    options.halt_on_error |= args.halt_on_error;
    options.echo |= args.echo;
    options.quiet |= args.quiet;
    options.blind_mode |= args.blind;
    options.untrusted = args.untrusted;
    if args.no_quit_safety {
        options.quit_safety = false;
    }

    let mut store = FileStore;
    let mut source: Box<dyn CommandSource> = match &args.macro_file {
        Some(path) => {
            let lines = store
                .read(path)
                .with_context(|| format!("failed to read macro {}", path.display()))?;
            Box::new(ScriptSource::new(lines))
        }
        None if options.headless => Box::new(Console::piped()),
        None => Box::new(Console::interactive()),
    };

    let mut io = Collaborators::new(StdoutOutput, store);
    if !options.headless {
        io = io.with_line_input(Console::interactive());
    }
    if config.file.history.enabled && !args.no_history {
        let history = FileHistory::create(&config.file.history.dir, &options.line_break)
            .context("failed to open history log")?;
        io = io.with_history(history);
    }

    let mut editor = Editor::new(options, io);
    editor
        .open(args.file.as_deref())
        .context("failed to open document")?;

    match editor.run(source.as_mut()) {
        Ok(outcome) => {
            info!(target: "editor", ?outcome, "session ended");
            if outcome != Outcome::Exit && outcome != Outcome::Quit && editor.document().is_dirty()
            {
                eprintln!("warning: unsaved changes discarded");
            }
            editor.final_report();
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_halt() => {
            error!(target: "editor", %err, "session halted");
            eprintln!("error: {err}");
            match editor.emergency_save() {
                Ok(true) => eprintln!("document saved"),
                Ok(false) => {}
                Err(save_err) => eprintln!("error: emergency save failed: {save_err}"),
            }
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err.into()),
    }
}
