use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use delivery::{AppleScriptDelivery, Deliver, DryRunDelivery};
use fimg::contacts::{load_rows, roster_names, FileOrder};
use fimg::widgets::{render_contact_table, source_caption};
use fimg::{
    logging, parse_invocation, run_send, Cli, EnvConfig, FimgError, PreviewOptions,
    ProcessTerminal, SendOutcome, SendRequest,
};

fn main() -> ExitCode {
    let args = std::env::args_os().map(|arg| arg.to_string_lossy().into_owned());
    let cli = match Cli::parse_args(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return exit_code(err.exit_code());
        }
    };

    let config = EnvConfig::from_env();
    logging::init(&config);

    match run(cli, config) {
        Ok(code) => code,
        Err(err) => match err.downcast_ref::<FimgError>() {
            Some(FimgError::Usage) => {
                eprintln!("{err}");
                exit_code(2)
            }
            Some(fimg_err) => {
                eprintln!("[fimg] {err:#}");
                exit_code(fimg_err.exit_code())
            }
            None => {
                eprintln!("[fimg] {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli, config: EnvConfig) -> Result<ExitCode> {
    let lists_dir = cli.lists_dir.clone().unwrap_or(config.lists_dir);

    if cli.show_lists {
        show_lists(&lists_dir, config.file_order).context("failed to print rosters")?;
        return Ok(ExitCode::SUCCESS);
    }

    if cli.words.is_empty() {
        return Err(FimgError::Usage.into());
    }
    let rosters = roster_names(&lists_dir);
    let (list, raw) = cli.raw_invocation(&rosters);
    let invocation = parse_invocation(&raw)?;

    let deliverer: Box<dyn Deliver> = if cli.dry_run {
        Box::new(DryRunDelivery)
    } else {
        Box::new(
            AppleScriptDelivery::new(config.applescript_path)
                .with_program(config.osascript)
                .with_timeout_secs(config.send_timeout_secs),
        )
    };

    let request = SendRequest {
        targets: &invocation.targets,
        message: &invocation.message,
        lists_dir: &lists_dir,
        list,
        file_order: config.file_order,
        preview: PreviewOptions {
            skip_confirmation: cli.skip,
        },
    };

    let mut terminal = ProcessTerminal::new();
    match run_send(&mut terminal, deliverer.as_ref(), &request)? {
        SendOutcome::Cancelled => Ok(ExitCode::SUCCESS),
        SendOutcome::Delivered(report) if report.is_success() => Ok(ExitCode::SUCCESS),
        SendOutcome::Delivered(_) => Ok(ExitCode::FAILURE),
    }
}

fn show_lists(lists_dir: &Path, order: FileOrder) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let sources = load_rows(lists_dir, order);
    if sources.is_empty() {
        writeln!(stdout, "No roster files in {}", lists_dir.display())?;
        return Ok(());
    }

    for (path, rows) in sources {
        writeln!(stdout, "{}", source_caption(&path, rows.len()))?;
        for line in render_contact_table(&rows) {
            writeln!(stdout, "{line}")?;
        }
        writeln!(stdout)?;
    }
    Ok(())
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
