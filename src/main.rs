use std::io::Write as _;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use audiobook_dl::cli::{Cli, Command, DownloadArgs, InspectArgs};
use audiobook_dl::download::write_event;
use audiobook_dl::extract::{ScriptTrackRule, Site, TitleTemplate};

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    audiobook_dl::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command.unwrap_or_else(|| Command::Download(DownloadArgs::default())) {
        Command::Download(args) => download(args).context("download")?,
        Command::Inspect(args) => inspect(args).context("inspect")?,
    }

    Ok(())
}

fn download(args: DownloadArgs) -> anyhow::Result<()> {
    let raw_url = match args.url.as_deref() {
        Some(url) => url.to_owned(),
        None => audiobook_dl::prompt::read_url(std::io::stdin().lock(), std::io::stdout())?,
    };
    let url = audiobook_dl::prompt::validate_url(&raw_url)?;

    let site = Site {
        metadata: TitleTemplate::default(),
        tracks: ScriptTrackRule::new(&args.track_scheme).context("build track pattern")?,
    };
    let report = audiobook_dl::download::run_with(&site, url.as_str(), &args.config(), |event| {
        if let Err(err) = write_event(std::io::stdout().lock(), &event) {
            tracing::warn!(?err, "write progress to stdout");
        }
    })?;

    tracing::info!(
        files = report.files.len(),
        dir = %report.dir.display(),
        "download complete"
    );
    Ok(())
}

fn inspect(args: InspectArgs) -> anyhow::Result<()> {
    let url = audiobook_dl::prompt::validate_url(&args.url)?;
    let listing = audiobook_dl::download::inspect(url.as_str(), &args.config())?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &listing).context("write book listing json")?;
    stdout.write_all(b"\n").context("write newline")?;
    Ok(())
}
