use anyhow::{anyhow, bail, Context};
use linepatch::logging::Logger;
use linepatch::{
    fetch_numbered, EditBatch, EngineOptions, FileStore, OptionOverrides, OverlapPolicy,
    PatchEngine, PatchError, WriteMode,
};
use std::io::{Read, Write};
use std::path::PathBuf;

const USAGE: &str = "\
usage:
  linepatch view <file>                 print the numbered view of <file>
  linepatch apply <file> <batch.json|-> apply an edit batch (- reads stdin)
  linepatch example                     print a sample edit batch

options:
  --reject-overlaps    fail batches whose edits touch the same lines
  --direct-write       overwrite the file in place instead of via a temp file
  --json-report        print the apply report as JSON instead of the new view
  --log-level <lvl>    debug | info | warn | error
  --log-file <path>    also append log records to <path>
  --config <path>      options file (default: ~/.linepatch/config.json)";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(error) = run(&args) {
        eprintln!("linepatch: {:#}", error);
        if let Some(patch_error) = error.downcast_ref::<PatchError>() {
            if patch_error.is_retryable_with_fresh_view() {
                eprintln!("hint: run `linepatch view` and rebuild the batch against current line numbers");
            }
        }
        std::process::exit(1);
    }
}

enum Command {
    View { file: PathBuf },
    Apply { file: PathBuf, batch: BatchSource },
    Example,
    Help,
}

enum BatchSource {
    Stdin,
    File(PathBuf),
}

struct CliArgs {
    command: Command,
    overrides: OptionOverrides,
    config: Option<PathBuf>,
    json_report: bool,
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let cli = parse_args(args)?;
    let options = resolve_options(&cli)?;

    let mut logger = Logger::new(options.log_level);
    if let Some(path) = &options.log_file {
        logger = logger.with_file_output(path);
    }
    logger
        .install()
        .map_err(|e| anyhow!("failed to install logger: {}", e))?;

    let stdout = std::io::stdout();
    execute(cli, options, &mut stdout.lock())
}

/// 解析済みのコマンドを実行し、結果を `out` に書く
fn execute<W: Write>(cli: CliArgs, options: EngineOptions, out: &mut W) -> anyhow::Result<()> {
    match cli.command {
        Command::View { file } => {
            let view = fetch_numbered(&FileStore::new(&file))?;
            writeln!(out, "{}", view)?;
        }
        Command::Apply { file, batch } => {
            let text = read_batch(&batch)?;
            let batch = EditBatch::from_json(&text).map_err(PatchError::from)?;
            let engine = PatchEngine::new(options);
            log::debug!("applying {} edits with {:?}", batch.len(), engine.options());
            let report = engine.apply_to_path(&file, &batch)?;
            if cli.json_report {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                let store = FileStore::new(&file);
                writeln!(out, "{}", fetch_numbered(&store)?)?;
            }
        }
        Command::Example => writeln!(out, "{}", EditBatch::EXAMPLE_JSON)?,
        Command::Help => writeln!(out, "{}", USAGE)?,
    }
    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut overrides = OptionOverrides::default();
    let mut config = None;
    let mut json_report = false;
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--reject-overlaps" => overrides.overlap_policy = Some(OverlapPolicy::Reject),
            "--direct-write" => overrides.write_mode = Some(WriteMode::Direct),
            "--json-report" => json_report = true,
            "--log-level" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--log-level requires a value"))?;
                overrides.log_level = Some(value.parse()?);
            }
            "--log-file" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--log-file requires a path"))?;
                overrides.log_file = Some(expand_path(value));
            }
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                config = Some(expand_path(value));
            }
            "-h" | "--help" => positional = vec!["help"],
            other if other.starts_with("--") => bail!("unknown option: {}\n\n{}", other, USAGE),
            other => positional.push(other),
        }
    }

    let command = match positional.as_slice() {
        ["view", file] => Command::View {
            file: expand_path(file),
        },
        ["apply", file, "-"] => Command::Apply {
            file: expand_path(file),
            batch: BatchSource::Stdin,
        },
        ["apply", file, batch] => Command::Apply {
            file: expand_path(file),
            batch: BatchSource::File(expand_path(batch)),
        },
        ["example"] => Command::Example,
        [] | ["help", ..] => Command::Help,
        _ => bail!("invalid arguments\n\n{}", USAGE),
    };

    Ok(CliArgs {
        command,
        overrides,
        config,
        json_report,
    })
}

/// 設定ファイル < 環境変数 < コマンドライン の順に重ねる
fn resolve_options(cli: &CliArgs) -> anyhow::Result<EngineOptions> {
    let file_layer = match &cli.config {
        Some(path) => OptionOverrides::from_file(path)?,
        None => OptionOverrides::from_default_file()?,
    };
    let env_layer = OptionOverrides::from_env()?;
    Ok(file_layer
        .merged_with(&env_layer)
        .merged_with(&cli.overrides)
        .resolve())
}

fn read_batch(source: &BatchSource) -> anyhow::Result<String> {
    match source {
        BatchSource::Stdin => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read edit batch from stdin")?;
            Ok(text)
        }
        BatchSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read edit batch {}", path.display())),
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
