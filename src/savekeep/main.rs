use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use savekeep::api::{CmdResult, ConfigAction, SaveEngine};
use savekeep::commands::export::bundle_filename;
use savekeep::config::SettingsHandle;
use savekeep::error::{Result, SaveError};
use savekeep::host::StateFileHost;
use savekeep::store::fs::FileStore;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod args;
mod print;
use args::{Cli, Commands};
use print::{print_messages, print_saves};

const DEFAULT_STATE_FILE: &str = "state.json";

type Engine = SaveEngine<FileStore, StateFileHost>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "savekeep=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let engine = init_engine(&cli)?;

    match cli.command {
        Some(Commands::Save { name }) => report(engine.create_save(name.as_deref()).await?),
        Some(Commands::Quick) => report(engine.quick_save().await?),
        Some(Commands::QuickLoad) => report(engine.quick_load().await?),
        Some(Commands::List) | None => handle_list(&engine).await,
        Some(Commands::Load { save }) => report(engine.load_save(&save).await?),
        Some(Commands::Rename { save, name }) => report(engine.rename_save(&save, &name).await?),
        Some(Commands::Delete { saves }) => report(engine.delete_saves(&saves).await?),
        Some(Commands::Export {
            saves,
            current,
            output,
        }) => handle_export(&engine, &saves, current, output).await,
        Some(Commands::Import { file }) => handle_import(&engine, &file).await,
        Some(Commands::Config { key, value }) => handle_config(&engine, key, value),
    }
}

fn init_engine(cli: &Cli) -> Result<Engine> {
    let data_dir = match (&cli.data_dir, std::env::var_os("SAVEKEEP_DATA")) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => PathBuf::from(dir),
        (None, None) => ProjectDirs::from("com", "savekeep", "savekeep")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| SaveError::Api("Could not determine data directory".into()))?,
    };

    let state_path = cli
        .state
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
    let title = cli
        .title
        .clone()
        .unwrap_or_else(|| title_from_state_path(&state_path));

    let settings = SettingsHandle::load(&data_dir);
    let store = FileStore::new(data_dir);
    let host = StateFileHost::new(state_path);
    Ok(SaveEngine::new(store, host, settings, title))
}

fn title_from_state_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

fn report(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    Ok(())
}

async fn handle_list(engine: &Engine) -> Result<()> {
    let result = engine.list_saves().await?;
    print_saves(&result.listed_saves);
    print_messages(&result.messages);
    Ok(())
}

async fn handle_export(
    engine: &Engine,
    saves: &[String],
    current: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let result = if current {
        engine.export_current_state().await?
    } else {
        engine.export_saves(saves).await?
    };

    let Some(bundle) = &result.bundle else {
        print_messages(&result.messages);
        return Ok(());
    };

    let output = output.unwrap_or_else(|| PathBuf::from(bundle_filename(engine.title())));
    if output.as_os_str() == "-" {
        std::io::stdout().write_all(bundle.as_bytes())?;
        println!();
        return Ok(());
    }

    std::fs::write(&output, bundle)?;
    print_messages(&result.messages);
    println!("{}", format!("Written to {}", output.display()).dimmed());
    Ok(())
}

async fn handle_import(engine: &Engine, file: &Path) -> Result<()> {
    let bundle = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    report(engine.import_bundle(&bundle).await?)
}

fn handle_config(engine: &Engine, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::Get(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    report(engine.config(action)?)
}
