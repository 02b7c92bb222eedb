//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::services::{DocumentService, NodeReport};
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::Tree;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        ));
    };
    if let Commands::Completion { shell } = command {
        print_completions(*shell);
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?
        .with_overrides(cli.children_key.clone(), cli.separator)?;
    debug!("settings: {:?}", settings);
    let service = DocumentService::new(settings);

    match command {
        Commands::Show { file, data, pretty } => show(&service, file, *data, *pretty),
        Commands::Find { file, id } => find(&service, file, id),
        Commands::Path { file, path } => resolve_path(&service, file, path),
        Commands::Remove {
            file,
            parent,
            child,
        } => remove(&service, file, parent, child),
        Commands::Leaves { file } => leaves(&service, file),
        Commands::Export { file } => export(&service, file),
        Commands::Config => show_config(service.settings()),
        Commands::Completion { .. } => Ok(()),
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(skip(service))]
fn show(service: &DocumentService, file: &Path, data: bool, pretty: bool) -> CliResult<()> {
    let tree = service.load(file)?;
    output::info(&render(&tree, data, pretty));
    Ok(())
}

/// Text printed by `show`: box drawing with `pretty`, the outline otherwise.
fn render(tree: &Tree, data: bool, pretty: bool) -> String {
    let root = tree.root();
    if pretty {
        if let Some(rendered) = tree.to_termtree(root) {
            return rendered.to_string();
        }
    }
    tree.outline(root, data)
}

#[instrument(skip(service))]
fn find(service: &DocumentService, file: &Path, id: &str) -> CliResult<()> {
    let tree = service.load(file)?;
    print_report(&service.describe(&tree, id)?);
    Ok(())
}

#[instrument(skip(service))]
fn resolve_path(service: &DocumentService, file: &Path, path: &str) -> CliResult<()> {
    let tree = service.load(file)?;
    match service.resolve_path(&tree, path) {
        Some(report) => print_report(&report),
        None => output::warning(&format!("no node at path '{path}'")),
    }
    Ok(())
}

#[instrument(skip(service))]
fn remove(service: &DocumentService, file: &Path, parent: &str, child: &str) -> CliResult<()> {
    let mut tree = service.load(file)?;
    match service.remove_child(&mut tree, parent, child)? {
        Some(removed) => output::action("Removed", &removed),
        None => output::warning(&format!("'{child}' is not a child of '{parent}'")),
    }
    output::info(&tree);
    Ok(())
}

#[instrument(skip(service))]
fn leaves(service: &DocumentService, file: &Path) -> CliResult<()> {
    let tree = service.load(file)?;
    for id in service.leaf_ids(&tree) {
        output::info(&id);
    }
    Ok(())
}

#[instrument(skip(service))]
fn export(service: &DocumentService, file: &Path) -> CliResult<()> {
    let tree = service.load(file)?;
    output::info(&service.export_json(&tree)?);
    Ok(())
}

fn show_config(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn print_report(report: &NodeReport) {
    output::header(&report.id);
    output::detail(&format!("depth: {}", report.depth));
    output::detail(&format!("children: {}", report.children));
    output::detail(&format!("data: {}", Value::Object(report.data.clone())));
}
