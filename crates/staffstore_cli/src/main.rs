//! staffstore command-line front end.
//!
//! # Responsibility
//! - Open the selected backend and run one repository operation.
//! - Print plain-text results; exit non-zero with the error on failure.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{AddArgs, Args, Command, ListArgs, UpdateArgs};
use log::info;
use staffstore_core::{
    default_log_level, init_logging, open_backend, AppConfig, BackendConfig, EmployeeBackend,
    EmployeeQuery, EmployeeRepository, EmployeeUpdate, NewEmployee, QueryRepository,
};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();

    let app_config = match &args.config {
        Some(path) => Some(
            AppConfig::load(path)
                .with_context(|| format!("failed to load config `{}`", path.display()))?,
        ),
        None => None,
    };

    start_logging(&args, app_config.as_ref())?;

    let backend_config = select_backend(&args, app_config.as_ref())?;
    let mut repo = open_backend(&backend_config).context("failed to open backend")?;
    report_load_status(&repo);

    run(&mut repo, args.command)
}

fn start_logging(args: &Args, app_config: Option<&AppConfig>) -> Result<()> {
    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| app_config.and_then(|config| config.log_dir.clone()));
    let Some(log_dir) = log_dir else {
        return Ok(());
    };

    let level = args
        .log_level
        .clone()
        .or_else(|| app_config.and_then(|config| config.log_level.clone()))
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, &log_dir).context("failed to start logging")?;
    Ok(())
}

fn select_backend(args: &Args, app_config: Option<&AppConfig>) -> Result<BackendConfig> {
    if let (Some(config), Some(org), Some(config_path)) =
        (app_config, args.org.as_deref(), args.config.as_deref())
    {
        let organization = config.organization(org)?;
        info!(
            "event=cli_select module=cli status=ok org={} kind={}",
            organization.key,
            organization.backend.kind()
        );
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        return Ok(resolve_relative(organization.backend.clone(), base));
    }
    if let Some(path) = &args.json {
        return Ok(BackendConfig::Json { path: path.clone() });
    }
    if let Some(path) = &args.yaml {
        return Ok(BackendConfig::Yaml { path: path.clone() });
    }
    if let Some(path) = &args.sqlite {
        return Ok(BackendConfig::Sqlite { path: path.clone() });
    }
    bail!("no storage selected; pass --config/--org or one of --json, --yaml, --sqlite")
}

/// Config paths are relative to the config file's directory.
fn resolve_relative(backend: BackendConfig, base: &Path) -> BackendConfig {
    let join = |path: PathBuf| {
        if path.is_absolute() {
            path
        } else {
            base.join(path)
        }
    };
    match backend {
        BackendConfig::Json { path } => BackendConfig::Json { path: join(path) },
        BackendConfig::Yaml { path } => BackendConfig::Yaml { path: join(path) },
        BackendConfig::Sqlite { path } => BackendConfig::Sqlite { path: join(path) },
        BackendConfig::SqliteMemory => BackendConfig::SqliteMemory,
    }
}

fn report_load_status(repo: &EmployeeBackend) {
    let status = match repo {
        EmployeeBackend::Json(inner) => inner.load_status(),
        EmployeeBackend::Yaml(inner) => inner.load_status(),
        EmployeeBackend::Sqlite(_) => return,
    };
    if status.is_degraded() {
        eprintln!("warning: snapshot could not be loaded, starting empty ({status:?})");
    }
}

fn run(repo: &mut EmployeeBackend, command: Command) -> Result<()> {
    match command {
        Command::List(list) => run_list(repo, &list),
        Command::Show { id } => match repo.get_by_id(id)? {
            Some(employee) => {
                println!("{employee}");
                Ok(())
            }
            None => bail!("employee {id} not found"),
        },
        Command::Add(add) => run_add(repo, add),
        Command::Update(update) => run_update(repo, update),
        Command::Delete { id } => {
            if !repo.delete(id)? {
                bail!("employee {id} not found");
            }
            println!("deleted {id}");
            Ok(())
        }
        Command::Count => {
            println!("{}", repo.count()?);
            Ok(())
        }
    }
}

fn run_list(repo: &EmployeeBackend, list: &ListArgs) -> Result<()> {
    let mut query = EmployeeQuery::new();
    if list.min_salary.is_some() || list.max_salary.is_some() {
        query = query.salary_between(
            list.min_salary.unwrap_or(0),
            list.max_salary.unwrap_or(u32::MAX),
        );
    }
    if let Some(prefix) = &list.last_name {
        query = query.last_name_starts_with(prefix);
    }
    if let Some(field) = list.sort {
        query = query.sort_by(field, list.reverse);
    }

    let page = QueryRepository::new(repo).get_page(list.page_size, list.page, &query)?;
    for employee in &page {
        if list.full {
            println!("{employee}");
        } else {
            println!("{}", employee.short_info());
        }
    }
    Ok(())
}

fn run_add(repo: &mut EmployeeBackend, add: AddArgs) -> Result<()> {
    let new_employee = NewEmployee::new(
        &add.first_name,
        &add.last_name,
        add.salary,
        &add.passport,
        add.patronymic.as_deref(),
    )?;
    let created = repo.add(new_employee)?;
    println!("added {}", created.employee_id());
    Ok(())
}

fn run_update(repo: &mut EmployeeBackend, args: UpdateArgs) -> Result<()> {
    let mut update = EmployeeUpdate::new();
    if let Some(value) = args.first_name {
        update = update.first_name(value);
    }
    if let Some(value) = args.last_name {
        update = update.last_name(value);
    }
    if let Some(value) = args.patronymic {
        update = update.patronymic(Some(value));
    }
    if let Some(value) = args.salary {
        update = update.salary(value);
    }
    if update.is_empty() {
        bail!("nothing to update; pass at least one field option");
    }

    if !repo.update(args.id, &update)? {
        bail!("employee {} not found", args.id);
    }
    println!("updated {}", args.id);
    Ok(())
}
