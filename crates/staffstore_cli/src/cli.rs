//! Command-line argument parsing.

use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand};
use staffstore_core::SortField;
use std::path::PathBuf;

/// Inspect and edit employee records in a JSON, YAML or SQLite store.
#[derive(Parser, Debug, Clone)]
#[command(name = "staffstore", version, about, long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["config", "json", "yaml", "sqlite"])
))]
pub struct Args {
    /// YAML config file listing organizations (use with --org)
    #[arg(short, long, requires = "org")]
    pub config: Option<PathBuf>,

    /// Organization key from the config file
    #[arg(short, long, requires = "config")]
    pub org: Option<String>,

    /// JSON snapshot file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// YAML snapshot file
    #[arg(long)]
    pub yaml: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    pub sqlite: Option<PathBuf>,

    /// Absolute directory for log files; logging is off when unset
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List one page of employees
    List(ListArgs),
    /// Show one employee
    Show { id: u32 },
    /// Add an employee
    Add(AddArgs),
    /// Update fields of an employee
    Update(UpdateArgs),
    /// Delete an employee
    Delete { id: u32 },
    /// Print the number of employees
    Count,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    #[arg(short = 'k', long, default_value_t = 10)]
    pub page_size: usize,

    #[arg(short = 'n', long, default_value_t = 1)]
    pub page: usize,

    /// employee_id | first_name | last_name | salary
    #[arg(long, value_parser = parse_sort_field)]
    pub sort: Option<SortField>,

    #[arg(long, requires = "sort")]
    pub reverse: bool,

    #[arg(long)]
    pub min_salary: Option<u32>,

    #[arg(long)]
    pub max_salary: Option<u32>,

    /// Case-insensitive last-name prefix
    #[arg(long)]
    pub last_name: Option<String>,

    /// Print full records instead of short rows
    #[arg(long)]
    pub full: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AddArgs {
    pub first_name: String,
    pub last_name: String,
    pub salary: i64,
    pub passport: String,

    #[arg(long)]
    pub patronymic: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UpdateArgs {
    pub id: u32,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// New patronymic; an empty value clears it
    #[arg(long)]
    pub patronymic: Option<String>,

    #[arg(long)]
    pub salary: Option<i64>,
}

fn parse_sort_field(value: &str) -> Result<SortField, String> {
    value.parse::<SortField>().map_err(|err| err.to_string())
}
