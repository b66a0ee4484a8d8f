use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use pantry_list::config::AppConfig;
use pantry_list::db::PgStore;
use pantry_list::ingredient_model::MealPlanId;
use pantry_list::ingredient_parser::parse;
use pantry_list::logging::init_logging;
use pantry_list::shopping_list::ShoppingListService;

#[derive(Parser, Debug)]
#[command(name = "pantry-list", version, about = "Shopping lists from meal plans")]
struct Cli {
    /// Load settings from this env file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// PostgreSQL connection string (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Debug-level logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the shopping list of a meal plan
    List {
        meal_plan_id: MealPlanId,

        /// First day to include (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Parse ingredient lines and print the result
    Parse {
        #[arg(required = true)]
        lines: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.env_file {
        Some(path) => AppConfig::from_env_file(path)?,
        None => {
            dotenv::dotenv().ok();
            AppConfig::from_env()?
        }
    };

    if let Some(url) = &cli.database_url {
        config.database_url = Some(url.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(config.log_format, cli.verbose);

    match cli.command {
        Command::List {
            meal_plan_id,
            from,
            to,
            json,
        } => {
            let store = PgStore::connect(&config).await?;
            let service = ShoppingListService::from_store(store);

            info!(meal_plan_id, "Generating shopping list");
            let list = match (from, to) {
                (Some(from), Some(to)) => service
                    .generate_shopping_list_between(meal_plan_id, from, to)
                    .await
                    .with_context(|| format!("Failed to build shopping list for meal plan {meal_plan_id}"))?,
                _ => service
                    .generate_shopping_list(meal_plan_id)
                    .await
                    .with_context(|| format!("Failed to build shopping list for meal plan {meal_plan_id}"))?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print!("{list}");
            }
        }
        Command::Parse { lines, json } => {
            let parsed = lines
                .iter()
                .map(|line| parse(line).with_context(|| format!("Failed to parse '{line}'")))
                .collect::<Result<Vec<_>>>()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                for line in &parsed {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}
