use chrono::{Duration, NaiveDate, Weekday};
use clap::{Args, Subcommand, ValueEnum};
use std::collections::{BTreeMap, HashMap};

use crate::models::Plan;
use crate::sync::LocalStorage;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Create or overwrite a plan from a weekly template
    Create {
        /// Plan name
        #[arg(long, short)]
        name: String,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start_date: Option<String>,

        /// Duration in weeks
        #[arg(long, short, conflicts_with = "days")]
        weeks: Option<u32>,

        /// Duration in days (defaults to 28 if neither is given)
        #[arg(long, short)]
        days: Option<u32>,

        /// Weekly template entry: WEEKDAY=ex1,ex2 (can be repeated)
        #[arg(long = "day", value_name = "WEEKDAY=EXERCISES")]
        day_specs: Vec<String>,
    },

    /// List plans
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one plan's full schedule
    Show {
        /// Plan name
        name: String,
    },

    /// Delete a plan
    Delete {
        /// Plan name
        name: String,
    },
}

impl PlanCommand {
    pub fn run(&self, storage: &LocalStorage) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PlanSubcommand::Create {
                name,
                start_date,
                weeks,
                days,
                day_specs,
            } => {
                if name.trim().is_empty() {
                    return Err("Plan name cannot be empty.".into());
                }

                let start_date = match start_date {
                    Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d))?,
                    None => chrono::Local::now().date_naive(),
                };

                let num_days = resolve_num_days(*weeks, *days)?;

                let template = parse_weekly_template(day_specs)?;

                let mut plan = Plan::new(name, start_date);
                plan.num_weeks = *weeks;
                plan.num_days = if weeks.is_none() { Some(num_days) } else { None };
                plan.schedule = materialize_schedule(start_date, num_days, &template);
                plan.touch();

                let mut doc = storage.load_or_default()?;
                doc.upsert_plan(plan.clone());
                storage.save(&doc)?;

                println!("Saved plan:");
                println!("{}", plan);
                println!("Run `liftlog sync` to push it to the server.");
                Ok(())
            }

            PlanSubcommand::List { format } => {
                let doc = storage.load_or_default()?;
                if doc.plans.is_empty() {
                    println!("No plans yet");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&doc.plans)?);
                    }
                    OutputFormat::Text => {
                        for plan in doc.plans.values() {
                            println!(
                                "  {:<24} starts {}  ({} scheduled day(s))",
                                plan.name,
                                plan.start_date,
                                plan.scheduled_days()
                            );
                        }
                        println!("\nTotal: {} plan(s)", doc.plans.len());
                    }
                }
                Ok(())
            }

            PlanSubcommand::Show { name } => {
                let doc = storage.load_or_default()?;
                match doc.plans.get(name) {
                    Some(plan) => {
                        println!("{}", plan);
                        Ok(())
                    }
                    None => Err(format!("Plan not found: {}", name).into()),
                }
            }

            PlanSubcommand::Delete { name } => {
                let mut doc = storage.load_or_default()?;
                if doc.plans.remove(name).is_none() {
                    return Err(format!("Plan not found: {}", name).into());
                }
                storage.save(&doc)?;
                println!("Deleted plan '{}'", name);
                Ok(())
            }
        }
    }
}

// Two years of dates is more plan than anyone schedules; also keeps the
// materialization loop and date arithmetic bounded.
const MAX_PLAN_DAYS: u32 = 730;

/// Resolves the `--weeks`/`--days` flags into a day count, defaulting to
/// 28 when neither is given.
fn resolve_num_days(
    weeks: Option<u32>,
    days: Option<u32>,
) -> Result<u32, Box<dyn std::error::Error>> {
    let num_days = match (weeks, days) {
        (Some(w), _) => w.saturating_mul(7),
        (None, Some(d)) => d,
        (None, None) => 28,
    };
    if num_days == 0 {
        return Err("Plan duration must be at least one day.".into());
    }
    if num_days > MAX_PLAN_DAYS {
        return Err(format!("Plan duration cannot exceed {} days.", MAX_PLAN_DAYS).into());
    }
    Ok(num_days)
}

/// Parses repeated `WEEKDAY=ex1,ex2` flags into a weekday template.
fn parse_weekly_template(
    specs: &[String],
) -> Result<HashMap<Weekday, Vec<String>>, Box<dyn std::error::Error>> {
    let mut template: HashMap<Weekday, Vec<String>> = HashMap::new();
    for spec in specs {
        let (day, exercises) = spec
            .split_once('=')
            .ok_or_else(|| format!("Invalid day spec '{}'. Use WEEKDAY=ex1,ex2.", spec))?;
        let weekday: Weekday = day
            .parse()
            .map_err(|_| format!("Unknown weekday '{}'.", day))?;
        let exercises: Vec<String> = exercises
            .split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if exercises.is_empty() {
            return Err(format!("No exercises given for '{}'.", day).into());
        }
        template.insert(weekday, exercises);
    }
    Ok(template)
}

/// Materializes a weekly template into the date-keyed occurrence list the
/// document stores.
fn materialize_schedule(
    start_date: NaiveDate,
    num_days: u32,
    template: &HashMap<Weekday, Vec<String>>,
) -> BTreeMap<String, Vec<String>> {
    let mut schedule = BTreeMap::new();
    for offset in 0..num_days {
        let day = start_date + Duration::days(offset as i64);
        if let Some(exercises) = template.get(&chrono::Datelike::weekday(&day)) {
            schedule.insert(day.format("%Y-%m-%d").to_string(), exercises.clone());
        }
    }
    schedule
}
