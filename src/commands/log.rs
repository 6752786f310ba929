use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand, ValueEnum};

use crate::models::LogEntry;
use crate::sync::LocalStorage;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct LogCommand {
    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Record a completed exercise
    Add {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Plan the exercise belongs to
        #[arg(long, short)]
        plan: String,

        /// Exercise identifier
        #[arg(long, short)]
        exercise: String,

        /// Weight used
        #[arg(long, short)]
        weight: f64,

        /// Repetitions per set
        #[arg(long, short)]
        reps: u32,

        /// Number of sets
        #[arg(long, short)]
        sets: u32,

        /// Perceived effort, 1-10
        #[arg(long)]
        rpe: Option<u8>,

        /// Drop earlier entries for the same date and exercise before
        /// recording this one
        #[arg(long)]
        replace: bool,
    },

    /// Show training history
    History {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Filter by exercise
        #[arg(long, short)]
        exercise: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl LogCommand {
    pub fn run(&self, storage: &LocalStorage) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            LogSubcommand::Add {
                date,
                plan,
                exercise,
                weight,
                reps,
                sets,
                rpe,
                replace,
            } => {
                let date = parse_or_today(date.as_deref())?;

                if *weight < 0.0 {
                    return Err("Weight must be >= 0.".into());
                }
                if *reps == 0 || *sets == 0 {
                    return Err("Reps and sets must be > 0.".into());
                }
                if let Some(rpe) = rpe {
                    if !(1..=10).contains(rpe) {
                        return Err("RPE must be between 1 and 10.".into());
                    }
                }

                let mut entry = LogEntry::new(date, plan, exercise, *weight, *reps, *sets);
                if let Some(rpe) = rpe {
                    entry = entry.with_rpe(*rpe);
                }

                let mut doc = storage.load_or_default()?;
                if *replace {
                    // Re-logging a slot assigns a fresh ts, which is a new
                    // identity to the merge. Dropping the old entries here
                    // is the only way the old identity goes away.
                    let before = doc.logs.len();
                    doc.logs
                        .retain(|e| !(e.date == date && e.exercise == entry.exercise));
                    let dropped = before - doc.logs.len();
                    if dropped > 0 {
                        println!("Replaced {} earlier entr(ies) for this slot.", dropped);
                    }
                }
                doc.logs.push(entry.clone());
                storage.save(&doc)?;

                println!("Logged:");
                println!("{}", entry);
                Ok(())
            }

            LogSubcommand::History {
                from,
                to,
                exercise,
                format,
            } => {
                let doc = storage.load_or_default()?;

                let from_date = from
                    .as_deref()
                    .map(parse_date)
                    .transpose()?
                    .unwrap_or(NaiveDate::MIN);
                let to_date = to
                    .as_deref()
                    .map(parse_date)
                    .transpose()?
                    .unwrap_or(NaiveDate::MAX);

                let mut entries: Vec<&LogEntry> = doc
                    .logs
                    .iter()
                    .filter(|e| e.date >= from_date && e.date <= to_date)
                    .filter(|e| exercise.as_deref().map_or(true, |ex| e.exercise == ex))
                    .collect();
                entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.exercise.cmp(&b.exercise)));

                if entries.is_empty() {
                    println!("No logs found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        for entry in &entries {
                            println!("{}", entry);
                        }
                        println!("\nTotal: {} entr(ies)", entries.len());
                    }
                }
                Ok(())
            }
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s).into())
}

fn parse_or_today(s: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match s {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}
