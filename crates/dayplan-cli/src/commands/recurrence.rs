use chrono::NaiveDate;
use clap::Subcommand;
use dayplan_core::{validate_rule, Config, RecurrenceEngine, RecurrenceRule};

#[derive(Subcommand)]
pub enum RecurrenceAction {
    /// Check whether a rule is due on a date
    Check {
        /// Rule as JSON (e.g. '{"frequency":"daily","interval":2}')
        #[arg(long)]
        rule: String,
        /// Date to check (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Fallback start when the rule has no startDate
        #[arg(long)]
        anchor: Option<NaiveDate>,
    },
    /// List the occurrences of a rule in a date range
    Expand {
        /// Rule as JSON
        #[arg(long)]
        rule: String,
        /// First date of the range (inclusive)
        #[arg(long)]
        from: NaiveDate,
        /// Last date of the range (inclusive)
        #[arg(long)]
        to: NaiveDate,
        /// Fallback start when the rule has no startDate
        #[arg(long)]
        anchor: Option<NaiveDate>,
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Validate a rule and list its problems
    Validate {
        /// Rule as JSON
        #[arg(long)]
        rule: String,
    },
}

pub fn run(action: RecurrenceAction) -> Result<(), Box<dyn std::error::Error>> {
    let holidays = Config::load_or_default().holiday_calendar();
    let engine = RecurrenceEngine::with_holidays(&holidays);

    match action {
        RecurrenceAction::Check { rule, date, anchor } => {
            let rule = parse_rule(&rule)?;
            if engine.is_due(&rule, date, anchor) {
                println!("{date}: due");
            } else {
                println!("{date}: not due");
            }
        }
        RecurrenceAction::Expand {
            rule,
            from,
            to,
            anchor,
            json,
        } => {
            let rule = parse_rule(&rule)?;
            let dates = engine.expand(&rule, from, to, anchor);
            if json {
                println!("{}", serde_json::to_string_pretty(&dates)?);
            } else {
                for date in dates {
                    println!("{date}");
                }
            }
        }
        RecurrenceAction::Validate { rule } => {
            let rule: RecurrenceRule = serde_json::from_str(&rule)?;
            let validation = validate_rule(&rule);
            if validation.is_valid {
                println!("valid");
            } else {
                for error in &validation.errors {
                    println!("- {error}");
                }
                return Err(format!("rule has {} error(s)", validation.errors.len()).into());
            }
        }
    }
    Ok(())
}

/// Parse a rule and refuse to evaluate one that does not validate.
fn parse_rule(json: &str) -> Result<RecurrenceRule, Box<dyn std::error::Error>> {
    let rule: RecurrenceRule = serde_json::from_str(json)?;
    let validation = validate_rule(&rule);
    if !validation.is_valid {
        return Err(format!("invalid rule: {}", validation.errors.join("; ")).into());
    }
    Ok(rule)
}
