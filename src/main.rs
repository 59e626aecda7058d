mod telemetry;

use clap::{Parser, Subcommand};
use medremind_api::{
    create_reminder_controller, delete_reminder_controller, export_reminders_controller,
    get_reminders_controller, import_reminders_controller, mark_taken_controller,
    update_reminder_controller, Application, MedRemindError,
};
use medremind_api_structs::dtos::{ReminderDTO, ReminderRowDTO};
use medremind_api_structs::{
    delete_reminder, import_reminders, mark_taken, update_reminder, ReminderForm,
};
use medremind_domain::ID;
use medremind_infra::{setup_context, MedRemindContext, UserAction, UserActionKind};
use std::path::PathBuf;
use telemetry::{get_subscriber, init_subscriber};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

/// medremind - medication reminders for the terminal
#[derive(Parser)]
#[command(name = "medremind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new reminder
    Add {
        /// Name of the medication
        name: String,
        /// Dosage, e.g. "2 pills"
        dosage: String,
        /// Time of day as HH:MM
        time: String,
        /// once, daily, twice-daily or custom
        #[arg(short, long, default_value = "daily")]
        frequency: String,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Change an existing reminder. Fields that are left out keep their value.
    Edit {
        #[arg(value_name = "REMINDER_ID")]
        id: ID,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        dosage: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(short, long)]
        frequency: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a reminder
    Remove {
        #[arg(value_name = "REMINDER_ID")]
        id: ID,
    },

    /// Mark a dose as taken now
    Take {
        #[arg(value_name = "REMINDER_ID")]
        id: ID,
    },

    /// List reminders with the time left until their next dose
    List {
        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write every reminder as a JSON array
    Export {
        /// File to write to instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace every reminder with the ones in a JSON export
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Keep running and deliver reminders when they are due
    Run,
}

/// Commands accepted on stdin while running
#[derive(Debug, PartialEq)]
enum RunCommand {
    Take(ID),
    Snooze(ID),
    List,
    Help,
    Quit,
}

fn parse_run_command(line: &str) -> Result<RunCommand, String> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("help").to_lowercase();
    let mut reminder_id = || -> Result<ID, String> {
        parts
            .next()
            .ok_or_else(|| format!("Usage: {} <reminder id>", command))?
            .parse::<ID>()
            .map_err(|e| e.to_string())
    };

    match command.as_str() {
        "take" => Ok(RunCommand::Take(reminder_id()?)),
        "snooze" => Ok(RunCommand::Snooze(reminder_id()?)),
        "list" | "ls" => Ok(RunCommand::List),
        "help" | "?" => Ok(RunCommand::Help),
        "quit" | "exit" | "q" => Ok(RunCommand::Quit),
        other => Err(format!("Unknown command: {}. Type help for the commands.", other)),
    }
}

fn print_rows(rows: &[ReminderRowDTO]) {
    if rows.is_empty() {
        println!("No reminders yet.");
        return;
    }
    for row in rows {
        let r = &row.reminder;
        println!(
            "[{}] {} - {} at {} ({}), {}",
            r.id, r.name, r.dosage, row.time_display, row.frequency_label, row.countdown
        );
        if let Some(notes) = &r.notes {
            println!("    {}", notes);
        }
        if let Some(taken) = &row.last_taken_display {
            println!("    Last taken: {}", taken);
        }
    }
}

async fn list(ctx: &MedRemindContext, json: bool) -> Result<(), MedRemindError> {
    let res = get_reminders_controller(ctx).await?;
    if json {
        let rows = serde_json::to_string_pretty(&res.reminders)
            .map_err(|_| MedRemindError::InternalError)?;
        println!("{}", rows);
    } else {
        print_rows(&res.reminders);
    }
    Ok(())
}

async fn edit(
    ctx: &MedRemindContext,
    reminder_id: ID,
    name: Option<String>,
    dosage: Option<String>,
    time: Option<String>,
    frequency: Option<String>,
    notes: Option<String>,
) -> Result<(), MedRemindError> {
    let current = ctx
        .repos
        .reminder_repo
        .find(&reminder_id)
        .await
        .ok_or_else(|| {
            MedRemindError::NotFound(format!(
                "The reminder with id: {}, was not found.",
                reminder_id
            ))
        })?;

    let body = ReminderForm {
        name: name.unwrap_or(current.name),
        dosage: dosage.unwrap_or(current.dosage),
        time: time.unwrap_or_else(|| current.time.to_string()),
        frequency: Some(frequency.unwrap_or_else(|| current.frequency.to_string())),
        notes: notes.or(current.notes),
    };
    let res = update_reminder_controller(update_reminder::PathParams { reminder_id }, body, ctx)
        .await?;
    println!("Reminder {} updated", res.reminder.id);
    Ok(())
}

fn report_action(
    action: UserAction,
    res: Result<ReminderDTO, MedRemindError>,
    snooze_minutes: i64,
) {
    match res {
        Ok(reminder) => match action.kind {
            UserActionKind::Acknowledge => println!("{} marked as taken", reminder.name),
            UserActionKind::Postpone => {
                println!("{} snoozed for {} minutes", reminder.name, snooze_minutes)
            }
        },
        Err(e) => eprintln!("{}", e),
    }
}

async fn run(app: Application) {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            if let Err(e) = list(app.context(), false).await {
                error!("Unable to list reminders: {:?}", e);
            }
            let refresh = app.start_job_schedulers(|res| {
                println!();
                print_rows(&res.reminders);
            });
            let snooze_minutes = app.context().config.snooze_minutes;
            let clicks = app.listen_for_actions(move |action, res| {
                report_action(action, res, snooze_minutes)
            });

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = tokio::select! {
                    line = lines.next_line() => line,
                    _ = tokio::signal::ctrl_c() => break,
                };
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Unable to read from stdin: {:?}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let action = match parse_run_command(&line) {
                    Ok(RunCommand::Take(reminder_id)) => UserAction {
                        reminder_id,
                        kind: UserActionKind::Acknowledge,
                    },
                    Ok(RunCommand::Snooze(reminder_id)) => UserAction {
                        reminder_id,
                        kind: UserActionKind::Postpone,
                    },
                    Ok(RunCommand::List) => {
                        if let Err(e) = list(app.context(), false).await {
                            eprintln!("{}", e);
                        }
                        continue;
                    }
                    Ok(RunCommand::Help) => {
                        println!("Commands: take <id>, snooze <id>, list, quit");
                        continue;
                    }
                    Ok(RunCommand::Quit) => break,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };

                report_action(action, app.handle_action(action).await, snooze_minutes);
            }

            refresh.abort();
            if let Some(clicks) = clicks {
                clicks.abort();
            }
            app.stop();
        })
        .await;
}

async fn dispatch(command: Commands, ctx: MedRemindContext) -> Result<(), MedRemindError> {
    match command {
        Commands::Add {
            name,
            dosage,
            time,
            frequency,
            notes,
        } => {
            let body = ReminderForm {
                name,
                dosage,
                time,
                frequency: Some(frequency),
                notes,
            };
            let res = create_reminder_controller(body, &ctx).await?;
            println!("Reminder {} added", res.reminder.id);
        }
        Commands::Edit {
            id,
            name,
            dosage,
            time,
            frequency,
            notes,
        } => edit(&ctx, id, name, dosage, time, frequency, notes).await?,
        Commands::Remove { id } => {
            let res =
                delete_reminder_controller(delete_reminder::PathParams { reminder_id: id }, &ctx)
                    .await?;
            println!("Reminder {} deleted", res.reminder.name);
        }
        Commands::Take { id } => {
            let res = mark_taken_controller(mark_taken::PathParams { reminder_id: id }, &ctx)
                .await?;
            println!("{} marked as taken", res.reminder.name);
        }
        Commands::List { json } => list(&ctx, json).await?,
        Commands::Export { output } => {
            let res = export_reminders_controller(&ctx).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, res.payload).await.map_err(|e| {
                        error!("Unable to write {}: {:?}", path.display(), e);
                        MedRemindError::InternalError
                    })?;
                    println!("Exported {} reminders to {}", res.count, path.display());
                }
                None => println!("{}", res.payload),
            }
        }
        Commands::Import { input } => {
            let payload = tokio::fs::read_to_string(&input).await.map_err(|e| {
                MedRemindError::ImportFormat(format!("Unable to read {}: {}", input.display(), e))
            })?;
            let res =
                import_reminders_controller(import_reminders::RequestBody { payload }, &ctx)
                    .await?;
            println!("Imported {} reminders", res.reminders.len());
        }
        Commands::Run => run(Application::new(ctx).await).await,
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.command {
        Commands::Run => "info",
        _ => "warn",
    };
    let subscriber = get_subscriber("medremind".into(), level.into());
    init_subscriber(subscriber);

    let context = setup_context().await;

    let code = match dispatch(cli.command, context).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };
    // A stdin read left pending by `run` would hold up the runtime shutdown
    std::process::exit(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_defaults() {
        let cli = Cli::parse_from(["medremind", "add", "Aspirin", "100mg", "08:00"]);
        match cli.command {
            Commands::Add {
                name,
                frequency,
                notes,
                ..
            } => {
                assert_eq!(name, "Aspirin");
                assert_eq!(frequency, "daily");
                assert_eq!(notes, None);
            }
            _ => panic!("Expected add"),
        }
    }

    #[test]
    fn parses_run_commands() {
        assert_eq!(
            parse_run_command("take 1709280000000"),
            Ok(RunCommand::Take(ID::from(1709280000000)))
        );
        assert_eq!(
            parse_run_command("  SNOOZE 12 "),
            Ok(RunCommand::Snooze(ID::from(12)))
        );
        assert_eq!(parse_run_command("list"), Ok(RunCommand::List));
        assert_eq!(parse_run_command("q"), Ok(RunCommand::Quit));
        assert!(parse_run_command("take").is_err());
        assert!(parse_run_command("take abc").is_err());
        assert!(parse_run_command("dance").is_err());
    }
}
