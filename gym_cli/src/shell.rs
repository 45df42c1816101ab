//! Interactive session: one command per line from the input stream.
//!
//! Each command runs to completion before the next line is read. Recoverable
//! errors (bad credentials, taken usernames, bad input) are printed and the
//! shell keeps going; storage failures end the session.

use crate::render;
use chrono::{Datelike, NaiveDate};
use gym_core::config::CalendarConfig;
use gym_core::{reports, Config, CredentialStore, Error, NewEntry, Result, Session};
use std::io::{BufRead, Write};
use std::path::PathBuf;

const HELP: &str = "\
Commands:
  login <username>                          then enter the password
  register <username>                       then enter the password
  log <YYYY-MM-DD|today> <weight> <reps> <exercise>
  view                                      workout history
  stats                                     latest entry
  exercises                                 exercises logged so far
  progress <exercise>                       1RM over time
  calendar [<year> <month>]                 workout days (default: first year, this month)
  whoami
  logout
  help
  quit";

/// A parsed shell line
#[derive(Debug, PartialEq)]
enum Command {
    Login(String),
    Register(String),
    Log(NewEntry),
    View,
    Stats,
    Exercises,
    Progress(String),
    Calendar(Option<(i32, u32)>),
    Whoami,
    Logout,
    Help,
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

pub struct Shell<R, W> {
    input: R,
    out: W,
    data_dir: PathBuf,
    calendar: CalendarConfig,
    today: NaiveDate,
    store: CredentialStore,
    session: Option<Session>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Open (and seed if needed) the credential table in `data_dir`
    pub fn new(
        input: R,
        out: W,
        data_dir: PathBuf,
        config: &Config,
        today: NaiveDate,
    ) -> Result<Self> {
        let store = CredentialStore::open_in(&data_dir)?;

        Ok(Self {
            input,
            out,
            data_dir,
            calendar: config.calendar.clone(),
            today,
            store,
            session: None,
        })
    }

    /// Read and execute commands until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "🏋 Gym Tracker")?;
        writeln!(self.out, "Type 'help' for commands. Please log in to access the app.")?;

        loop {
            let prompt = match &self.session {
                Some(session) => format!("[{}]> ", session.username()),
                None => "> ".to_string(),
            };
            write!(self.out, "{}", prompt)?;
            self.out.flush()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.out)?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let outcome = parse_command(&line, self.today).and_then(|cmd| self.execute(cmd));
            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) if e.is_user_facing() => {
                    writeln!(self.out, "✗ {}", e)?;
                }
                Err(e) => {
                    tracing::error!("Command failed: {}", e);
                    return Err(e);
                }
            }
        }

        if let Some(session) = self.session.take() {
            session.logout();
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn read_password(&mut self) -> Result<String> {
        write!(self.out, "Password: ")?;
        self.out.flush()?;
        let password = self.read_line()?;
        writeln!(self.out)?;
        password.ok_or_else(|| Error::InvalidInput("no password given".into()))
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotAuthenticated)
    }

    fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Login(username) => self.login(&username)?,
            Command::Register(username) => self.register(&username)?,
            Command::Log(entry) => self.log_entry(entry)?,
            Command::View => self.view_log()?,
            Command::Stats => self.view_stats()?,
            Command::Exercises => self.view_exercises()?,
            Command::Progress(exercise) => self.view_progress(&exercise)?,
            Command::Calendar(selection) => self.view_calendar(selection)?,
            Command::Whoami => {
                let name = self.session()?.username().to_string();
                writeln!(self.out, "🔓 Logged in as: {}", name)?;
            }
            Command::Logout => {
                let session = self.session.take().ok_or(Error::NotAuthenticated)?;
                let name = session.logout();
                writeln!(self.out, "✓ Logged out {}", name)?;
            }
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn login(&mut self, username: &str) -> Result<()> {
        // Always consume the password line so it is never run as a command
        let password = self.read_password()?;

        if let Some(session) = &self.session {
            return Err(Error::InvalidInput(format!(
                "already logged in as {}; logout first",
                session.username()
            )));
        }

        let session = Session::login(&self.store, &self.data_dir, username, &password)?;
        writeln!(self.out, "✓ Login successful!")?;
        writeln!(
            self.out,
            "Welcome, {}! Track your workouts, estimate your 1RM, and visualize progress.",
            session.username()
        )?;
        self.session = Some(session);
        Ok(())
    }

    fn register(&mut self, username: &str) -> Result<()> {
        let password = self.read_password()?;
        self.store.register(username, &password)?;
        writeln!(self.out, "✓ Registration successful! Please log in.")?;
        Ok(())
    }

    fn log_entry(&mut self, entry: NewEntry) -> Result<()> {
        entry.validate()?;

        let session = self.session.as_mut().ok_or(Error::NotAuthenticated)?;
        let recorded = session.log_entry(entry)?;
        let one_rep_max = render::kg(recorded.one_rep_max);
        writeln!(self.out, "✓ Entry added! Estimated 1RM: {} kg", one_rep_max)?;
        Ok(())
    }

    fn view_log(&mut self) -> Result<()> {
        let session = self.session()?;
        let text = match reports::history(session.ledger().entries()) {
            Some(rows) => format!("Workout History\n{}", render::history_table(&rows)),
            None => "No data recorded yet.".to_string(),
        };
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn view_stats(&mut self) -> Result<()> {
        let session = self.session()?;
        let text = match reports::latest(session.ledger().entries()) {
            Some(latest) => format!("Quick Stats\n{}", render::quick_stats(latest)),
            None => "No workouts logged yet!".to_string(),
        };
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn view_exercises(&mut self) -> Result<()> {
        let session = self.session()?;
        let names = reports::exercises(session.ledger().entries());
        let text = if names.is_empty() {
            "No workouts logged yet!".to_string()
        } else {
            names
                .iter()
                .map(|name| format!("- {}", name))
                .collect::<Vec<_>>()
                .join("\n")
        };
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn view_progress(&mut self, exercise: &str) -> Result<()> {
        let session = self.session()?;
        let entries = session.ledger().entries();

        let text = if entries.is_empty() {
            "Log some workouts to see progress!".to_string()
        } else {
            match reports::progress(entries, exercise) {
                Some(points) => render::progress_chart(exercise, &points),
                None => "No data for the selected exercise.".to_string(),
            }
        };
        writeln!(self.out, "{}", text.trim_end())?;
        Ok(())
    }

    /// Without a selection: the first configured year, current month
    fn view_calendar(&mut self, selection: Option<(i32, u32)>) -> Result<()> {
        let session = self.session()?;
        let (year, month) =
            selection.unwrap_or((self.calendar.first_year, self.today.month()));
        if !self.calendar.contains(year) {
            return Err(Error::InvalidInput(format!(
                "year must be between {} and {}",
                self.calendar.first_year, self.calendar.last_year
            )));
        }

        let text = match reports::calendar(session.ledger().entries(), year, month)? {
            Some(view) => render::calendar(&view),
            None => "No workouts logged yet.".to_string(),
        };
        writeln!(self.out, "{}", text.trim_end())?;
        Ok(())
    }
}

fn usage(form: &str) -> Error {
    Error::InvalidInput(format!("usage: {}", form))
}

fn parse_command(line: &str, today: NaiveDate) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err(usage("help"));
    };
    let rest: Vec<&str> = words.collect();

    let command = match name.to_lowercase().as_str() {
        "login" => match rest.as_slice() {
            [username] => Command::Login(username.to_string()),
            _ => return Err(usage("login <username>")),
        },
        "register" => match rest.as_slice() {
            [username] => Command::Register(username.to_string()),
            _ => return Err(usage("register <username>")),
        },
        "log" => Command::Log(parse_log_args(&rest, today)?),
        "view" => Command::View,
        "stats" => Command::Stats,
        "exercises" => Command::Exercises,
        "progress" => {
            if rest.is_empty() {
                return Err(usage("progress <exercise>"));
            }
            Command::Progress(rest.join(" "))
        }
        "calendar" => match rest.as_slice() {
            [] => Command::Calendar(None),
            [year, month] => {
                let year = year
                    .parse::<i32>()
                    .map_err(|_| Error::InvalidInput(format!("invalid year '{}'", year)))?;
                let month = month
                    .parse::<u32>()
                    .ok()
                    .filter(|m| (1..=12).contains(m))
                    .ok_or_else(|| Error::InvalidInput(format!("invalid month '{}'", month)))?;
                Command::Calendar(Some((year, month)))
            }
            _ => return Err(usage("calendar [<year> <month>]")),
        },
        "whoami" => Command::Whoami,
        "logout" => Command::Logout,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown command '{}' (type 'help')",
                other
            )))
        }
    };
    Ok(command)
}

fn parse_log_args(args: &[&str], today: NaiveDate) -> Result<NewEntry> {
    let [date, weight, reps, exercise @ ..] = args else {
        return Err(usage("log <YYYY-MM-DD|today> <weight> <reps> <exercise>"));
    };
    if exercise.is_empty() {
        return Err(usage("log <YYYY-MM-DD|today> <weight> <reps> <exercise>"));
    }

    let date = if date.eq_ignore_ascii_case("today") {
        today
    } else {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| Error::InvalidInput(format!("invalid date '{}'", date)))?
    };
    let weight = weight
        .parse::<f64>()
        .map_err(|_| Error::InvalidInput(format!("invalid weight '{}'", weight)))?;
    let reps = reps
        .parse::<u32>()
        .map_err(|_| Error::InvalidInput(format!("invalid reps '{}'", reps)))?;

    Ok(NewEntry::new(date, exercise.join(" "), weight, reps))
}
