use std::fmt;

use chrono::{DateTime, Duration, Utc};
use track_core::model::{
    EventType, Section, SectionId, TrainingDraft, User, UserId, UserRole,
};
use storage::repository::{
    SectionRepository, Storage, TrainingRepository, UserRepository,
};
use uuid::Uuid;

// Stable identities so reseeding an existing database updates rather than
// duplicates.
const ADMIN_ID: Uuid = Uuid::from_u128(0xA001);
const FULL_PI_ID: Uuid = Uuid::from_u128(0xB001);
const PROVISIONAL_PI_ID: Uuid = Uuid::from_u128(0xB002);
const STUDENT_IDS: [Uuid; 3] = [
    Uuid::from_u128(0xC001),
    Uuid::from_u128(0xC002),
    Uuid::from_u128(0xC003),
];

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("TRACK_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>    SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --now <rfc3339>      Fixed current time for deterministic seeding");
    eprintln!("  -h, --help           Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TRACK_DB_URL");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let sections = [
        Section::new(SectionId::new(1), "Basic Safety", None, true)?,
        Section::new(SectionId::new(2), "Laser Use", Some(SectionId::new(1)), true)?,
        Section::new(SectionId::new(3), "Advanced Laser", Some(SectionId::new(2)), true)?,
        Section::new(SectionId::new(4), "3D Printer", Some(SectionId::new(1)), true)?,
        Section::new(SectionId::new(5), "Manual Mill", None, false)?,
    ];
    for section in &sections {
        storage.sections.upsert_section(section).await?;
    }

    let users = [
        User::new(UserId::new(ADMIN_ID), "Avery Admin", "avery@lab.edu", UserRole::Admin)?,
        User::new(UserId::new(FULL_PI_ID), "Parisa Inez", "parisa@lab.edu", UserRole::FullPi)?,
        User::new(
            UserId::new(PROVISIONAL_PI_ID),
            "Pat Novak",
            "pat@lab.edu",
            UserRole::ProvisionalPi,
        )?,
        User::new(UserId::new(STUDENT_IDS[0]), "Sam Ortiz", "sam@lab.edu", UserRole::Student)?,
        User::new(UserId::new(STUDENT_IDS[1]), "Sky Lin", "sky@lab.edu", UserRole::Student)?,
        User::new(UserId::new(STUDENT_IDS[2]), "Sol Reyes", "sol@lab.edu", UserRole::Student)?,
    ];
    for user in &users {
        storage.users.upsert_user(user).await?;
    }

    // Sam: completed safety, trained on laser. Sky: just started.
    let trainings = [
        (STUDENT_IDS[0], 1, EventType::Trained, 30),
        (STUDENT_IDS[0], 1, EventType::Completed, 20),
        (STUDENT_IDS[0], 2, EventType::Trained, 10),
        (STUDENT_IDS[1], 1, EventType::Trained, 5),
    ];
    let mut inserted = 0_u32;
    for (student, section, event_type, days_ago) in trainings {
        let draft = TrainingDraft {
            student_id: UserId::new(student),
            pi_id: UserId::new(FULL_PI_ID),
            section_id: SectionId::new(section),
            event_type,
            timestamp: now - Duration::days(days_ago),
            notes: None,
        };
        storage.trainings.insert_training(&draft.validate()?).await?;
        inserted += 1;
    }

    println!(
        "Seeded {} sections, {} users and {} training events into {}",
        sections.len(),
        users.len(),
        inserted,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
