use std::fmt;

use course_core::model::{
    Course, CourseId, CourseModule, Lesson, LessonId, LessonKind, ModuleId, Quiz, QuizId,
};
use storage::repository::CourseRepository;
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    course_id: CourseId,
    course_title: String,
    modules: u32,
    lessons_per_module: u32,
    passing_score: u8,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingDbUrl,
    InvalidCourseId { raw: String },
    InvalidModules { raw: String },
    InvalidLessons { raw: String },
    InvalidPassingScore { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingDbUrl => write!(f, "--db is required (or set COURSE_DB_URL)"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course-id value: {raw}"),
            ArgsError::InvalidModules { raw } => write!(f, "invalid --modules value: {raw}"),
            ArgsError::InvalidLessons { raw } => {
                write!(f, "invalid --lessons-per-module value: {raw}")
            }
            ArgsError::InvalidPassingScore { raw } => {
                write!(f, "invalid --passing-score value: {raw}")
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
        let mut db_url = std::env::var("COURSE_DB_URL").ok();
        let mut course_id = CourseId::new(1);
        let mut course_title = "Demo Course".to_string();
        let mut modules = 3_u32;
        let mut lessons_per_module = 4_u32;
        let mut passing_score = 70_u8;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = Some(require_value(&mut args, "--db")?),
                "--course-id" => {
                    let raw = require_value(&mut args, "--course-id")?;
                    course_id = raw
                        .parse()
                        .map_err(|_| ArgsError::InvalidCourseId { raw })?;
                }
                "--title" => course_title = require_value(&mut args, "--title")?,
                "--modules" => {
                    let raw = require_value(&mut args, "--modules")?;
                    modules = raw.parse().map_err(|_| ArgsError::InvalidModules { raw })?;
                }
                "--lessons-per-module" => {
                    let raw = require_value(&mut args, "--lessons-per-module")?;
                    lessons_per_module =
                        raw.parse().map_err(|_| ArgsError::InvalidLessons { raw })?;
                }
                "--passing-score" => {
                    let raw = require_value(&mut args, "--passing-score")?;
                    passing_score = raw
                        .parse()
                        .map_err(|_| ArgsError::InvalidPassingScore { raw })?;
                }
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        let db_url = db_url.ok_or(ArgsError::MissingDbUrl)?;
        Ok(Self {
            db_url,
            course_id,
            course_title,
            modules,
            lessons_per_module,
            passing_score,
        })
    }
}

fn print_usage() {
    eprintln!("Usage: seed --db <url> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <url>                 SQLite database URL (or COURSE_DB_URL)");
    eprintln!("  --course-id <id>           Course id to upsert (default: 1)");
    eprintln!("  --title <title>            Course title (default: Demo Course)");
    eprintln!("  --modules <n>              Number of modules (default: 3)");
    eprintln!("  --lessons-per-module <n>   Lessons per module (default: 4)");
    eprintln!("  --passing-score <n>        Quiz passing score percent (default: 70)");
    eprintln!("  -h, --help                 Show this help");
}

fn build_course(args: &Args) -> Result<Course, Box<dyn std::error::Error>> {
    let mut modules = Vec::new();
    let mut next_lesson_id = 1_u64;

    for module_index in 0..args.modules {
        let module_id = ModuleId::new(u64::from(module_index) + 1);
        let mut lessons = Vec::new();
        for lesson_index in 0..args.lessons_per_module {
            let kind = if lesson_index % 2 == 0 {
                LessonKind::Video
            } else {
                LessonKind::Text
            };
            let lesson = Lesson::new(
                LessonId::new(next_lesson_id),
                module_id,
                format!("Module {} lesson {}", module_index + 1, lesson_index + 1),
                kind,
                lesson_index + 1,
            )?
            .with_duration_secs(300 + lesson_index * 60);
            lessons.push(lesson);
            next_lesson_id += 1;
        }

        // Last module's quiz doubles as the final exam; that is derived by
        // the engine from position, not stored.
        let quiz = Quiz::new(
            QuizId::new(u64::from(module_index) + 1),
            module_id,
            format!("Module {} quiz", module_index + 1),
            args.passing_score,
        )?;

        let module = CourseModule::new(
            module_id,
            args.course_id,
            format!("Module {}", module_index + 1),
            module_index + 1,
            lessons,
            Some(quiz),
        )?;
        modules.push(module);
    }

    Ok(Course::new(args.course_id, args.course_title.clone(), modules)?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    let course = build_course(&args)?;
    repo.upsert_course(&course).await?;

    println!(
        "Seeded course {} ({} modules, {} lessons) into {}",
        course.id().value(),
        course.modules().len(),
        course.lesson_count(),
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
