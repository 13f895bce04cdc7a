use clap::{Parser, Subcommand};
use hh_vacancies::{
    config::{get_config, init_config, Config, LogFormat},
    database::{pool::create_pool, schema::ensure_schema},
    dto::menu_dto::{KeywordInput, MenuChoice, MENU},
    services::report_service::Report,
    AppState,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hh-vacancies",
    about = "Load HeadHunter vacancies into PostgreSQL and report on them",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,
    /// Fetch, snapshot and load vacancies for every configured employer
    Ingest,
    /// Companies and their vacancy counts
    Companies,
    /// All vacancies with company, salary range and link
    Vacancies,
    /// Average minimum and maximum salary
    AvgSalary,
    /// Vacancies whose salary range is above the average
    AboveAverage,
    /// Vacancies whose title contains a keyword
    Search { keyword: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_config()?;
    let config = get_config()?;
    init_tracing(config.log_format);

    let pool = create_pool(config).await?;
    let state = AppState::new(pool, config)?;
    ensure_schema(&state.pool).await?;

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => run_menu(&state, config).await?,
        Command::Ingest => ingest(&state, config).await,
        Command::Companies => report(&state, &Report::CompaniesAndCounts).await?,
        Command::Vacancies => report(&state, &Report::AllVacancies).await?,
        Command::AvgSalary => report(&state, &Report::AverageSalary).await?,
        Command::AboveAverage => report(&state, &Report::AboveAverageSalary).await?,
        Command::Search { keyword } => report(&state, &KeywordInput::parse(&keyword)?).await?,
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn ingest(state: &AppState, config: &Config) {
    info!(employers = config.employers.len(), mode = ?config.load_mode, "Starting ingestion");
    let report = state.ingest_service().run(&config.employers).await;
    println!("{}", report);
}

async fn report(state: &AppState, report: &Report) -> hh_vacancies::error::Result<()> {
    let mut out = std::io::stdout();
    state.report_service.run(report, &mut out).await
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> anyhow::Result<Option<String>> {
    println!("{}", text);
    Ok(lines.next_line().await?)
}

async fn run_menu(state: &AppState, config: &Config) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let separator = "_".repeat(80);

    loop {
        let Some(line) = prompt(&mut lines, &format!("{}\n{}", separator, MENU)).await? else {
            break;
        };

        let choice = match line.parse::<MenuChoice>() {
            Ok(choice) => choice,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let outcome = match choice {
            MenuChoice::Exit => break,
            MenuChoice::Ingest => {
                ingest(state, config).await;
                Ok(())
            }
            MenuChoice::Report(selected) => report(state, &selected).await,
            MenuChoice::KeywordSearch => {
                let Some(raw) = prompt(&mut lines, "Enter a keyword to search for:").await? else {
                    break;
                };
                match KeywordInput::parse(&raw) {
                    Ok(selected) => report(state, &selected).await,
                    Err(e) => Err(e),
                }
            }
        };

        if let Err(e) = outcome {
            error!(error = %e, "Operation failed");
            println!("Operation failed: {}", e);
        }
    }

    println!("Bye!");
    Ok(())
}
