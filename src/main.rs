use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use surplus_cascade::reporting::{display_day, display_metrics, display_prediction, display_run};
use surplus_cascade::{
    DemandForecaster, EngineConfig, ForecastRequest, HistoricalForecaster, Result, SimError, SimulatedWeather,
    Simulator, SubprocessForecaster, WeatherSource,
};

#[derive(Debug, Parser)]
#[command(name = "surplus-cascade", version, about = "Food-surplus decision and simulation engine")]
struct Cli {
    /// JSON file overriding the built-in constants
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for every random source; entropy when absent
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// External forecast program (JSON request on stdin, JSON forecast on stdout)
    #[arg(long, global = true)]
    forecaster: Option<String>,

    /// Argument passed to the forecast program, repeatable
    #[arg(long = "forecaster-arg", global = true, allow_hyphen_values = true)]
    forecaster_args: Vec<String>,

    /// City reported to the weather source
    #[arg(long, global = true)]
    city: Option<String>,

    /// Print results as JSON instead of the console report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// One decision cycle for explicit conditions
    Predict {
        #[arg(long)]
        hour: u32,
        #[arg(long)]
        day_of_week: u32,
        #[arg(long)]
        temperature: f64,
        #[arg(long, default_value_t = 0.0)]
        rainfall: f64,
        #[arg(long, default_value_t = 0)]
        event_flag: u8,
    },
    /// Simulate a single day from a fresh state
    SimulateDay {
        #[arg(long, default_value_t = 0)]
        day: u32,
        #[arg(long)]
        event_flag: bool,
        /// First simulated date, today when absent
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    /// Multi-day run against the fixed-production baseline
    Run {
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Zero-based day with a promotion, repeatable
        #[arg(long = "event-day")]
        event_days: Vec<u32>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(city) = &cli.city {
        config.simulation.city = city.clone();
    }

    let mut master = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let forecaster: Box<dyn DemandForecaster> = match &cli.forecaster {
        Some(program) => Box::new(SubprocessForecaster::new(program.clone(), cli.forecaster_args.clone())),
        None => Box::new(HistoricalForecaster::new(StdRng::seed_from_u64(master.gen()))),
    };
    let weather: Box<dyn WeatherSource> = Box::new(SimulatedWeather::new(StdRng::seed_from_u64(master.gen())));
    let demand_rng = StdRng::seed_from_u64(master.gen());

    let start = |date: Option<NaiveDate>| date.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Command::Predict {
            hour,
            day_of_week,
            temperature,
            rainfall,
            event_flag,
        } => {
            let request = ForecastRequest::from_json(&serde_json::json!({
                "hour": hour,
                "day_of_week": day_of_week,
                "temperature": temperature,
                "rainfall": rainfall,
                "event_flag": event_flag,
            }))?;
            let mut sim = Simulator::new(config, forecaster, weather, demand_rng, start(None));
            let result = sim.predict(&request, None)?;
            if cli.json {
                print_json(&result)?;
            } else {
                display_prediction(&result);
            }
        }
        Command::SimulateDay {
            day,
            event_flag,
            start_date,
        } => {
            let mut sim = Simulator::new(config, forecaster, weather, demand_rng, start(start_date));
            let record = sim.simulate_day(day, event_flag)?;
            if cli.json {
                print_json(&record)?;
            } else {
                display_day(&record);
                display_metrics(&sim.metrics());
            }
        }
        Command::Run {
            days,
            event_days,
            start_date,
        } => {
            let mut sim = Simulator::new(config, forecaster, weather, demand_rng, start(start_date));
            let run = sim.run(days, &event_days)?;
            if cli.json {
                print_json(&run)?;
            } else {
                display_run(&run);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| SimError::invalid("output", e.to_string()))?;
    println!("{}", text);
    Ok(())
}
