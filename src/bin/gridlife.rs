//! gridlife headless runner
//!
//! Builds a board from flags, a config file or a snapshot, runs it for a
//! number of generations at the configured rate and optionally saves the
//! result.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gridlife::{pattern, snapshot_filename, Simulation, SimulationConfig, PATTERNS, PRESETS};

/// Control-loop wake interval, roughly one display frame.
const WAKE_INTERVAL: Duration = Duration::from_millis(16);

/// A pattern to stamp, with an optional anchor.
struct Placement {
    id: String,
    anchor: Option<(i64, i64)>,
}

/// Runner options
#[derive(Default)]
struct Options {
    config_path: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    rules: Option<String>,
    rate: Option<u32>,
    placements: Vec<Placement>,
    random: Option<f64>,
    seed: Option<u64>,
    generations: u64,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) => v.as_str(),
        None => fail(&format!("{flag} requires a value")),
    }
}

fn number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let raw = value(args, i, flag);
    raw.parse()
        .unwrap_or_else(|_| fail(&format!("invalid value for {flag}: {raw}")))
}

fn parse_placement(raw: &str) -> Placement {
    let Some((id, at)) = raw.split_once('@') else {
        return Placement {
            id: raw.to_string(),
            anchor: None,
        };
    };
    let anchor = at
        .split_once(',')
        .and_then(|(x, y)| Some((x.trim().parse().ok()?, y.trim().parse().ok()?)))
        .unwrap_or_else(|| fail(&format!("invalid pattern anchor: {at}")));
    Placement {
        id: id.to_string(),
        anchor: Some(anchor),
    }
}

fn print_help() {
    println!("gridlife - Life-like cellular automaton runner");
    println!();
    println!("USAGE:");
    println!("    gridlife [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>         JSON config file");
    println!("        --width <N>             Board width, 10-1000 [default: 100]");
    println!("        --height <N>            Board height, 10-1000 [default: 100]");
    println!("    -r, --rules <B../S..>       Rule notation [default: B3/S23]");
    println!("        --rate <N>              Steps per second, 1-30 [default: 10]");
    println!("    -p, --pattern <ID[@X,Y]>    Stamp a pattern (repeatable)");
    println!("        --random <DENSITY>      Randomize the board");
    println!("        --seed <N>              Seed for --random");
    println!("    -g, --generations <N>       Generations to run [default: 0]");
    println!("    -l, --load <FILE>           Load a snapshot");
    println!("    -s, --save <PATH>           Save a snapshot (a directory gets a timestamped name)");
    println!("        --list-patterns         List built-in patterns");
    println!("        --list-rules            List rule presets");
    println!("    -h, --help                  Print help information");
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => options.config_path = Some(PathBuf::from(value(&args, i, "--config"))),
            "--width" => options.width = Some(number(&args, i, "--width")),
            "--height" => options.height = Some(number(&args, i, "--height")),
            "--rules" | "-r" => options.rules = Some(value(&args, i, "--rules").to_string()),
            "--rate" => options.rate = Some(number(&args, i, "--rate")),
            "--pattern" | "-p" => options.placements.push(parse_placement(value(&args, i, "--pattern"))),
            "--random" => options.random = Some(number(&args, i, "--random")),
            "--seed" => options.seed = Some(number(&args, i, "--seed")),
            "--generations" | "-g" => options.generations = number(&args, i, "--generations"),
            "--load" | "-l" => options.load = Some(PathBuf::from(value(&args, i, "--load"))),
            "--save" | "-s" => options.save = Some(PathBuf::from(value(&args, i, "--save"))),
            "--list-patterns" => {
                for p in PATTERNS {
                    println!("{:<12} {:>3}x{:<3} {}", p.id, p.width, p.height, p.description);
                }
                std::process::exit(0);
            }
            "--list-rules" => {
                for preset in PRESETS {
                    println!("{:<16} {:<10} {}", preset.name, preset.notation, preset.description);
                }
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => fail(&format!("unknown argument: {arg}")),
        }
        i += 2;
    }

    options
}

fn load_config(options: &Options) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut config = match &options.config_path {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => SimulationConfig::default(),
    };
    if let Some(width) = options.width {
        config.width = width;
    }
    if let Some(height) = options.height {
        config.height = height;
    }
    if let Some(rules) = &options.rules {
        config.rules.clone_from(rules);
    }
    if let Some(rate) = options.rate {
        config.rate = rate;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let options = parse_args();
    let config = load_config(&options)?;
    info!(
        width = config.width,
        height = config.height,
        rules = %config.rules,
        rate = config.rate,
        "configuration loaded"
    );

    let mut sim = Simulation::new(config)?;

    if let Some(path) = &options.load {
        sim.load_from(&mut BufReader::new(File::open(path)?))?;
    }

    if let Some(density) = options.random {
        let outcome = match options.seed {
            Some(seed) => sim.randomize_with(density, &mut StdRng::seed_from_u64(seed)),
            None => sim.randomize(density),
        };
        debug!(?outcome, density, "board randomized");
    }

    for placement in &options.placements {
        let Some(p) = pattern::find(&placement.id) else {
            fail(&format!("unknown pattern: {}", placement.id));
        };
        let (x, y) = placement.anchor.unwrap_or_else(|| {
            let grid = sim.grid();
            (
                i64::from(grid.width() / 2) - i64::from(p.width / 2),
                i64::from(grid.height() / 2) - i64::from(p.height / 2),
            )
        });
        let _ = sim.place_pattern(x, y, p);
    }

    if options.generations > 0 {
        let target = sim.grid().generation() + options.generations;
        let started = Instant::now();
        sim.start()?;
        while sim.grid().generation() < target {
            for update in sim.tick()? {
                debug!(
                    generation = update.generation,
                    population = update.population,
                    births = update.births,
                    deaths = update.deaths,
                    "generation"
                );
            }
            thread::sleep(WAKE_INTERVAL);
        }
        sim.stop();
        let stats = sim.stats();
        info!(
            generation = stats.generation,
            population = stats.population,
            births = stats.births,
            deaths = stats.deaths,
            elapsed_ms = started.elapsed().as_millis(),
            "run finished"
        );
    }

    if let Some(path) = &options.save {
        let path = if path.is_dir() {
            path.join(snapshot_filename("gridlife", "json", Utc::now()))
        } else {
            path.clone()
        };
        sim.save_to(&mut BufWriter::new(File::create(&path)?))?;
        info!(path = %path.display(), "snapshot saved");
    }

    sim.shutdown();
    Ok(())
}
