use clap::Parser;
use gpio_mock::system_config::create_from_json;
use gpio_mock::RegisterGroup;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Load a mock GPIO core from a JSON configuration and run it for a number
/// of ticks, printing the register bank.
#[derive(Debug, Parser)]
#[command(name = "gpio_mock", version, about)]
struct Args {
    /// Path to the JSON core configuration
    config: String,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 1)]
    ticks: u64,

    /// Print the bank after every tick instead of only at the end
    #[arg(short, long)]
    every_tick: bool,

    /// Write a value before the first tick, as GROUP:PORT=VALUE (repeatable)
    #[arg(short, long = "write", value_name = "GROUP:PORT=VALUE")]
    writes: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut system = match create_from_json(&args.config) {
        Ok(system) => system,
        Err(e) => {
            error!("failed to create core: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for write in &args.writes {
        if let Err(e) = apply_write(system.core_mut(), write) {
            error!("invalid --write '{}': {}", write, e);
            return ExitCode::FAILURE;
        }
    }

    let info = system.info();
    println!("Core: {}", info.name);
    if !info.description.is_empty() {
        println!("  {}", info.description);
    }
    println!("  Ports: {}", info.port_count);
    println!("  Registers: {}", info.register_count);
    println!("  Rules: {}", info.rule_count);
    for rule in system.core().rules() {
        println!("    {}", rule);
    }
    println!();

    for _ in 0..args.ticks {
        system.run(1);
        if args.every_tick {
            println!("Tick {}", system.core().tick_count());
            print!("{}", system.core().bank());
        }
    }

    if !args.every_tick {
        println!("After {} ticks", system.core().tick_count());
        print!("{}", system.core().bank());
    }

    ExitCode::SUCCESS
}

fn apply_write(core: &mut gpio_mock::MockCore, spec: &str) -> Result<(), String> {
    let (target, value) = spec
        .split_once('=')
        .ok_or_else(|| "expected GROUP:PORT=VALUE".to_string())?;
    let (group, port) = target
        .split_once(':')
        .ok_or_else(|| "expected GROUP:PORT".to_string())?;

    let group = RegisterGroup::ALL
        .iter()
        .copied()
        .find(|g| g.to_str().eq_ignore_ascii_case(group))
        .ok_or_else(|| format!("unknown register group '{}'", group))?;
    let port: usize = port
        .parse()
        .map_err(|e| format!("bad port '{}': {}", port, e))?;
    let value: u8 = value
        .parse()
        .map_err(|e| format!("bad value '{}': {}", value, e))?;

    let port = core.port(port).map_err(|e| e.to_string())?;
    core.write(group, port, value);
    Ok(())
}
