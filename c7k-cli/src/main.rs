mod chart;
mod listing;
mod sim;

use anyhow::{Context, Result};
use c7k_keymap::{ChordEngine, ChordTable, Controller, Millis, Timing};
use clap::{Args, Parser, Subcommand};
use std::fs;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "c7k")]
#[command(about = "c7k seven-key chord keyboard tool")]
struct Cli {
    /// Log every tick and delay
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the chord table, layer by layer
    Table,
    /// Validate the built-in chord configuration
    Check,
    /// Replay a key script through the chord controller
    Simulate {
        /// Path to the script (`<ms> <keys>` per line)
        script: String,

        #[command(flatten)]
        timing: TimingArgs,
    },
    /// Write an HTML chord chart
    Chart {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the chords that type some text
    Lookup {
        text: String,
    },
}

#[derive(Args)]
struct TimingArgs {
    /// Minimum hold before a combo counts
    #[arg(long, default_value_t = Timing::DEFAULT.min_hold)]
    min_hold_ms: Millis,
    /// Rolling-press window after a dispatch
    #[arg(long, default_value_t = Timing::DEFAULT.combo_window)]
    combo_window_ms: Millis,
    /// Pause after a keystroke or pointer move
    #[arg(long, default_value_t = Timing::DEFAULT.cooldown)]
    cooldown_ms: Millis,
    /// Minimum spacing between two counted releases
    #[arg(long, default_value_t = Timing::DEFAULT.release_window)]
    release_window_ms: Millis,
    /// Delay between two ticks; must be at least 1 so the clock advances
    #[arg(
        long,
        default_value_t = Timing::DEFAULT.poll_interval,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    poll_ms: Millis,
}

impl TimingArgs {
    fn timing(&self) -> Timing {
        Timing::DEFAULT
            .with_min_hold(self.min_hold_ms)
            .with_combo_window(self.combo_window_ms)
            .with_cooldown(self.cooldown_ms)
            .with_release_window(self.release_window_ms)
            .with_poll_interval(self.poll_ms)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let table = ChordTable::builtin().context("invalid chord configuration")?;

    match cli.command {
        Command::Table => listing::print_table(&table),
        Command::Check => {
            println!(
                "Chord table OK: {} chords, {} modifiers, {} mouse moves",
                table.entries().len(),
                table.modifiers().len(),
                table.mouse_moves().len()
            );
            println!(
                "Mouse trigger {}, modifier trigger {}",
                table.mouse_trigger(),
                table.layer_trigger()
            );
        }
        Command::Simulate { script, timing } => {
            let contents =
                fs::read_to_string(&script).with_context(|| format!("reading {}", script))?;
            let parsed = sim::Script::parse(&contents).context("parsing key script")?;
            let timing = timing.timing();
            info!(?timing, end_ms = parsed.end(), "simulating");

            let mut controller =
                Controller::new(ChordEngine::new(&table, timing), sim::SimBoard::new(parsed));
            controller.run();
            let board = controller.into_device();

            for (at, output) in board.transcript() {
                println!("{at:>7}  {output}");
            }
            println!("Typed: {:?}", board.typed());
            println!("Display: {:?}", board.status_line());
        }
        Command::Chart { output } => {
            let html = chart::generate_html(&table);
            match output {
                Some(path) => {
                    fs::write(&path, html).with_context(|| format!("writing {}", path))?;
                    println!("Chart written to {path}");
                }
                None => print!("{html}"),
            }
        }
        Command::Lookup { text } => listing::print_lookup(&table, &text)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn simulate_timing(args: &[&str]) -> Result<Timing, clap::Error> {
        let argv = ["c7k", "simulate", "script.txt"].iter().chain(args);
        match Cli::try_parse_from(argv)?.command {
            Command::Simulate { timing, .. } => Ok(timing.timing()),
            _ => unreachable!("parsed a simulate command line"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn timing_flags_default_to_device_timing() {
        assert_eq!(simulate_timing(&[]).unwrap(), Timing::DEFAULT);
    }

    #[test]
    fn timing_flags_override() {
        let timing = simulate_timing(&["--poll-ms", "1", "--cooldown-ms", "0"]).unwrap();
        assert_eq!(timing.poll_interval, 1);
        assert_eq!(timing.cooldown, 0);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(simulate_timing(&["--poll-ms", "0"]).is_err());
        assert!(simulate_timing(&["--poll-ms", "0", "--cooldown-ms", "0"]).is_err());
    }
}
