//! ringmod - ring-modulate a live input from the terminal
//!
//! Run with: cargo run --features cpal_sink -- --depth 1.0

use std::io::{self, BufRead, Write};

use clap::Parser;
use ringmod::{CpalDevice, RingMod, RingModConfig};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ringmod", about = "Real-time ring modulator for a live audio input")]
struct Cli {
    /// Initial modulator rate in Hz.
    #[arg(long, default_value_t = 5.0)]
    rate: f32,
    /// Initial modulation depth (0.0 - 1.0).
    #[arg(long, default_value_t = 1.0)]
    depth: f32,
    /// Initial output level in dBFS.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    level: f32,
    /// Capture device name (system default if omitted).
    #[arg(long)]
    input: Option<String>,
    /// Playback device name (system default if omitted).
    #[arg(long)]
    output: Option<String>,
    /// List audio devices and exit.
    #[arg(long)]
    list_devices: bool,
    /// Log parameter changes and device transitions.
    #[arg(short, long)]
    verbose: bool,
}

const HELP: &str = "commands: t (toggle)  r <hz>  l <dBFS>  d <depth>  q (quit)";

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    if cli.list_devices {
        list_devices();
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn list_devices() {
    println!("inputs:");
    for device in CpalDevice::list_inputs() {
        println!("  {} ({} Hz, {} ch)", device.name(), device.sample_rate(), device.channels());
    }
    println!("outputs:");
    for device in CpalDevice::list_outputs() {
        println!("  {} ({} Hz, {} ch)", device.name(), device.sample_rate(), device.channels());
    }
}

fn run(cli: Cli) -> ringmod::Result<()> {
    let mut config = RingModConfig::default()
        .with_rate_hz(cli.rate)
        .with_depth(cli.depth)
        .with_output_db(cli.level);
    config.input_device = cli.input;
    config.output_device = cli.output;

    let mut fx = RingMod::from_default_devices(&config)?;

    println!("{HELP}");
    print_status(&fx);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else { continue };
        let value = words.next().map(str::parse::<f32>);

        let result = match (command, value) {
            ("q", _) => break,
            ("t", _) => fx.on_transport_toggle().map(|_| ()),
            ("r", Some(Ok(hz))) => fx.on_rate_change(hz).map(|_| ()),
            ("l", Some(Ok(db))) => fx.on_output_level_change(db).map(|_| ()),
            ("d", Some(Ok(depth))) => fx.on_depth_change(depth).map(|_| ()),
            _ => {
                println!("{HELP}");
                continue;
            }
        };

        // failures are reported and the previous state stays in effect
        if let Err(e) = result {
            eprintln!("Error: {e}");
        }
        print_status(&fx);
    }

    fx.close()
}

fn print_status<B: ringmod::Backend>(fx: &RingMod<B>) {
    print!(
        "[{}] rate {}  depth {:.2}  level {}",
        fx.transport_state().label(),
        fx.rate_label(),
        fx.depth(),
        fx.level_label(),
    );
    let dropouts = fx.carrier_dropouts();
    if dropouts > 0 {
        print!("  ({dropouts} input dropouts)");
    }
    println!();
    let _ = io::stdout().flush();
}
