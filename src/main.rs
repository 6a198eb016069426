mod cli;

use clap::Parser;
use framescope::capture::{self, FrameSource};
use framescope::config::{self, Config};
use framescope::display::{self, Printer, Style};
use framescope::sniffer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    let args = cli::Cli::parse();

    // Initialize tracing/logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if args.list_interfaces {
        list_interfaces();
        return;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_capture(&config, args.verbose) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// List available network interfaces and print them.
fn list_interfaces() {
    match capture::engine::list_interfaces() {
        Ok(devices) => {
            println!("Available network interfaces:");
            println!("{:<20} {:<20} {}", "Name", "Description", "Addresses");
            println!("{}", "-".repeat(70));
            for device in &devices {
                let desc = device.desc.as_deref().unwrap_or("");
                let addrs: Vec<String> = device
                    .addresses
                    .iter()
                    .map(|a| format!("{}", a.addr))
                    .collect();
                println!("{:<20} {:<20} {}", device.name, desc, addrs.join(", "));
            }
            if devices.is_empty() {
                println!("  (no interfaces found, try running with sudo)");
            }
        }
        Err(e) => {
            eprintln!("error listing interfaces: {}", e);
            eprintln!("hint: try running with sudo");
        }
    }
}

/// Open the frame source before anything else so that permission and device
/// errors end the process before the loop starts.
fn open_source(config: &config::CaptureConfig) -> Result<Box<dyn FrameSource>, capture::CaptureError> {
    match &config.read_file {
        Some(path) => {
            let source = capture::engine::open_offline(path, config.filter.as_deref())?;
            Ok(Box::new(source))
        }
        None => {
            let source = capture::engine::open_live(&config.live())?;
            Ok(Box::new(source))
        }
    }
}

fn run_capture(config: &Config, verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = match open_source(&config.capture) {
        Ok(source) => source,
        Err(e) => {
            if config.capture.read_file.is_none() {
                eprintln!("hint: live capture usually needs root or CAP_NET_RAW");
            }
            return Err(Box::new(e));
        }
    };

    // Set up Ctrl-C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
        eprintln!("\nInterrupt received, stopping capture...");
    })?;

    let style = if config.output.quiet {
        Style::Quiet
    } else if config.output.json {
        Style::Json
    } else if config.output.hex_dump || verbose >= 2 {
        Style::Detail {
            hex_dump: config.output.hex_dump,
        }
    } else {
        Style::Summary
    };

    if style != Style::Json {
        let origin = match &config.capture.read_file {
            Some(path) => format!("file: {}", path.display()),
            None => format!(
                "interface: {}",
                config.capture.interface.as_deref().unwrap_or("(default)")
            ),
        };
        println!("framescope v{}", env!("CARGO_PKG_VERSION"));
        println!("Capturing on {}", origin);
        if let Some(filter) = &config.capture.filter {
            println!("Filter: {}", filter);
        }
        if config.run.count > 0 {
            println!("Capturing {} frames...", config.run.count);
        } else {
            println!("Capturing frames (Ctrl-C to stop)...");
        }
        println!();
    }

    let mut printer = Printer::new(style);
    let outcome = sniffer::run(source.as_mut(), &running, config.run.count, &mut printer);
    let stats = match &outcome {
        Ok(stats) => *stats,
        Err(e) => e.stats,
    };

    if style == Style::Json {
        tracing::info!(frames = stats.frames, failed = stats.failed, "capture complete");
    } else {
        println!();
        println!("{}", display::capture_summary(&stats));
    }

    outcome?;
    Ok(())
}

fn load_config(args: &cli::Cli) -> Result<Config, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(value) = &args.interface {
        config.capture.interface = Some(value.clone());
        config.capture.read_file = None;
    }
    if let Some(value) = &args.read {
        config.capture.read_file = Some(value.clone());
    }
    if let Some(value) = &args.filter {
        config.capture.filter = Some(value.clone());
    }
    if let Some(value) = args.count {
        config.run.count = value;
    }
    if let Some(value) = args.snaplen {
        config.capture.snaplen = value;
    }
    if let Some(value) = args.timeout_ms {
        config.capture.timeout_ms = value;
    }

    if args.no_promiscuous {
        config.capture.promiscuous = false;
    }
    if args.hex_dump {
        config.output.hex_dump = true;
    }
    if args.json {
        config.output.json = true;
    }
    if args.quiet {
        config.output.quiet = true;
    }

    config.validate()?;
    Ok(config)
}
