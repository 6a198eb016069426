use clap::Parser;
use std::path::PathBuf;

/// framescope: live Ethernet/IPv4/TCP/UDP frame capture and header decoder
#[derive(Parser, Debug)]
#[command(name = "framescope", version, about)]
pub struct Cli {
    /// Network interface to capture on (e.g., "en0", "eth0").
    /// If not specified, the default interface is used.
    #[arg(short, long, conflicts_with = "read")]
    pub interface: Option<String>,

    /// Read frames from a pcap savefile instead of a live interface
    #[arg(short, long)]
    pub read: Option<PathBuf>,

    /// BPF filter expression (e.g., "tcp port 80", "host 192.168.1.1")
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Maximum number of frames to decode (0 = unlimited)
    #[arg(short = 'c', long)]
    pub count: Option<u64>,

    /// Snapshot length (max bytes per frame to capture)
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(1..))]
    pub snaplen: Option<i32>,

    /// Read timeout in milliseconds for the capture handle
    #[arg(short = 't', long, value_parser = clap::value_parser!(i32).range(1..))]
    pub timeout_ms: Option<i32>,

    /// Do not put the interface into promiscuous mode
    #[arg(long)]
    pub no_promiscuous: bool,

    /// Show a hex dump of each frame
    #[arg(long)]
    pub hex_dump: bool,

    /// Print one JSON object per frame
    #[arg(long, conflicts_with = "hex_dump")]
    pub json: bool,

    /// Only print the end-of-capture summary
    #[arg(short, long)]
    pub quiet: bool,

    /// TOML config file; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List available network interfaces and exit
    #[arg(short, long)]
    pub list_interfaces: bool,
}
