use clap::{ArgAction, Parser};
use gate_proxy::{run, ExecuteConfig};
use log;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "SOCKS4 proxy with a rule-file firewall", long_about = None)]
struct Args {
    #[arg(help = "On what TCP port listen for SOCKS4 requests")]
    listen_port: u16,

    #[arg(
        short = 'l',
        long,
        default_value = "127.0.0.1",
        help = "From what IP address listen for SOCKS4 requests"
    )]
    listen_ip: IpAddr,

    #[arg(
        short = 'f',
        long,
        default_value = "socks.conf",
        help = "Path to the firewall rule file. Format of a line is: <c|b> <pattern> \
            where the pattern is four dot-separated octets, each a literal or '*'. \
            The file is re-read for every decision; a missing file denies everything"
    )]
    firewall_file: PathBuf,

    #[arg(
        short = 'v',
        action = ArgAction::Count,
        help = "How verbose logging messages are. The more value is set the more messages are \
                displayed. Maximum message verbosity set at 5"
    )]
    verbosity: u8,
}

impl Into<ExecuteConfig> for Args {
    fn into(self) -> ExecuteConfig {
        ExecuteConfig::new(self.listen_ip, self.listen_port, Some(self.firewall_file))
    }
}

fn u8_to_log_level(value: u8) -> log::LevelFilter {
    match value {
        1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if args.verbosity > 0 {
        std::env::set_var(
            env_logger::DEFAULT_FILTER_ENV,
            u8_to_log_level(args.verbosity).as_str(),
        )
    }

    env_logger::init();
    if let Err(e) = run(args.into()).await {
        eprintln!("Exception: {}", e);
        std::process::exit(1);
    }
}
