use std::{net::SocketAddr, path::PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sitehooks",
    about = "Receive deployment webhooks and serve the GIPHY widget"
)]
pub struct Args {
    /// The listen address and port
    ///
    /// The port and address where the server should listen for requests
    #[structopt(short, long)]
    pub address: Option<SocketAddr>,

    /// The configuration file location
    ///
    /// Where the configuration file should be loaded from. The environment
    /// variable SITEHOOKS_CONFIG can also be used.
    #[structopt(
        short,
        long,
        env = "SITEHOOKS_CONFIG",
        default_value = "sitehooks.toml"
    )]
    pub config: PathBuf,

    /// The minimum level to log at
    ///
    /// The minimum log level specification, supports the rust log format. The
    /// environment variable RUST_LOG can also be used.
    #[structopt(short, long, env = "RUST_LOG")]
    pub log_level: Option<String>,
}
