use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use clap::Parser;

use crate::codec::DEFAULT_MAX_MESSAGE_SIZE;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Debug, Clone)]
#[command(name = "boutique", version, about = "Boutique inventory and order server")]
pub struct Config {
    /// The address to bind to
    #[arg(long, env = "BOUTIQUE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// The port to listen on
    #[arg(short, long, env = "BOUTIQUE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding the record files and the images folder
    #[arg(short, long, env = "BOUTIQUE_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Largest message accepted in a single read, in bytes
    #[arg(long, env = "BOUTIQUE_MAX_MESSAGE_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,
}
