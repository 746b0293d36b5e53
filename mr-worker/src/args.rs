use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Name of the MapReduce application to run (e.g. `wc`).
    #[arg(short, long)]
    pub workload: String,

    /// Host name or IP address of the coordinator server.
    #[arg(short = 'c', long, default_value = "[::1]")]
    pub address: String,

    /// Port of the coordinator server.
    #[arg(short, long, default_value = "8030")]
    pub port: u16,
}
