use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// File that contains the paths of the input files, one per line.
    /// Each input file becomes one map task.
    #[arg(short = 'f', long)]
    pub input_list: String,

    /// Number of reduce tasks.
    #[arg(short, long)]
    pub reduce_count: u32,

    /// The port for the server to run on.
    #[arg(short, long, default_value = "8030")]
    pub port: u16,
}
