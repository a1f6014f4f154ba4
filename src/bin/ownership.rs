use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Parser;

use dmidecode::memory::{ByteSource, DevMem};
use dmidecode::options::DEFAULT_MEM_DEVICE;
use dmidecode::output::{Output, TextOutput};
use dmidecode::ownership;

#[derive(Parser, Debug)]
#[command(
    name = "ownership",
    version = dmidecode::VERSION,
    about = "Prints the Compaq ownership tag"
)]
struct Cli {
    #[arg(
        short = 'd',
        long = "dev-mem",
        value_name = "FILE",
        default_value = DEFAULT_MEM_DEVICE,
        help = "Read memory from device FILE"
    )]
    dev_mem: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut dev = DevMem::open(&cli.dev_mem)?;
    let mem = dev.read(ownership::START_ADDRESS, ownership::SCAN_LENGTH)?;

    let stdout = io::stdout();
    let mut out = TextOutput::new(stdout.lock());
    if let Some(tag) = ownership::find(&mem, &mut dev)? {
        out.info(format_args!("{}", tag));
    }
    out.finish()?;

    Ok(())
}
