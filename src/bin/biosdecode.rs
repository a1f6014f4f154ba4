use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Parser;

use dmidecode::biosdecode;
use dmidecode::memory::{ByteSource, DevMem};
use dmidecode::options::DEFAULT_MEM_DEVICE;
use dmidecode::output::{Output, TextOutput};

#[derive(Parser, Debug)]
#[command(
    name = "biosdecode",
    version = dmidecode::VERSION,
    about = "Decodes the BIOS anchor structures found in low memory"
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
    let mem = DevMem::open(&cli.dev_mem)?.read(biosdecode::START_ADDRESS, biosdecode::SCAN_LENGTH)?;

    let stdout = io::stdout();
    let mut out = TextOutput::new(stdout.lock());
    out.comment(format_args!("biosdecode {}", dmidecode::VERSION));
    biosdecode::scan(&mem, biosdecode::START_ADDRESS, &mut out);
    out.finish()?;

    Ok(())
}
