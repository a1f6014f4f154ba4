use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use dmidecode::memory::{ByteSource, DevMem};
use dmidecode::options::DEFAULT_MEM_DEVICE;
use dmidecode::output::{Output, TextOutput};
use dmidecode::vpd;

#[derive(Parser, Debug)]
#[command(
    name = "vpddecode",
    version = dmidecode::VERSION,
    about = "Decodes the IBM/Lenovo Vital Product Data record"
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
    #[arg(
        short = 'u',
        long = "dump",
        action = ArgAction::SetTrue,
        help = "Do not decode the VPD records"
    )]
    dump: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mem = DevMem::open(&cli.dev_mem)?.read(vpd::START_ADDRESS, vpd::SCAN_LENGTH)?;

    let stdout = io::stdout();
    let mut out = TextOutput::new(stdout.lock());
    out.comment(format_args!("vpddecode {}", dmidecode::VERSION));
    if vpd::scan(&mem, vpd::START_ADDRESS, cli.dump, &mut out) == 0 {
        out.comment(format_args!("No VPD structure found, sorry."));
    }
    out.finish()?;

    Ok(())
}
