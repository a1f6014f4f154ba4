use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use dmidecode::options::{self, Options, StringQuery, TypeFilter, DEFAULT_MEM_DEVICE};
use dmidecode::output::TextOutput;

const LONG_ABOUT: &str = "Dumps the computer's DMI (SMBIOS) table contents in a human-readable format.

TYPE may be a comma or space separated list of structure type numbers, or one
of the keywords bios, system, baseboard, chassis, processor, memory, cache,
connector and slot. KEYWORD is one of the string keywords such as
system-manufacturer or processor-version; an unknown keyword lists them all.";

#[derive(Parser, Debug)]
#[command(
    name = "dmidecode",
    version = dmidecode::VERSION,
    about = "Decodes SMBIOS/DMI tables",
    long_about = LONG_ABOUT
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
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        help = "Less verbose output"
    )]
    quiet: bool,
    #[arg(
        short = 's',
        long = "string",
        value_name = "KEYWORD",
        conflicts_with_all = ["oem_string", "types", "handle", "dump", "dump_bin"],
        help = "Only display the value of the given DMI string"
    )]
    string: Option<String>,
    #[arg(
        long = "oem-string",
        value_name = "N",
        conflicts_with_all = ["types", "handle", "dump", "dump_bin"],
        help = "Only display the value of the given OEM string, or their count"
    )]
    oem_string: Option<String>,
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        action = ArgAction::Append,
        conflicts_with = "handle",
        help = "Only display the entries of given type(s)"
    )]
    types: Vec<String>,
    #[arg(
        short = 'H',
        long = "handle",
        value_name = "HANDLE",
        help = "Only display the entry of given handle"
    )]
    handle: Option<String>,
    #[arg(
        short = 'u',
        long = "dump",
        action = ArgAction::SetTrue,
        help = "Do not decode the entries"
    )]
    dump: bool,
    #[arg(
        long = "dump-bin",
        value_name = "FILE",
        conflicts_with_all = ["types", "handle", "dump", "from_dump"],
        help = "Dump the DMI data to a binary file"
    )]
    dump_bin: Option<PathBuf>,
    #[arg(
        long = "from-dump",
        value_name = "FILE",
        help = "Read the DMI data from a binary file"
    )]
    from_dump: Option<PathBuf>,
    #[arg(
        long = "no-sysfs",
        action = ArgAction::SetTrue,
        help = "Do not attempt to read DMI data from sysfs files"
    )]
    no_sysfs: bool,
}

impl Cli {
    fn options(self) -> dmidecode::Result<Options> {
        let types = if self.types.is_empty() {
            None
        } else {
            let mut filter = TypeFilter::new();
            for arg in &self.types {
                filter.parse(arg)?;
            }
            Some(filter)
        };

        let handle = match self.handle {
            Some(ref arg) => Some(
                options::parse_number(arg)
                    .filter(|&n| n <= 0xffff)
                    .map(|n| n as u16)
                    .ok_or_else(|| {
                        dmidecode::Error::Internal(dmidecode::ErrorKind::InvalidOption(format!(
                            "invalid handle number: {}",
                            arg
                        )))
                    })?,
            ),
            None => None,
        };

        let string = match (self.string, self.oem_string) {
            (Some(ref keyword), _) => Some(StringQuery::keyword(keyword)?),
            (None, Some(ref n)) => Some(StringQuery::parse_oem(n)?),
            (None, None) => None,
        };

        Ok(Options {
            devmem: self.dev_mem,
            quiet: self.quiet,
            dump: self.dump,
            types,
            handle,
            string,
            no_sysfs: self.no_sysfs,
            from_dump: self.from_dump,
            dump_bin: self.dump_bin,
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opts = Cli::parse().options()?;

    let stdout = io::stdout();
    let mut out = TextOutput::new(stdout.lock());
    dmidecode::run(&opts, &mut out)?;
    out.finish()?;

    Ok(())
}
