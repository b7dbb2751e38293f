use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use log::LevelFilter;

use crate::buf::INITIAL_CAPACITY;
use crate::frame::FrameConfig;

#[derive(Parser, Debug)]
#[command(name = "psictl")]
#[command(about = "PSI Encoder & Decoder")]
#[command(author, version, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["decode", "encode"])))]
pub struct Cli {
    /// Decode a PSI container back to its original data
    #[arg(short, long)]
    pub decode: bool,

    /// Encode data into a PSI container
    #[arg(short, long)]
    pub encode: bool,

    /// Input file, reads from stdin if not given
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file, writes to stdout if not given
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// More logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Starting size of the input buffer
    #[arg(long, value_name = "BYTES", default_value_t = INITIAL_CAPACITY)]
    pub read_capacity: usize,

    /// Largest output buffer an encode or decode may grow to
    #[arg(long, value_name = "BYTES", default_value_t = u32::MAX as usize)]
    pub max_output: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        // The arg group guarantees exactly one is set
        if self.decode {
            Mode::Decode
        } else {
            Mode::Encode
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            read_capacity: self.read_capacity,
            max_output: self.max_output,
            ..FrameConfig::default()
        }
    }
}
