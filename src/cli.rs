// Command line: `panview [IMAGE]`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

use crate::error::Error;

/// Pan/zoom viewer for large images with a Fourier region of interest.
#[derive(Parser, Debug)]
#[command(name = "panview", version)]
pub struct CliArgs {
    /// Image to view. `-` reads it from standard input.
    #[arg(default_value = "-")]
    pub image: PathBuf,
}

/// Parse the process arguments. Help and version requests print and exit 0.
pub fn parse() -> Result<CliArgs, Error> {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> Result<CliArgs, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => Error::Usage(e.render().to_string()),
    })
}
