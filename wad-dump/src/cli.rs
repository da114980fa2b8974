use argh::FromArgs;
use wad::ArchiveOptions;

/// Inspect the directory and BSP lumps of a WAD
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// map marker to decode the nodes of, such as E1M1 or MAP01
    #[argh(option)]
    pub map: Option<String>,
    /// header and directory are big endian (Jaguar)
    #[argh(switch)]
    pub big_endian: bool,
    /// list every directory entry
    #[argh(switch)]
    pub list: bool,
    /// path to a patch WAD, repeatable, later ones override earlier
    #[argh(option)]
    pub pwad: Vec<String>,
    /// path to the IWAD
    #[argh(positional)]
    pub wad: String,
}

impl From<&CLIOptions> for ArchiveOptions {
    fn from(o: &CLIOptions) -> Self {
        ArchiveOptions {
            big_endian: o.big_endian,
        }
    }
}
