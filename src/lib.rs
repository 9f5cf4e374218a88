pub mod error;
pub mod export;
pub mod extract;
mod info;
pub mod playlist;
pub mod rip;
pub mod session;
pub mod settings;
pub mod text;
pub mod types;
pub mod util;

use error::Error;
use export::Exporter;
use session::ChromeSession;
use settings::Settings;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_SETTINGS: &str = "config.ini";

#[derive(Debug, PartialEq)]
pub struct Config {
    pub settings_path: PathBuf,
    pub verbose: bool,
    pub help: bool,
    /// Read a missing password from the terminal without echo instead of
    /// from the input reader.
    pub hide_password: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            settings_path: PathBuf::from(DEFAULT_SETTINGS),
            verbose: false,
            help: false,
            hide_password: false,
        }
    }
}

impl Config {
    /// Parse `tabripper [-v] [-h] [CONFIG]`.
    ///
    /// # Errors
    /// - If an option is not recognized
    /// - If more than one settings file is given
    pub fn build(mut args: impl Iterator<Item = String>) -> types::ConfigResult {
        args.next(); // Consume program name

        let mut config = Config::default();
        let mut settings_path: Option<PathBuf> = None;

        for arg in args {
            match arg.as_str() {
                "-h" | "--help" => config.help = true,
                "-v" | "--verbose" => config.verbose = true,
                _ if arg.starts_with('-') => {
                    return Err(Error::Usage(format!(
                        "Unrecognized option '{}'. See '--help'",
                        arg
                    )))
                }
                _ if settings_path.is_some() => {
                    return Err(Error::Usage(format!(
                        "Only one config file may be given, found '{}'. See '--help'",
                        arg
                    )))
                }
                _ => settings_path = Some(PathBuf::from(arg)),
            }
        }

        if let Some(path) = settings_path {
            config.settings_path = path;
        }

        Ok(config)
    }
}

/// Load the settings, ask for missing credentials, then rip the playlist
/// with a fresh Chrome session. Nothing touches the network before the
/// settings are valid.
pub fn run<R: BufRead>(config: Config, reader: R) -> types::UnitResult {
    if config.help {
        info::help();
        return Ok(());
    }

    let settings = Settings::load(&config.settings_path)?;
    info!(
        "Saving tabs as {} to {}",
        settings.format.extension().to_uppercase(),
        settings.download_dir.display()
    );

    let credentials = util::credentials(&settings.credentials, reader, config.hide_password)?;

    let mut session = ChromeSession::launch(&settings.browser, &settings.login_url)?;
    let mut exporter = Exporter::new(settings.format.clone(), settings.download_dir.clone());
    let report = rip::rip(&settings, &credentials, &mut session, &mut exporter)?;

    report.log();
    if report.total() > 0 {
        print!("{}", report.table()?);
    }

    Ok(())
}
