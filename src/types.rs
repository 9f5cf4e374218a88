use crate::error::{ConfigError, Error};
use crate::settings::Settings;
use crate::Config;

pub type ConfigResult = Result<Config, Error>;
pub type SettingsResult = Result<Settings, ConfigError>;
pub type UnitResult = Result<(), Error>;
