pub mod console;
pub mod silent;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::ReporterBox;
use crate::domain::models::ReporterName;

pub struct ReporterManager {}

impl ReporterManager {
    pub fn get(name: ReporterName) -> Result<ReporterBox> {
        if name == ReporterName::Console {
            return Ok(Box::<console::ConsoleReporter>::default());
        }

        if name == ReporterName::Silent {
            return Ok(Box::<silent::SilentReporter>::default());
        }

        bail!(format!("No reporter implemented for {name}"))
    }
}
