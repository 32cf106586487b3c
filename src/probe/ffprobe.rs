use std::path::Path;

use log::*;

use crate::probe::command::{Command as _, FFprobeCommand};
use crate::probe::parser::{CommandStreamParser as _, StreamInfoParser};
use crate::probe::{Probe, Result};

/// Duration probe backed by the `ffprobe` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FFprobe;

impl Probe for FFprobe {
    fn duration_seconds(&self, path: &Path) -> Result<f64> {
        let mut cmd = FFprobeCommand::new(path.into()).spawn()?;
        let info = StreamInfoParser::new(cmd.stdout()?).parse();
        cmd.wait_success()?;

        let info = info?;
        debug!("{} stream info {:?}", path.display(), info);
        info.duration_seconds()
    }
}
