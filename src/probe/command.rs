use std::{
    path::PathBuf,
    process::{Child, ChildStdout, Command as Process, Stdio},
};

use log::*;

use crate::probe::{Error, Result};

const FFPROBE_PROCESS_NAME: &str = "ffprobe";

pub trait Command
where
    Self: Sized,
{
    fn spawn(self) -> Result<Self>;
    fn stdout(&mut self) -> Result<&mut ChildStdout>;
    fn wait_success(self) -> Result<()>;
}

pub struct FFprobeCommand {
    input: PathBuf,
    process: Process,
    child: Option<Child>,
}

impl FFprobeCommand {
    pub fn new(input: PathBuf) -> Self {
        let mut process = Process::new(FFPROBE_PROCESS_NAME);
        process
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=nb_frames,avg_frame_rate,duration:format=duration",
                "-of",
                "default",
                "-i",
            ])
            .arg(&input)
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        debug!("Creating {} command {:?}", FFPROBE_PROCESS_NAME, &process);

        FFprobeCommand {
            input,
            process,
            child: None,
        }
    }
}

impl Command for FFprobeCommand {
    fn spawn(mut self) -> Result<Self> {
        self.child = Some(self.process.spawn()?);
        Ok(self)
    }

    fn stdout(&mut self) -> Result<&mut ChildStdout> {
        let stdout = self
            .child
            .as_mut()
            .ok_or_else(|| Error::CommandNotSpawned(FFPROBE_PROCESS_NAME.into()))?
            .stdout
            .as_mut()
            .ok_or_else(|| Error::NoStdout(FFPROBE_PROCESS_NAME.into()))?;

        Ok(stdout)
    }

    fn wait_success(mut self) -> Result<()> {
        let exit_status = self
            .child
            .take()
            .ok_or_else(|| Error::CommandNotSpawned(FFPROBE_PROCESS_NAME.into()))?
            .wait()?;

        if exit_status.success() {
            Ok(())
        } else {
            Err(Error::FailedToProbe(
                self.input.display().to_string(),
                exit_status,
            ))
        }
    }
}

impl Drop for FFprobeCommand {
    fn drop(&mut self) {
        // only reached with a live child when wait_success was skipped
        if let Some(mut child) = self.child.take() {
            trace!("reaping {} for {}", FFPROBE_PROCESS_NAME, self.input.display());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
