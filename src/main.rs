use std::env;
use std::path::PathBuf;

use structopt::StructOpt;

mod config;
mod link;
mod media;
mod plan;
mod probe;
mod processor;
mod progress;
mod subtitles;
mod summary;

use crate::config::{Config, Extension, LinkPolicy, Threshold};
use crate::probe::FFprobe;
use crate::processor::Processor;
use crate::progress::{ConsoleProgressBarReporter, JsonProgressReporter, Reporter};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "runtime-groups",
    about = "Groups video files and their subtitles by runtime."
)]
struct Opt {
    /// Input directory containing video files.
    #[structopt(parse(from_os_str))]
    input_dir: PathBuf,

    /// Output directory to store video groups, relative to the input directory unless absolute.
    #[structopt(
        short,
        long = "output_dir",
        parse(from_os_str),
        default_value = "groups/"
    )]
    output_dir: PathBuf,

    /// Target duration for each video group in minutes.
    #[structopt(
        short = "d",
        long = "group_duration_minutes",
        default_value = "60",
        allow_hyphen_values = true
    )]
    group_duration_minutes: i64,

    /// File extension for video files.
    #[structopt(short = "v", long = "video_extension", default_value = ".mp4")]
    video_extension: String,

    /// File extension for subtitle files. Every file starting with the name of a video and
    /// ending with this extension is linked next to it. Without it no subtitles are processed.
    #[structopt(short = "s", long = "subtitle_extension")]
    subtitle_extension: Option<String>,

    /// What to do with link destinations that already exist.
    #[structopt(long, default_value = "abort", possible_values = &LinkPolicy::variants())]
    on_existing: LinkPolicy,

    /// Leave out videos whose duration cannot be read instead of aborting.
    #[structopt(long)]
    skip_unreadable: bool,

    /// Print the grouping without creating any links.
    #[structopt(long)]
    dry_run: bool,

    /// Print progress and the summary as JSON.
    #[structopt(long)]
    json: bool,

    #[structopt(short, long)]
    threads: Option<usize>,
}

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + 'static>>;

impl Opt {
    fn config(&self) -> Result<Config> {
        let threshold = Threshold::from_minutes(self.group_duration_minutes)?;
        let video_extension = self.video_extension.parse::<Extension>()?;
        let subtitle_extension = self
            .subtitle_extension
            .as_deref()
            .map(str::parse::<Extension>)
            .transpose()?;

        let input_dir = env::current_dir()?.join(&self.input_dir);
        let config = Config::new(
            &input_dir,
            &self.output_dir,
            threshold,
            video_extension,
            subtitle_extension,
        )?
        .with_link_policy(self.on_existing)
        .with_skip_unreadable(self.skip_unreadable)
        .with_dry_run(self.dry_run);

        Ok(config)
    }
}

fn run<R: Reporter>(config: Config, json: bool) -> Result<()> {
    let summary = Processor::new(config, FFprobe)
        .with_reporter(R::new())
        .process()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary);
        println!("Process finished.");
        println!("{}", summary.total_line());
    }

    Ok(())
}

fn main() -> Result<()> {
    color_backtrace::install();
    env_logger::init();

    let opt = Opt::from_args();

    if let Some(threads) = opt.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let config = opt.config()?;

    if opt.json {
        run::<JsonProgressReporter>(config, true)
    } else {
        println!("Starting video grouping with the following parameters:");
        println!("{}\n", config);
        run::<ConsoleProgressBarReporter>(config, false)
    }
}
