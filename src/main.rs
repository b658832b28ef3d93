use std::path::PathBuf;

use clap::Parser;
use schedr::{
    image_source::DefaultImageLoader, Client, ContextError, RenderStyle, Renderer, Schedule,
};

#[derive(Parser, Debug)]
#[command(version, about = "Prints a workout schedule to PDF", long_about = None)]
struct CliArguments {
    #[arg(short = 's', long = "schedule", value_name = "json_file")]
    schedule_path: PathBuf,
    #[arg(short = 'c', long = "client", value_name = "json_file")]
    client_path: Option<PathBuf>,
    /// Data URI, path or URL of the logo printed in the header
    #[arg(short = 'l', long = "logo", value_name = "image")]
    logo: Option<String>,
    /// JSON file overriding the default style
    #[arg(long = "style", value_name = "json_file")]
    style_path: Option<PathBuf>,
    /// File or directory the PDF is written to
    #[arg(short = 'o', long = "output", value_name = "path", default_value = ".")]
    output_path: PathBuf,
    /// Print the PDF as base64 instead of writing it
    #[arg(long = "base64")]
    base64: bool,
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ContextError> {
    let arguments = CliArguments::parse();
    env_logger::builder()
        .filter_level(if arguments.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        })
        .init();
    log::debug!("{:?}", arguments);

    let schedule = Schedule::from_path(&arguments.schedule_path)?;
    let client = match &arguments.client_path {
        Some(client_path) => Client::from_path(client_path)?,
        None => Client::default(),
    };
    let style = match &arguments.style_path {
        Some(style_path) => RenderStyle::from_path(style_path)?,
        None => RenderStyle::default(),
    };

    // Relative image paths are resolved next to the schedule
    let loader = match arguments.schedule_path.parent() {
        Some(schedule_directory) => DefaultImageLoader::with_base_directory(schedule_directory),
        None => DefaultImageLoader::default(),
    };
    let renderer = Renderer::with_loader(style, Box::new(loader));
    let rendered_schedule = renderer.render(&schedule, &client, arguments.logo.as_deref())?;
    log::info!(
        "Rendered {} on {} pages",
        rendered_schedule.file_name(),
        rendered_schedule.page_count()
    );

    if arguments.base64 {
        println!("{}", rendered_schedule.to_base64());
    } else {
        rendered_schedule.save_to_file(&arguments.output_path)?;
    }

    Ok(())
}
