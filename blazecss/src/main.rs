use blazecss_lib::{merge_css, BlazeCssError, MergeOptions, TargetQuery};
use clap::Parser;
use log::info;
use std::fs;

const BLAZECSS_INTRO: &str = r#"
        ____  __                 ________________
       / __ )/ /___ _____  ___  / ____/ ___/ ___/
      / __  / / __ `/_  / / _ \/ /    \__ \\__ \ 
     / /_/ / / /_/ / / /_/  __/ /___ ___/ /__/ / 
    /_____/_/\__,_/ /___/\___/\____//____/____/  

    Welcome to BlazeCSS - The Rust-Powered CSS Rule Merger!
"#;

#[derive(Parser)]
#[command(name = "BlazeCSS")]
#[command(about = "Merge adjacent CSS rules without changing what the page looks like")]
struct Args {
    /// Input stylesheet.
    input: String,

    /// Output file name. Defaults to stdout.
    #[arg(short, long)]
    output: Option<String>,

    /// Browserslist query; may be repeated. Defaults to "defaults".
    #[arg(short, long = "target")]
    targets: Vec<String>,

    /// Assume only the oldest engines (overrides --target).
    #[arg(long)]
    legacy: bool,

    /// Validate the input with lightningcss before merging.
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn merge_options(&self) -> MergeOptions {
        let targets = if self.legacy {
            TargetQuery::Legacy
        } else if self.targets.is_empty() {
            TargetQuery::default()
        } else {
            TargetQuery::Browserslist(self.targets.clone())
        };
        MergeOptions {
            targets,
            validate: self.strict,
        }
    }
}

fn run(args: &Args) -> Result<(), BlazeCssError> {
    let css_content = fs::read_to_string(&args.input)?;
    info!("read {} bytes from {}", css_content.len(), args.input);

    let merged = merge_css(&css_content, &args.merge_options())?;
    match &args.output {
        Some(path) => {
            fs::write(path, merged)?;
            info!("wrote {}", path);
        }
        None => print!("{}", merged),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    // parse the args given in terminal
    let args: Args = Args::parse();
    if args.output.is_some() {
        eprintln!("{}", BLAZECSS_INTRO);
    }

    if let Err(e) = run(&args) {
        eprintln!("Error processing {}: {}", args.input, e);
        std::process::exit(1);
    }
}
