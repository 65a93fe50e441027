use clap::Parser;
use pptx_cascade::{Baseline, CascadeResolver, Deck, DeckModel};
use std::path::PathBuf;

/// Prints the effective formatting of every text run in a slide deck.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input directory containing the Office Open XML package obtained by unzipping a `.pptx` file.
    #[arg(short, long)]
    input: PathBuf,
    /// Only list the runs of this slide (1-based).
    #[arg(short, long)]
    slide: Option<usize>,
    /// Typeface of runs no source sets one for.
    #[arg(long, default_value = "Calibri")]
    default_typeface: String,
    /// Size, in hundredths of a point, of runs no source sets one for.
    #[arg(long, default_value_t = 1800)]
    default_size: u32,
    /// Stop at the first run that cannot be resolved instead of listing the rest.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), pptx_cascade::Error> {
    pretty_env_logger::init();

    log::info!("Entered 'main'");

    let args = Args::parse();
    log::debug!("Input directory is {:?}", args.input);

    let deck = Deck::open(&args.input)?;
    let resolver = CascadeResolver::with_baseline(
        &deck,
        Baseline {
            typeface: args.default_typeface,
            size: args.default_size,
            ..Default::default()
        },
    );

    let mut faults = 0;
    for (number, slide) in deck.slides().iter().enumerate() {
        let number = number + 1;
        if args.slide.is_some_and(|wanted| wanted != number) {
            continue;
        }
        println!("slide {number} ({})", slide.name);
        for &shape in &slide.shapes {
            let name = &deck.shape(shape).name;
            for &paragraph in deck.paragraphs(shape) {
                let level = deck.paragraph_level(paragraph).get();
                for &run in deck.runs(paragraph) {
                    let text = deck.run_text(run);
                    match resolver.resolve(run) {
                        Ok(style) => println!("  {name} L{level} {text:?}: {style}"),
                        Err(e) if args.strict => return Err(e.into()),
                        Err(e) => {
                            faults += 1;
                            log::error!("{e}");
                            println!("  {name} L{level} {text:?}: <{e}>");
                        }
                    }
                }
            }
        }
    }
    if faults > 0 {
        log::warn!("{faults} runs could not be resolved");
    }

    log::info!("Exiting 'main'");

    Ok(())
}
