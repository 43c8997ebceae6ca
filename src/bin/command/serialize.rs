use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use taxodist::taxonomy::Taxonomy;

#[derive(Debug, Args)]
pub struct SerializeArgs {
    /// Specify the synset CSV file.
    #[arg(short, long, value_name = "SYNSETS_CSV")]
    synsets: PathBuf,
    /// Specify the hypernym CSV file.
    #[arg(short = 'y', long, value_name = "HYPERNYMS_CSV")]
    hypernyms: PathBuf,
    /// Specify the output file.
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: PathBuf,
}

pub fn serialize(args: SerializeArgs) {
    println!("{:#?}", args);
    let start = Instant::now();
    let taxonomy = Taxonomy::from_files(&args.synsets, &args.hypernyms).unwrap();
    let time = start.elapsed().as_secs_f64();
    println!("taxonomy building time: {time} s");

    let start = Instant::now();
    taxonomy.export_bincode(args.output).unwrap();
    let time = start.elapsed().as_secs_f64();
    println!("serializing time: {time} s");
}
