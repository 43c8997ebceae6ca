use std::path::PathBuf;

use clap::Args;
use taxodist::outcast::Outcast;
use taxodist::taxonomy::Taxonomy;

#[derive(Debug, Args)]
pub struct OutcastArgs {
    /// Specify the serialized taxonomy path.
    #[arg(short, long, value_name = "TAXONOMY_FILE")]
    taxonomy: PathBuf,
    /// Nouns to score (at least two).
    #[arg(num_args = 2.., value_name = "NOUN")]
    nouns: Vec<String>,
}

pub fn outcast(args: OutcastArgs) {
    let mut taxonomy = Taxonomy::import_bincode(args.taxonomy).unwrap();
    let nouns: Vec<&str> = args.nouns.iter().map(String::as_str).collect();
    let mut outcast = Outcast::new(&mut taxonomy);
    let result = outcast.outcast(&nouns).unwrap();
    println!("outcast: {result}");
}
