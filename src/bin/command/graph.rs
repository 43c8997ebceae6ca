use std::path::PathBuf;

use clap::Args;
use taxodist::taxonomy::Taxonomy;

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Specify the serialized taxonomy path.
    #[arg(short, long, value_name = "TAXONOMY_FILE")]
    taxonomy: PathBuf,
}

pub fn graph(args: GraphArgs) {
    let taxonomy = Taxonomy::import_bincode(args.taxonomy).unwrap();
    println!("synsets: {}", taxonomy.num_synsets());
    println!("nouns: {}", taxonomy.num_nouns());
    println!("hypernym edges: {}", taxonomy.num_edges());
    let root = taxonomy.root().unwrap();
    println!("root: {} ({root})", taxonomy.synset_label(root).unwrap());
}
