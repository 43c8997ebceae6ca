use std::path::PathBuf;

use clap::Args;
use taxodist::taxonomy::Taxonomy;

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Specify the serialized taxonomy path.
    #[arg(short, long, value_name = "TAXONOMY_FILE")]
    taxonomy: PathBuf,
    /// The two nouns to relate.
    #[arg(num_args = 2, value_name = "NOUN")]
    nouns: Vec<String>,
}

pub fn query(args: QueryArgs) {
    let mut taxonomy = Taxonomy::import_bincode(args.taxonomy).unwrap();
    let noun_a = &args.nouns[0];
    let noun_b = &args.nouns[1];
    let length = taxonomy.distance(noun_a, noun_b).unwrap();
    let ancestor = taxonomy.common_ancestor(noun_a, noun_b).unwrap();
    match (length, ancestor) {
        (Some(length), Some(ancestor)) => {
            println!("length = {length}, ancestor = {ancestor}")
        }
        _ => println!("'{noun_a}' and '{noun_b}' have no common ancestor"),
    }
}
