mod command;

use clap::Parser;
use mimalloc::MiMalloc;

use crate::command::*;

#[global_allocator]
static ALLOC: MiMalloc = MiMalloc;

/// Semantic distance queries over a hypernym taxonomy.
#[derive(Parser)]
#[command(version, about)]
#[command(propagate_version = true)]
enum Command {
    /// Load the synset/hypernym CSV dataset and serialize it into a (bincode) taxonomy file.
    Serialize(SerializeArgs),
    /// Print the distance and common ancestor of two nouns.
    Query(QueryArgs),
    /// Find the least related noun among the given nouns.
    Outcast(OutcastArgs),
    /// Print the statistics of a taxonomy.
    Graph(GraphArgs),
}

fn main() {
    env_logger::init();
    let command = Command::parse();
    match command {
        Command::Serialize(args) => serialize(args),
        Command::Query(args) => query(args),
        Command::Outcast(args) => outcast(args),
        Command::Graph(args) => graph(args),
    }
}
