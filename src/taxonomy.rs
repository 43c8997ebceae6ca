use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use csv::ReaderBuilder;
use fixedbitset::FixedBitSet;
use log::debug;

use crate::common::{Distance, VertexId};
use crate::error::{TaxoError, TaxoResult};
use crate::graph::{CompactGraph, Digraph};
use crate::sap::Sap;

/// A validated hypernym taxonomy with noun lookup and shortest-ancestral-
/// path queries.
///
/// The synset file is headerless CSV `id,words[,gloss]` where `words` is a
/// space-separated noun list and ids are the dense line index. The
/// hypernym file is `id,h1,h2,...`, one directed edge `id -> h_k` per
/// listed hypernym; records without hypernyms are skipped. The edge graph
/// must be acyclic with exactly one root (no outgoing edges), checked
/// before any query machinery is built.
#[derive(Debug)]
pub struct Taxonomy {
    synsets: Vec<String>,
    nouns: HashMap<String, Vec<VertexId>>,
    graph: Arc<CompactGraph>,
    sap: Sap,
}

impl Taxonomy {
    pub fn from_files<P: AsRef<Path>>(synsets: P, hypernyms: P) -> TaxoResult<Self> {
        let synsets = BufReader::new(File::open(synsets)?);
        let hypernyms = BufReader::new(File::open(hypernyms)?);
        Self::from_readers(synsets, hypernyms)
    }

    pub fn from_readers<R: Read, S: Read>(synsets: R, hypernyms: S) -> TaxoResult<Self> {
        let labels = read_synsets(synsets)?;
        let graph = read_hypernyms(hypernyms, labels.len())?;
        check_acyclic(&graph)?;
        check_single_root(&graph)?;
        let compact = CompactGraph::from_digraph(&graph)?;
        debug!(
            "loaded taxonomy: {} synsets, {} edges",
            labels.len(),
            compact.num_edges()
        );
        Self::from_parts(labels, compact)
    }

    fn from_parts(synsets: Vec<String>, graph: CompactGraph) -> TaxoResult<Self> {
        if graph.num_vertices() != synsets.len() {
            let err = format!(
                "graph has {} vertices but {} synsets were given",
                graph.num_vertices(),
                synsets.len()
            );
            return Err(TaxoError::Taxonomy(err));
        }
        let mut nouns: HashMap<String, Vec<VertexId>> = HashMap::new();
        for (id, words) in synsets.iter().enumerate() {
            for word in words.split_whitespace() {
                nouns.entry(word.to_string()).or_default().push(id as VertexId);
            }
        }
        let graph = Arc::new(graph);
        let sap = Sap::new(Arc::clone(&graph));
        Ok(Self {
            synsets,
            nouns,
            graph,
            sap,
        })
    }

    pub fn num_synsets(&self) -> usize {
        self.synsets.len()
    }

    pub fn num_nouns(&self) -> usize {
        self.nouns.len()
    }

    pub fn num_edges(&self) -> usize {
        self.graph.num_edges()
    }

    pub fn nouns(&self) -> impl Iterator<Item = &str> + '_ {
        self.nouns.keys().map(String::as_str)
    }

    pub fn is_noun(&self, word: &str) -> bool {
        self.nouns.contains_key(word)
    }

    pub fn synset_label(&self, vertex: VertexId) -> Option<&str> {
        self.synsets.get(vertex as usize).map(String::as_str)
    }

    /// The unique most general synset (no outgoing hypernym edges).
    pub fn root(&self) -> Option<VertexId> {
        (0..self.graph.num_vertices() as VertexId)
            .find(|&vertex| self.graph.neighbors(vertex).is_empty())
    }

    /// Semantic distance between two nouns: the shortest ancestral path
    /// length between their synset sets.
    pub fn distance(&mut self, noun_a: &str, noun_b: &str) -> TaxoResult<Option<Distance>> {
        let a = lookup(&self.nouns, noun_a)?;
        let b = lookup(&self.nouns, noun_b)?;
        self.sap.length_of_sets(a, b)
    }

    /// Label of a synset that is a common ancestor of the two nouns on a
    /// shortest ancestral path.
    pub fn common_ancestor(&mut self, noun_a: &str, noun_b: &str) -> TaxoResult<Option<&str>> {
        let a = lookup(&self.nouns, noun_a)?;
        let b = lookup(&self.nouns, noun_b)?;
        let result = self.sap.search_sets(a, b)?;
        Ok(result.map(|ancestor| self.synsets[ancestor.vertex as usize].as_str()))
    }

    pub fn export_bincode<P: AsRef<Path>>(&self, path: P) -> TaxoResult<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, &(&self.synsets, self.graph.as_ref()))?;
        Ok(())
    }

    /// Loads a taxonomy persisted by [`export_bincode`](Self::export_bincode).
    /// Only labels and the frozen graph are stored; the noun index is
    /// rebuilt on import.
    pub fn import_bincode<P: AsRef<Path>>(path: P) -> TaxoResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let (synsets, graph): (Vec<String>, CompactGraph) = bincode::deserialize_from(reader)?;
        Self::from_parts(synsets, graph)
    }
}

fn lookup<'a>(
    nouns: &'a HashMap<String, Vec<VertexId>>,
    noun: &str,
) -> TaxoResult<&'a [VertexId]> {
    match nouns.get(noun) {
        Some(vertices) => Ok(vertices),
        None => {
            let err = format!("'{noun}' is not a taxonomy noun");
            Err(TaxoError::Taxonomy(err))
        }
    }
}

fn read_synsets<R: Read>(reader: R) -> TaxoResult<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut synsets = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let id = record
            .get(0)
            .ok_or_else(|| {
                let err = format!("expect synset id in line {line}");
                TaxoError::Taxonomy(err)
            })?
            .parse::<VertexId>()
            .map_err(|e| TaxoError::Taxonomy(e.to_string()))?;
        if id as usize != line {
            let err = format!("synset id {id} in line {line} breaks the dense numbering");
            return Err(TaxoError::Taxonomy(err));
        }
        let words = record.get(1).ok_or_else(|| {
            let err = format!("expect synset nouns in line {line}");
            TaxoError::Taxonomy(err)
        })?;
        synsets.push(words.to_string());
    }
    Ok(synsets)
}

fn read_hypernyms<R: Read>(reader: R, num_vertices: usize) -> TaxoResult<Digraph> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut graph = Digraph::new(num_vertices);
    for record in reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        let mut fields = record.iter();
        let src = parse_vertex_id(fields.next().unwrap_or_default())?;
        for field in fields {
            let dst = parse_vertex_id(field)?;
            graph.add_edge(src, dst)?;
        }
    }
    Ok(graph)
}

fn parse_vertex_id(field: &str) -> TaxoResult<VertexId> {
    field
        .parse::<VertexId>()
        .map_err(|e| TaxoError::Taxonomy(e.to_string()))
}

/// Depth-first cycle check with an explicit stack; marks live in bitsets
/// so the pass is O(V + E) with two bits per vertex.
fn check_acyclic(graph: &Digraph) -> TaxoResult<()> {
    let num_vertices = graph.num_vertices();
    let mut visited = FixedBitSet::with_capacity(num_vertices);
    let mut on_stack = FixedBitSet::with_capacity(num_vertices);
    let mut stack: Vec<(VertexId, usize)> = Vec::new();

    for start in 0..num_vertices as VertexId {
        if visited.contains(start as usize) {
            continue;
        }
        visited.insert(start as usize);
        on_stack.insert(start as usize);
        stack.push((start, 0));
        while let Some((vertex, cursor)) = stack.last_mut() {
            if let Some(&next) = graph.neighbors(*vertex).get(*cursor) {
                *cursor += 1;
                if on_stack.contains(next as usize) {
                    let err = format!("hypernym graph has a cycle through vertex {next}");
                    return Err(TaxoError::Taxonomy(err));
                }
                if !visited.contains(next as usize) {
                    visited.insert(next as usize);
                    on_stack.insert(next as usize);
                    stack.push((next, 0));
                }
            } else {
                on_stack.set(*vertex as usize, false);
                stack.pop();
            }
        }
    }
    Ok(())
}

fn check_single_root(graph: &Digraph) -> TaxoResult<()> {
    let roots = (0..graph.num_vertices() as VertexId)
        .filter(|&vertex| graph.neighbors(vertex).is_empty())
        .count();
    if roots != 1 {
        let err = format!("expected exactly one root, found {roots}");
        return Err(TaxoError::Taxonomy(err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use maplit::hashmap;

    use super::*;
    use crate::test_utils::build_sample_taxonomy;

    #[test]
    fn test_load_sample() {
        let taxonomy = build_sample_taxonomy();
        assert_eq!(taxonomy.num_synsets(), 5);
        assert_eq!(taxonomy.num_edges(), 4);
        assert!(taxonomy.is_noun("entity"));
        assert!(taxonomy.is_noun("being"));
        assert!(!taxonomy.is_noun("zebra"));
        assert_eq!(taxonomy.root(), Some(0));
        assert_eq!(taxonomy.synset_label(0), Some("entity"));
        assert!(taxonomy.nouns().count() >= taxonomy.num_synsets());
    }

    #[test]
    fn test_distances() {
        let mut taxonomy = build_sample_taxonomy();
        let expected = hashmap! {
            ("dog", "cat") => 2,
            ("dog", "dog") => 0,
            ("dog", "plant") => 3,
            ("dog", "entity") => 2,
            // "being" names both the animal and the plant synset, so the
            // nearer one wins.
            ("being", "dog") => 1,
            ("being", "plant") => 0,
        };
        for ((noun_a, noun_b), distance) in expected {
            assert_eq!(
                taxonomy.distance(noun_a, noun_b).unwrap(),
                Some(distance),
                "distance({noun_a}, {noun_b})"
            );
        }
    }

    #[test]
    fn test_common_ancestor() {
        let mut taxonomy = build_sample_taxonomy();
        assert_eq!(
            taxonomy.common_ancestor("dog", "cat").unwrap(),
            Some("animal being")
        );
        assert_eq!(
            taxonomy.common_ancestor("dog", "plant").unwrap(),
            Some("entity")
        );
    }

    #[test]
    fn test_unknown_noun() {
        let mut taxonomy = build_sample_taxonomy();
        assert!(matches!(
            taxonomy.distance("dog", "zebra"),
            Err(TaxoError::Taxonomy(_))
        ));
        assert!(!taxonomy.is_noun("zebra"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let synsets = "0,a\n1,b\n2,c\n";
        let hypernyms = "0\n1,2\n2,1\n";
        let result = Taxonomy::from_readers(synsets.as_bytes(), hypernyms.as_bytes());
        assert!(matches!(result, Err(TaxoError::Taxonomy(_))));
    }

    #[test]
    fn test_two_roots_are_rejected() {
        let synsets = "0,a\n1,b\n2,c\n";
        let hypernyms = "1,0\n";
        let result = Taxonomy::from_readers(synsets.as_bytes(), hypernyms.as_bytes());
        assert!(matches!(result, Err(TaxoError::Taxonomy(_))));
    }

    #[test]
    fn test_non_dense_ids_are_rejected() {
        let synsets = "0,a\n2,b\n";
        let hypernyms = "1,0\n";
        let result = Taxonomy::from_readers(synsets.as_bytes(), hypernyms.as_bytes());
        assert!(matches!(result, Err(TaxoError::Taxonomy(_))));
    }

    #[test]
    fn test_hypernym_edge_out_of_range() {
        let synsets = "0,a\n1,b\n";
        let hypernyms = "1,0\n1,7\n";
        let result = Taxonomy::from_readers(synsets.as_bytes(), hypernyms.as_bytes());
        assert!(matches!(result, Err(TaxoError::Graph(_))));
    }

    #[test]
    fn test_bincode_roundtrip() {
        let taxonomy = build_sample_taxonomy();
        let path =
            std::env::temp_dir().join(format!("taxodist_roundtrip_{}.bin", std::process::id()));
        taxonomy.export_bincode(&path).unwrap();
        let mut restored = Taxonomy::import_bincode(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(restored.num_synsets(), taxonomy.num_synsets());
        assert_eq!(restored.num_edges(), taxonomy.num_edges());
        assert!(restored.is_noun("dog"));
        assert_eq!(restored.distance("dog", "cat").unwrap(), Some(2));
        assert_eq!(
            restored.common_ancestor("dog", "cat").unwrap(),
            Some("animal being")
        );
    }
}
