use crate::common::Distance;
use crate::error::{TaxoError, TaxoResult};
use crate::taxonomy::Taxonomy;

/// Outcast query: among a list of nouns, the one with the largest summed
/// semantic distance to all the others, i.e. the least related term.
#[derive(Debug)]
pub struct Outcast<'a> {
    taxonomy: &'a mut Taxonomy,
}

impl<'a> Outcast<'a> {
    pub fn new(taxonomy: &'a mut Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Returns the outcast among `nouns`. The first maximum wins ties, so
    /// the result is deterministic for a fixed input order.
    pub fn outcast(&mut self, nouns: &[&str]) -> TaxoResult<String> {
        if nouns.len() < 2 {
            let err = format!("outcast needs at least two nouns, got {}", nouns.len());
            return Err(TaxoError::Query(err));
        }

        let mut best_index = 0;
        let mut best_total: Option<Distance> = None;
        for (i, &noun) in nouns.iter().enumerate() {
            let mut total = 0;
            for (j, &other) in nouns.iter().enumerate() {
                if i == j {
                    continue;
                }
                let distance = self.taxonomy.distance(noun, other)?.ok_or_else(|| {
                    let err = format!("no ancestral path between '{noun}' and '{other}'");
                    TaxoError::Query(err)
                })?;
                total += distance;
            }
            if best_total.map_or(true, |max| total > max) {
                best_index = i;
                best_total = Some(total);
            }
        }
        Ok(nouns[best_index].to_string())
    }
}
