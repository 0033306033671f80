//! Context block handed to the summarizer.

use std::fmt::Write;

use crate::retriever::RankedResult;

/// Render ranked results as labelled blocks, each followed by a blank line.
///
/// Scores are not rendered; the block order carries the ranking.
pub fn format_context(results: &[RankedResult]) -> String {
    let mut out = String::new();
    for RankedResult { record, .. } in results {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "Nom de l'article : {}\n\
             Fabricant : {}\n\
             Prix : {} €\n\
             Stock : {} unités\n\
             Description : {}\n\
             Délai de livraison moyen : {}\n\n",
            record.name,
            record.manufacturer,
            record.price,
            record.stock,
            record.description,
            record.average_lead_time
        );
    }
    out
}
