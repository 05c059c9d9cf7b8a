use std::cmp::Ordering;

use ahash::HashSet;
use eyre::{ensure, Result};

use super::gene::Gene;
use super::index::Annotation;
use super::transcript::Transcript;

/// Select at most one reference transcript per gene for the start/stop codon meta-analysis.
///
/// Mitochondrial genes are skipped. Principal isoforms are preferred: a single principal
/// isoform is taken as is, otherwise the longest one with annotated codons wins. Genes without
/// principal isoforms fall back to the best annotation level present among their transcripts,
/// where a missing level ranks first: if any transcript lacks a level, only such transcripts
/// are eligible.
///
/// Equal-length candidates resolve to the first one in the gene's transcript order.
///
/// Fails if no gene contributes a transcript: nothing could anchor the meta-analysis.
pub fn select_transcripts(annotation: &Annotation) -> Result<HashSet<String>> {
    let selected: HashSet<String> = annotation
        .genes()
        .filter(|gene| !gene.is_mitochondrial())
        .filter_map(|gene| select_for_gene(annotation, gene))
        .map(|transcript| transcript.id().clone())
        .collect();

    ensure!(
        !selected.is_empty(),
        "Oops, no start codons and stop codons are found in the annotation.\n\
         If start and stop codons are not annotated in the GTF file, please skip this step \
         and create a config file to specify the P-site based on other evidence."
    );
    log::info!(
        "Selected {} reference transcripts for the meta-analysis",
        selected.len()
    );
    Ok(selected)
}

/// Reference transcript for a single gene, if any.
pub fn select_for_gene<'a>(
    annotation: &'a Annotation,
    gene: &'a Gene,
) -> Option<&'a Transcript> {
    let resolve = |ids: &'a [String]| {
        ids.iter()
            .filter_map(move |id| annotation.transcript(id))
    };

    match gene.principal().as_slice() {
        [] => {
            let transcripts: Vec<&Transcript> = resolve(gene.transcripts().as_slice()).collect();
            // A missing level ranks before any annotated one
            let best = if transcripts.iter().any(|x| x.level().is_none()) {
                None
            } else {
                transcripts
                    .iter()
                    .copied()
                    .filter_map(|x| x.level().as_deref())
                    .min_by(|a, b| compare_levels(a, b))
            };

            longest_with_codons(transcripts.into_iter().filter(|x| {
                match (x.level().as_deref(), best) {
                    (None, _) => true,
                    (Some(level), Some(best)) => compare_levels(level, best) == Ordering::Equal,
                    (Some(_), None) => false,
                }
            }))
        }
        [single] => annotation
            .transcript(single)
            .filter(|transcript| transcript.has_codons()),
        principal => longest_with_codons(resolve(principal)),
    }
}

/// Annotation levels are compared numerically when both parse as integers, e.g. GENCODE levels,
/// and lexicographically otherwise.
fn compare_levels(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn longest_with_codons<'a>(
    transcripts: impl Iterator<Item = &'a Transcript>,
) -> Option<&'a Transcript> {
    transcripts
        .filter(|x| x.has_codons())
        .fold(None, |best: Option<&Transcript>, x| match best {
            Some(best) if best.length() >= x.length() => Some(best),
            _ => Some(x),
        })
}
