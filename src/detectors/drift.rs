//! Cross-file documentation drift detection.
//!
//! Comments are bucketed by the structural hash of the code line they
//! document. Inside a bucket, two code sites count as near-duplicates only
//! when both that line and the enclosing block have near-identical token
//! sequences; their comments are then aligned and compared, and pairs that
//! say different things are reported as drift.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::core::config::DriftConfig;
use crate::core::dictionary::Dictionary;
use crate::core::model::{AnalysisWarning, ClassifiedComment, DriftFinding, DriftKind};
use crate::core::text::{
    code_shape, jaccard, normalized_code_tokens, prose_words, sequence_similarity,
    strip_comment_delimiters,
};

/// Output of a drift pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Findings ordered by span A, then span B
    pub findings: Vec<DriftFinding>,
    /// Truncation warnings
    pub warnings: Vec<AnalysisWarning>,
}

impl DriftReport {
    /// Whether any bucket was truncated.
    pub fn truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, AnalysisWarning::DriftDetectionTruncated { .. }))
    }
}

/// Precomputed comparison data for one comment.
#[derive(Debug)]
struct Candidate {
    code_tokens: Vec<String>,
    context_tokens: Vec<String>,
    words: HashSet<String>,
}

/// Detects divergent comments on structurally similar code.
#[derive(Debug, Clone)]
pub struct DriftDetector {
    config: DriftConfig,
    dictionary: Dictionary,
}

impl DriftDetector {
    pub fn new(config: DriftConfig, dictionary: Dictionary) -> Self {
        Self { config, dictionary }
    }

    /// Compare every comment against comments on similar code elsewhere.
    ///
    /// `comments` is the snapshot of all files; the result does not depend
    /// on anything else.
    pub fn find_drift(&self, comments: &[ClassifiedComment]) -> DriftReport {
        let mut report = DriftReport::default();
        if !self.config.enabled {
            return report;
        }

        let candidates: Vec<Candidate> = comments
            .iter()
            .map(|comment| Candidate {
                code_tokens: normalized_code_tokens(&comment.span.adjacent_code),
                context_tokens: normalized_code_tokens(comment.span.context().0),
                words: self.comment_words(&comment.span.raw_text),
            })
            .collect();

        let mut buckets: IndexMap<u64, Vec<usize>> = IndexMap::new();
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.code_tokens.is_empty() {
                continue;
            }
            let shape = code_shape(&candidate.code_tokens).join(" ");
            buckets.entry(xxh3_64(shape.as_bytes())).or_default().push(index);
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for (key, members) in &buckets {
            let mut members = members.as_slice();
            if members.len() > self.config.max_bucket_size {
                warn!(
                    bucket = %format!("{:016x}", key),
                    size = members.len(),
                    cap = self.config.max_bucket_size,
                    "Drift bucket exceeds cap, truncating comparisons"
                );
                let mut files: Vec<String> = members
                    .iter()
                    .map(|&index| comments[index].span.file_id.clone())
                    .collect();
                files.sort();
                files.dedup();
                report.warnings.push(AnalysisWarning::DriftDetectionTruncated {
                    bucket: format!("{:016x}", key),
                    size: members.len(),
                    compared: self.config.max_bucket_size,
                    files,
                });
                members = &members[..self.config.max_bucket_size];
            }
            self.compare_bucket(comments, &candidates, members, &mut seen, &mut report);
        }

        report
            .findings
            .sort_by(|a, b| (&a.span_a, &a.span_b).cmp(&(&b.span_a, &b.span_b)));
        debug!(
            findings = report.findings.len(),
            buckets = buckets.len(),
            "Drift detection complete"
        );
        report
    }

    fn compare_bucket(
        &self,
        comments: &[ClassifiedComment],
        candidates: &[Candidate],
        members: &[usize],
        seen: &mut HashSet<(usize, usize)>,
        report: &mut DriftReport,
    ) {
        let mut sites: IndexMap<(&str, usize), Vec<usize>> = IndexMap::new();
        for &index in members {
            let span = &comments[index].span;
            sites
                .entry((span.file_id.as_str(), span.anchor_offset))
                .or_default()
                .push(index);
        }

        let sites: Vec<&Vec<usize>> = sites.values().collect();
        for (i, site_a) in sites.iter().enumerate() {
            for site_b in &sites[i + 1..] {
                if comments[site_a[0]].span.shares_block_with(&comments[site_b[0]].span) {
                    continue;
                }
                let Some(code_similarity) =
                    self.code_similarity(&candidates[site_a[0]], &candidates[site_b[0]])
                else {
                    continue;
                };

                for (a, b) in self.align(candidates, site_a, site_b) {
                    let key = (a.min(b), a.max(b));
                    if !seen.insert(key) {
                        continue;
                    }
                    let comment_similarity =
                        jaccard(&candidates[a].words, &candidates[b].words);
                    if comment_similarity >= self.config.comment_similarity_threshold {
                        continue;
                    }
                    if let Some(finding) = drift_finding(
                        &comments[a],
                        &comments[b],
                        code_similarity,
                        comment_similarity,
                    ) {
                        report.findings.push(finding);
                    }
                }
            }
        }
    }

    /// Similarity of two code sites, or `None` below the threshold.
    ///
    /// The documented line and the enclosing block must both clear the
    /// threshold; the weaker of the two is reported.
    fn code_similarity(&self, a: &Candidate, b: &Candidate) -> Option<f64> {
        let threshold = self.config.code_similarity_threshold;
        let line = sequence_similarity(&a.code_tokens, &b.code_tokens);
        if line < threshold {
            return None;
        }
        // Edit distance is at least the length difference.
        let (short, long) = (
            a.context_tokens.len().min(b.context_tokens.len()),
            a.context_tokens.len().max(b.context_tokens.len()),
        );
        if long > 0 && (short as f64) / (long as f64) < threshold {
            return None;
        }
        let block = sequence_similarity(&a.context_tokens, &b.context_tokens);
        (block >= threshold).then_some(line.min(block))
    }

    /// Pair each comment of one site with its closest counterpart on the other.
    fn align(
        &self,
        candidates: &[Candidate],
        site_a: &[usize],
        site_b: &[usize],
    ) -> Vec<(usize, usize)> {
        let closest = |from: usize, others: &[usize]| -> usize {
            let mut best = others[0];
            let mut best_score = f64::MIN;
            for &other in others {
                let score = jaccard(&candidates[from].words, &candidates[other].words);
                if score > best_score {
                    best = other;
                    best_score = score;
                }
            }
            best
        };

        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for &a in site_a {
            let pair = (a, closest(a, site_b));
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        for &b in site_b {
            let pair = (closest(b, site_a), b);
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    /// Comment words with misspellings corrected.
    fn comment_words(&self, raw_text: &str) -> HashSet<String> {
        prose_words(&strip_comment_delimiters(raw_text))
            .iter()
            .map(|word| self.dictionary.normalize(word))
            .collect()
    }
}

/// Classify a divergent pair. Two hollow comments disagree about nothing.
fn drift_finding(
    a: &ClassifiedComment,
    b: &ClassifiedComment,
    code_similarity: f64,
    comment_similarity: f64,
) -> Option<DriftFinding> {
    let category_a = a.classification.category;
    let category_b = b.classification.category;
    if category_a.is_hollow() && category_b.is_hollow() {
        return None;
    }
    let stale = (category_a.is_hollow() && category_b.is_substantive())
        || (category_b.is_hollow() && category_a.is_substantive());
    let kind = if stale {
        DriftKind::Stale
    } else {
        DriftKind::Inconsistent
    };

    let (first, second) = if a.span.span_ref() <= b.span.span_ref() {
        (a, b)
    } else {
        (b, a)
    };
    Some(DriftFinding {
        span_a: first.span.span_ref(),
        span_b: second.span.span_ref(),
        code_similarity,
        comment_similarity,
        kind,
    })
}
