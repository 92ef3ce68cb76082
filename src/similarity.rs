// Fuzzy string similarity for csrfprobe
// Partial-substring scoring used to measure how alike issued tokens are

/// Scores two strings on a 0..=100 scale.
///
/// Implementations must be symmetric and return 100 for identical inputs.
pub trait SimilarityScorer {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Best-window similarity: the shorter string is slid across the longer one
/// and each aligned window is scored by longest common subsequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatio;

impl SimilarityScorer for PartialRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

        if short.is_empty() {
            return if long.is_empty() { 100 } else { 0 };
        }

        long.windows(short.len())
            .map(|window| ratio(&short, window))
            .max()
            .unwrap_or(0)
    }
}

/// `round(200 * lcs / (|a| + |b|))`
fn ratio(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let matched = lcs_len(a, b);
    ((200 * matched) as f64 / total as f64).round() as u8
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
