//! Dashboard statistics: computed on read, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{history::History, record::Verdict};

/// Number of entries shown under "recent activity".
pub const RECENT_ENTRIES: usize = 5;

/// Score histogram resolution: ten buckets of width ten.
pub const SCORE_BUCKETS: usize = 10;

/// A compact row in the recent-activity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
  pub record_id: Uuid,
  pub timestamp: DateTime<Utc>,
  pub verdict:   Verdict,
  pub score:     u8,
}

/// Aggregate view over a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
  pub total:           usize,
  /// `None` when the history is empty.
  pub average_score:   Option<f64>,
  pub fake:            usize,
  pub real:            usize,
  pub uncertain:       usize,
  /// `score_histogram[i]` counts scores in `[10*i, 10*i + 10)`; 100 lands in
  /// the last bucket.
  pub score_histogram: [usize; SCORE_BUCKETS],
  /// Newest first.
  pub recent:          Vec<RecentEntry>,
}

impl DashboardStats {
  pub fn from_history(history: &History) -> Self {
    let mut stats = Self {
      total:           history.len(),
      average_score:   None,
      fake:            0,
      real:            0,
      uncertain:       0,
      score_histogram: [0; SCORE_BUCKETS],
      recent:          Vec::new(),
    };

    let mut sum = 0u64;
    for r in history.iter() {
      match r.verdict {
        Verdict::Fake => stats.fake += 1,
        Verdict::Real => stats.real += 1,
        Verdict::Uncertain => stats.uncertain += 1,
      }
      sum += u64::from(r.score);
      let bucket = (usize::from(r.score) / 10).min(SCORE_BUCKETS - 1);
      stats.score_histogram[bucket] += 1;
    }

    if stats.total > 0 {
      stats.average_score = Some(sum as f64 / stats.total as f64);
    }

    stats.recent = history
      .recent(RECENT_ENTRIES)
      .into_iter()
      .map(|r| RecentEntry {
        record_id: r.record_id,
        timestamp: r.timestamp,
        verdict:   r.verdict,
        score:     r.score,
      })
      .collect();

    stats
  }

  /// `(verdict, count)` pairs in a fixed order, for bar charts.
  pub fn verdict_counts(&self) -> [(Verdict, usize); 3] {
    [
      (Verdict::Fake, self.fake),
      (Verdict::Real, self.real),
      (Verdict::Uncertain, self.uncertain),
    ]
  }
}
