//! Job state and bucket types.

use bpreport_core::JobRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Job state as reported in the `state` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// 0 - waiting for resources
    Queued,
    /// 1 - running
    Active,
    /// 2 - waiting for a retry
    ReQueued,
    /// 3 - finished, successfully or not
    Done,
}

impl JobState {
    /// Map a numeric state code. Codes outside 0-3 have no bucket.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Queued),
            1 => Some(Self::Active),
            2 => Some(Self::ReQueued),
            3 => Some(Self::Done),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Active => "Active",
            Self::ReQueued => "Re-Queued",
            Self::Done => "Done",
        }
    }
}

/// Which buckets a report covers, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketSelection {
    #[default]
    Done,
    DoneAndActive,
    All,
}

impl BucketSelection {
    pub fn states(self) -> &'static [JobState] {
        match self {
            Self::Done => &[JobState::Done],
            Self::DoneAndActive => &[JobState::Done, JobState::Active],
            Self::All => &[
                JobState::Done,
                JobState::Active,
                JobState::Queued,
                JobState::ReQueued,
            ],
        }
    }
}

/// Decoded records keyed by job id, one map per state.
///
/// Within a bucket the first record seen for a job id wins. The same job id
/// may still appear in several buckets when the input holds snapshots of
/// the job in different states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBuckets {
    pub queued: BTreeMap<String, JobRecord>,
    pub active: BTreeMap<String, JobRecord>,
    pub requeued: BTreeMap<String, JobRecord>,
    pub done: BTreeMap<String, JobRecord>,
}

impl StateBuckets {
    pub fn bucket(&self, state: JobState) -> &BTreeMap<String, JobRecord> {
        match state {
            JobState::Queued => &self.queued,
            JobState::Active => &self.active,
            JobState::ReQueued => &self.requeued,
            JobState::Done => &self.done,
        }
    }

    fn bucket_mut(&mut self, state: JobState) -> &mut BTreeMap<String, JobRecord> {
        match state {
            JobState::Queued => &mut self.queued,
            JobState::Active => &mut self.active,
            JobState::ReQueued => &mut self.requeued,
            JobState::Done => &mut self.done,
        }
    }

    /// File a record unless its bucket already holds the job id.
    ///
    /// Returns true if the record was stored.
    pub fn insert(&mut self, state: JobState, record: JobRecord) -> bool {
        match self.bucket_mut(state).entry(record.job_id().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Total records across all buckets.
    pub fn len(&self) -> usize {
        self.queued.len() + self.active.len() + self.requeued.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buckets covered by a selection, in output order.
    pub fn selected(
        &self,
        selection: BucketSelection,
    ) -> impl Iterator<Item = (JobState, &BTreeMap<String, JobRecord>)> {
        selection
            .states()
            .iter()
            .map(move |state| (*state, self.bucket(*state)))
    }
}
