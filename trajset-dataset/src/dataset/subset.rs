use anyhow::Result;
use std::collections::BTreeMap;
use trajset_core::{
    error::TrajsetError,
    record::{ActionType, ObservationType, StepKey, StructuredSpacesRecord},
};

/// A view of a subset of the step records of an [`InMemoryDataset`](super::InMemoryDataset).
///
/// Returned by [`InMemoryDataset::random_split`](super::InMemoryDataset::random_split).
/// The `i`-th item of the subset is the record at `indices()[i]` in the dataset.
#[derive(Clone, Debug)]
pub struct Subset<'a> {
    records: &'a [StructuredSpacesRecord],
    indices: Vec<usize>,
}

impl<'a> Subset<'a> {
    pub(super) fn new(records: &'a [StructuredSpacesRecord], indices: Vec<usize>) -> Self {
        Self { records, indices }
    }

    /// Number of step records in the subset.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the subset has no records.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices of the records in the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the observations and actions of the `i`-th record of the subset.
    pub fn get(
        &self,
        i: usize,
    ) -> Result<(
        BTreeMap<StepKey, ObservationType>,
        BTreeMap<StepKey, ActionType>,
    )> {
        let record = self.record(i).ok_or(TrajsetError::IndexOutOfRange {
            index: i,
            len: self.len(),
        })?;
        Ok((record.observations_dict(), record.actions_dict()))
    }

    /// Returns the `i`-th record of the subset.
    pub fn record(&self, i: usize) -> Option<&'a StructuredSpacesRecord> {
        self.indices.get(i).and_then(|&ix| self.records.get(ix))
    }

    /// Iterates over the records of the subset.
    pub fn iter(&self) -> impl Iterator<Item = &'a StructuredSpacesRecord> + '_ {
        self.indices.iter().filter_map(|&ix| self.records.get(ix))
    }
}
