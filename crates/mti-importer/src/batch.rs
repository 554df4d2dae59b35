//! Batch accumulation
//!
//! Parsed documents are buffered in source order until the configured
//! threshold is reached, then handed off as an owned [`Batch`].

use mti_common::Document;

/// Default number of documents per bulk call.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Ordered group of documents submitted in one bulk call
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Position of this batch in source order, starting at 0
    pub sequence: u64,
    pub documents: Vec<Document>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// `(first id, last id)` for log lines about this batch
    pub fn id_range(&self) -> Option<(&str, &str)> {
        let first = self.documents.first()?;
        let last = self.documents.last()?;
        Some((first.id.as_str(), last.id.as_str()))
    }
}

#[derive(Debug)]
pub struct BatchAccumulator {
    documents: Vec<Document>,
    threshold: usize,
    next_sequence: u64,
}

impl BatchAccumulator {
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            documents: Vec::with_capacity(threshold),
            threshold,
            next_sequence: 0,
        }
    }

    pub fn add(&mut self, doc: Document) {
        self.documents.push(doc);
    }

    pub fn is_full(&self) -> bool {
        self.documents.len() >= self.threshold
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Take everything buffered so far as a batch and start over empty.
    pub fn drain_and_reset(&mut self) -> Batch {
        let documents = std::mem::replace(&mut self.documents, Vec::with_capacity(self.threshold));
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Batch { sequence, documents }
    }

    /// Remaining documents at end of stream, if any.
    pub fn finish(mut self) -> Option<Batch> {
        if self.documents.is_empty() {
            None
        } else {
            Some(self.drain_and_reset())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mti_common::Context;
    use std::collections::BTreeMap;

    fn doc(n: usize) -> Document {
        Document::new(
            format!("icd-10-gm-code-A{:02}", n),
            format!("A{:02}", n),
            "Cholera",
            Context::Icd10Gm,
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_full_at_threshold() {
        let mut acc = BatchAccumulator::new(3);
        for n in 0..2 {
            acc.add(doc(n));
            assert!(!acc.is_full());
        }
        acc.add(doc(2));
        assert!(acc.is_full());
        acc.add(doc(3));
        assert!(acc.is_full());
    }

    #[test]
    fn test_drain_preserves_insertion_order() {
        let mut acc = BatchAccumulator::new(10);
        for n in 0..4 {
            acc.add(doc(n));
        }

        let batch = acc.drain_and_reset();
        let ids: Vec<_> = batch.documents.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(ids, vec!["A00", "A01", "A02", "A03"]);
        assert!(acc.is_empty());
        assert!(!acc.is_full());
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut acc = BatchAccumulator::new(1);
        acc.add(doc(0));
        assert_eq!(acc.drain_and_reset().sequence, 0);
        acc.add(doc(1));
        assert_eq!(acc.drain_and_reset().sequence, 1);
    }

    #[test]
    fn test_finish_returns_remainder() {
        let mut acc = BatchAccumulator::new(5000);
        acc.add(doc(0));
        acc.add(doc(1));

        let rest = acc.finish().unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest.id_range(), Some(("icd-10-gm-code-A00", "icd-10-gm-code-A01")));
    }

    #[test]
    fn test_finish_on_empty_accumulator() {
        assert!(BatchAccumulator::new(10).finish().is_none());
    }
}
