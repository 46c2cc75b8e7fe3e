use std::collections::VecDeque;

use serde::Serialize;

/// Fixed-capacity ring of state buffers collected during evaluation.
/// Pushing onto a full ring evicts the oldest buffer.
pub struct EvalStateRing<S> {
    buffers: VecDeque<Vec<S>>,
    capacity: usize,
}

impl<S> EvalStateRing<S> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "EvalStateRing capacity must be > 0");
        EvalStateRing {
            buffers: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, states: Vec<S>) {
        if self.buffers.len() == self.capacity {
            self.buffers.pop_front();
        }
        self.buffers.push_back(states);
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl<S: Serialize> EvalStateRing<S> {
    /// Oldest-first JSON array of buffers.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_len() {
        let mut ring = EvalStateRing::new(3);
        assert!(ring.is_empty());
        ring.push(vec![1, 2]);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut ring = EvalStateRing::new(2);
        ring.push(vec![1]);
        ring.push(vec![2]);
        ring.push(vec![3]);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.to_value().unwrap(), serde_json::json!([[2], [3]]));
    }

    #[test]
    fn test_to_value_is_oldest_first() {
        let mut ring = EvalStateRing::new(4);
        ring.push(vec![0usize, 1]);
        ring.push(vec![2usize, 3]);
        assert_eq!(
            ring.to_value().unwrap(),
            serde_json::json!([[0, 1], [2, 3]])
        );
    }

    #[test]
    fn test_to_value_reports_serialization_errors() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut ring = EvalStateRing::new(1);
        ring.push(vec![HashMap::from([((1u8, 2u8), 0u8)])]);
        assert!(ring.to_value().is_err());
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_panics() {
        let _ring: EvalStateRing<u8> = EvalStateRing::new(0);
    }
}
