use resequencer_rs::{Sequence, SequenceElementComparator, SequenceNumberComparator};
use std::cmp::Ordering;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Frame {
        stream: &'static str,
        seq: u64,
    }

    fn frame(seq: u64) -> Frame {
        Frame {
            stream: "video",
            seq,
        }
    }

    fn frame_sequence() -> Sequence<Frame, SequenceNumberComparator<fn(&Frame) -> Option<u64>>> {
        fn seq_of(frame: &Frame) -> Option<u64> {
            Some(frame.seq)
        }
        Sequence::new(SequenceNumberComparator::new(
            seq_of as fn(&Frame) -> Option<u64>,
        ))
    }

    /// Adjacency defined on even numbers only: 2 follows 0, 4 follows 2.
    struct EvenComparator;

    impl SequenceElementComparator<u32> for EvenComparator {
        fn compare(&self, a: &u32, b: &u32) -> Ordering {
            a.cmp(b)
        }

        fn predecessor(&self, a: &u32, b: &u32) -> bool {
            a + 2 == *b
        }

        fn successor(&self, a: &u32, b: &u32) -> bool {
            *a == b + 2
        }
    }

    // --- gap filling on a message type ---

    #[test]
    fn test_frames_fill_gap() {
        let mut frames = frame_sequence();
        for seq in [5, 6, 8] {
            assert!(frames.insert(frame(seq)));
        }

        assert_eq!(frames.predecessor(&frame(6)), Some(frame(5)));
        assert_eq!(frames.successor(&frame(6)), None);
        assert_eq!(frames.predecessor(&frame(8)), None);

        assert!(frames.insert(frame(7)));
        assert_eq!(frames.successor(&frame(6)), Some(frame(7)));
        assert_eq!(frames.predecessor(&frame(8)), Some(frame(7)));
    }

    #[test]
    fn test_frames_iterate_by_sequence_number() {
        let mut frames = frame_sequence();
        for seq in [9, 1, 4, 2, 7] {
            frames.insert(frame(seq));
        }

        let seqs: Vec<u64> = frames.iter().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![1, 2, 4, 7, 9]);
        assert!(frames.iter().all(|f| f.stream == "video"));
    }

    // --- custom adjacency ---

    #[test]
    fn test_custom_adjacency_rule() {
        let mut evens = Sequence::new(EvenComparator);
        for n in [0u32, 2, 6] {
            evens.insert(n);
        }

        assert_eq!(evens.successor(&0), Some(2));
        assert_eq!(evens.predecessor(&6), None);

        evens.insert(4);
        assert_eq!(evens.predecessor(&6), Some(4));
        assert_eq!(evens.successor(&2), Some(4));
    }

    #[test]
    fn test_drain_contiguous_run() {
        let mut evens = Sequence::new(EvenComparator);
        for n in [8u32, 0, 4, 2, 12] {
            evens.insert(n);
        }

        // Flush the run starting at the head until the first gap.
        let mut run = Vec::new();
        let mut current = evens.pop_first();
        while let Some(n) = current {
            run.push(n);
            current = evens.successor(&n);
            if let Some(next) = current {
                evens.remove(&next);
            }
        }

        assert_eq!(run, vec![0, 2, 4]);
        assert_eq!(evens.iter().collect::<Vec<_>>(), vec![8, 12]);
    }
}
