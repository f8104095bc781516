use resequencer_rs::{
    ResequencerConfig, ResequencerEngine, SequenceNumberComparator, Timeout, TimeoutState,
    TimerScheduler,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Packet {
        seq: u64,
        body: String,
    }

    fn packet(seq: u64) -> Packet {
        Packet {
            seq,
            body: format!("payload-{seq}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_scenario_100ms() {
        let scheduler = TimerScheduler::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let timeout = Timeout::new(&scheduler, Duration::from_millis(100));
        let expected = timeout.id();
        timeout.set_handler(move |t: &Timeout| {
            assert_eq!(t.id(), expected);
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        timeout.schedule().unwrap();

        sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timeout.state(), TimeoutState::Fired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_packet_stream_resequenced() {
        let scheduler = TimerScheduler::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let engine = ResequencerEngine::new(
            ResequencerConfig::default().with_timeout(Duration::from_millis(200)),
            SequenceNumberComparator::new(|p: &Packet| Some(p.seq)),
            scheduler,
            tx,
        )
        .unwrap();

        // 4 is lost in transit.
        for seq in [2, 1, 3, 6, 5] {
            engine.insert(packet(seq)).unwrap();
        }

        let mut received = Vec::new();
        for _ in 0..5 {
            let p = rx.recv().await.unwrap();
            assert_eq!(p.body, format!("payload-{}", p.seq));
            received.push(p.seq);
        }

        assert_eq!(received, vec![1, 2, 3, 5, 6]);
        assert_eq!(engine.last_delivered(), Some(packet(6)));
        assert!(engine.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_receiver_closed_does_not_block_engine() {
        let scheduler = TimerScheduler::new().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let engine = ResequencerEngine::new(
            ResequencerConfig::default(),
            SequenceNumberComparator::new(|n: &u64| Some(*n)),
            scheduler,
            tx,
        )
        .unwrap();

        engine.insert(1).unwrap();
        assert_eq!(engine.flush(), 1);
        assert_eq!(engine.delivered_count(), 1);
    }
}
