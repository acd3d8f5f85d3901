// Stress tests for the pipeline's synchronization primitives.
//
// These run many producers and consumers against one queue or one slot
// table and check that nothing is lost, duplicated or left blocked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tzip::pipeline::queue::BoundedQueue;
use tzip::pipeline::slot::{SlotTable, TaskOutput};
use tzip::TaskError;

#[test]
fn every_item_is_popped_exactly_once() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 500;

    let queue = Arc::new(BoundedQueue::<usize>::new(3).unwrap());
    let seen = Arc::new((0..PRODUCERS * PER_PRODUCER)
        .map(|_| AtomicUsize::new(0))
        .collect::<Vec<_>>());

    let consumers: Vec<_> = (0..6)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                while let Some(item) = queue.pop() {
                    assert!(queue.len() <= queue.capacity());
                    seen[item].fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push(p * PER_PRODUCER + i).unwrap();
                }
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }
    queue.close();
    for c in consumers {
        c.join().unwrap();
    }

    assert!(seen.iter().all(|n| n.load(Ordering::SeqCst) == 1));
    assert!(queue.is_empty());
}

#[test]
fn single_consumer_sees_fifo_order() {
    let queue = Arc::new(BoundedQueue::new(2).unwrap());
    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..200 {
                queue.push(i).unwrap();
            }
            queue.close();
        })
    };
    let mut got = Vec::new();
    while let Some(i) = queue.pop() {
        got.push(i);
    }
    producer.join().unwrap();
    assert_eq!(got, (0..200).collect::<Vec<_>>());
}

#[test]
fn close_releases_all_blocked_consumers() {
    let queue: Arc<BoundedQueue<usize>> = Arc::new(BoundedQueue::new(1).unwrap());
    let consumers: Vec<_> = (0..8)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        })
        .collect();
    thread::sleep(Duration::from_millis(50));
    queue.close();
    for c in consumers {
        assert_eq!(c.join().unwrap(), None);
    }
}

#[test]
fn cancel_releases_blocked_producer() {
    let queue = Arc::new(BoundedQueue::new(1).unwrap());
    queue.push(0usize).unwrap();
    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.push(1).map_err(|closed| closed.0))
    };
    thread::sleep(Duration::from_millis(50));
    assert_eq!(queue.cancel(), 1);
    assert_eq!(producer.join().unwrap(), Err(1));
    assert_eq!(queue.pop(), None);
}

#[test]
fn reader_drains_slots_settled_in_reverse() {
    const N: usize = 64;
    let slots = Arc::new(SlotTable::new(N));

    let settlers: Vec<_> = (0..4)
        .map(|t| {
            let slots = Arc::clone(&slots);
            thread::spawn(move || {
                for i in (0..N).rev().filter(|i| i % 4 == t) {
                    if i % 10 == 3 {
                        slots.slot(i).fail(TaskError::AlreadyTaken).unwrap();
                    } else {
                        let output = TaskOutput {
                            compressed: vec![i as u8],
                            original_len: i,
                        };
                        slots.slot(i).publish(output).unwrap();
                    }
                }
            })
        })
        .collect();

    for i in 0..N {
        match slots.slot(i).await_ready() {
            Ok(output) => {
                assert_ne!(i % 10, 3);
                assert_eq!(output.compressed, vec![i as u8]);
                assert_eq!(output.original_len, i);
            }
            Err(_) => assert_eq!(i % 10, 3),
        }
    }
    for s in settlers {
        s.join().unwrap();
    }
}
