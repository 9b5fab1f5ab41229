use rapidcap::sync::{BoundedFifo, QueueFull, NUM_RESULTS};

#[test]
fn push_pop_is_fifo_order() {
    let q = BoundedFifo::new(NUM_RESULTS);
    q.push(0).unwrap();
    q.push(1).unwrap();
    q.push(2).unwrap();
    assert_eq!(q.pop(), Some(0));
    assert_eq!(q.pop(), Some(1));
    assert_eq!(q.pop(), Some(2));
    assert_eq!(q.pop(), None);
}

#[test]
fn push_beyond_capacity_fails_without_mutating() {
    let q = BoundedFifo::new(2);
    q.push(0).unwrap();
    q.push(1).unwrap();
    assert_eq!(q.push(2), Err(QueueFull));
    assert_eq!(q.len(), 2);
    assert_eq!(q.front(), Some(0));
}

#[test]
fn front_does_not_remove() {
    let q = BoundedFifo::new(NUM_RESULTS);
    q.push(7).unwrap();
    assert_eq!(q.front(), Some(7));
    assert_eq!(q.len(), 1);
}
