use super::*;

#[test]
fn prepare_limits_payload_to_capacity() {
    let mut buf = TransferBuffer::allocate(1, 8).unwrap();
    assert_eq!(buf.index(), 1);
    assert_eq!(buf.capacity(), 8);
    assert!(buf.filled().is_empty());

    buf.prepare(4).unwrap().copy_from_slice(&[1, 2, 3, 4]);
    assert_eq!(buf.filled(), &[1, 2, 3, 4]);
    assert!(buf.prepare(9).is_err());
    assert_eq!(buf.filled().len(), 4);
}

#[test]
fn completion_returns_buffers_in_order() {
    let (done, rx) = FlushCompletion::channel();
    let other = done.clone();
    done.notify(TransferBuffer::allocate(0, 2).unwrap());
    other.notify(TransferBuffer::allocate(1, 2).unwrap());
    assert_eq!(rx.try_recv().unwrap().index(), 0);
    assert_eq!(rx.try_recv().unwrap().index(), 1);
    assert!(rx.try_recv().is_err());
}

#[test]
fn notify_never_blocks_when_receiver_is_gone() {
    let (done, rx) = FlushCompletion::channel();
    drop(rx);
    done.notify(TransferBuffer::allocate(0, 2).unwrap());
}
