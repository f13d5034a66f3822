use super::*;
use crate::assets::color::Rgb565;

fn recv_one(rx: &mpsc::Receiver<TransferBuffer>) -> TransferBuffer {
    rx.recv_timeout(Duration::from_secs(5)).unwrap()
}

#[test]
fn transfers_land_in_panel_memory() {
    let mut panel = SimulatedPanel::new(Size16::new(4, 3), SimulatedPanelOpts::default()).unwrap();
    let (done, rx) = FlushCompletion::channel();

    let mut buf = TransferBuffer::allocate(0, 16).unwrap();
    buf.prepare(8).unwrap().fill(0xff);
    let area = PanelArea {
        x1: 1,
        y1: 1,
        x2: 3,
        y2: 3,
    };
    panel.flush(area, buf, &done).unwrap();
    let back = recv_one(&rx);
    assert_eq!(back.index(), 0);
    assert_eq!(panel.transfers(), 1);

    let gram = panel.snapshot().unwrap();
    assert_eq!(gram.pixel(0, 0), Some(Rgb565::BLACK));
    assert_eq!(gram.pixel(1, 1), Some(Rgb565::WHITE));
    assert_eq!(gram.pixel(2, 2), Some(Rgb565::WHITE));
    assert_eq!(gram.pixel(3, 2), Some(Rgb565::BLACK));
}

#[test]
fn rejected_transfers_still_return_the_buffer() {
    let mut panel = SimulatedPanel::new(Size16::new(4, 3), SimulatedPanelOpts::default()).unwrap();
    let (done, rx) = FlushCompletion::channel();

    let mut buf = TransferBuffer::allocate(1, 16).unwrap();
    buf.prepare(8).unwrap();
    let outside = PanelArea {
        x1: 3,
        y1: 0,
        x2: 5,
        y2: 2,
    };
    assert!(panel.flush(outside, buf, &done).is_err());
    assert_eq!(recv_one(&rx).index(), 1);

    let mut buf = TransferBuffer::allocate(1, 16).unwrap();
    buf.prepare(6).unwrap();
    let short = PanelArea {
        x1: 0,
        y1: 0,
        x2: 2,
        y2: 2,
    };
    assert!(panel.flush(short, buf, &done).is_err());
    assert_eq!(recv_one(&rx).index(), 1);
    assert_eq!(panel.transfers(), 0);
}

#[test]
fn latency_is_applied_per_band() {
    let opts = SimulatedPanelOpts {
        latency: Duration::from_millis(20),
    };
    let mut panel = SimulatedPanel::new(Size16::new(2, 1), opts).unwrap();
    let (done, rx) = FlushCompletion::channel();
    let mut buf = TransferBuffer::allocate(0, 4).unwrap();
    buf.prepare(4).unwrap();
    let start = std::time::Instant::now();
    panel
        .flush(
            PanelArea {
                x1: 0,
                y1: 0,
                x2: 2,
                y2: 1,
            },
            buf,
            &done,
        )
        .unwrap();
    recv_one(&rx);
    assert!(start.elapsed() >= Duration::from_millis(20));
}
