//! Edge decoder scenarios against a simulated PIO block

use panel_input::{
    logging::LogStream, Decoded, DropReason, DropStats, EdgeDecoder, EdgeMask, KeyCode,
    KeyMailbox, PioRegisters, SimulatedPio, ENABLE_INT,
};

struct Panel {
    pio: SimulatedPio,
    mailbox: KeyMailbox,
    stats: DropStats,
    log: LogStream,
}

impl Panel {
    fn new() -> Self {
        let pio = SimulatedPio::new();
        pio.set_irq_mask(ENABLE_INT);
        Self {
            pio,
            mailbox: KeyMailbox::new(),
            stats: DropStats::new(),
            log: LogStream::new(),
        }
    }

    fn decoder(&self) -> EdgeDecoder<'_, SimulatedPio> {
        EdgeDecoder::new(&self.pio, &self.mailbox, &self.stats).with_log(&self.log)
    }

    fn turn(&self, edges: EdgeMask) -> Decoded {
        self.pio.latch(edges.bits());
        self.decoder().on_interrupt()
    }
}

#[test]
fn test_scenario_a_up_round_trip() {
    let panel = Panel::new();

    panel.turn(EdgeMask::UP);
    assert!(panel.mailbox.key_available());
    assert_eq!(panel.mailbox.get_key(), KeyCode::Up);
    assert!(!panel.mailbox.key_available());
    assert_eq!(panel.mailbox.peek(), KeyCode::Illegal);
}

#[test]
fn test_scenario_b_unconsumed_key_kept() {
    let panel = Panel::new();
    panel.mailbox.offer(KeyCode::Down).unwrap();

    assert_eq!(
        panel.turn(EdgeMask::LEFT),
        Decoded::Dropped(DropReason::MailboxFull)
    );
    assert_eq!(panel.mailbox.peek(), KeyCode::Down);
}

#[test]
fn test_scenario_c_left_right_rejected() {
    let panel = Panel::new();

    panel.turn(EdgeMask::LEFT | EdgeMask::RIGHT);
    assert!(!panel.mailbox.key_available());
    assert_eq!(panel.stats.dropped(DropReason::AmbiguousHorizontal), 1);
}

#[test]
fn test_up_down_and_zero_rejected() {
    let panel = Panel::new();

    assert_eq!(
        panel.turn(EdgeMask::UP | EdgeMask::DOWN),
        Decoded::Dropped(DropReason::AmbiguousVertical)
    );
    assert_eq!(
        panel.turn(EdgeMask::empty()),
        Decoded::Dropped(DropReason::Spurious)
    );
    assert!(!panel.mailbox.key_available());
}

#[test]
fn test_every_single_line_maps_to_its_key() {
    let panel = Panel::new();
    let cases = [
        (EdgeMask::MENU, KeyCode::Menu),
        (EdgeMask::UP, KeyCode::Up),
        (EdgeMask::DOWN, KeyCode::Down),
        (EdgeMask::LEFT, KeyCode::Left),
        (EdgeMask::RIGHT, KeyCode::Right),
    ];

    for (edges, expected) in cases {
        assert_eq!(panel.turn(edges), Decoded::Stored(expected));
        assert_eq!(panel.mailbox.get_key(), expected);
    }
    assert_eq!(panel.stats.stored(), 5);
}

#[test]
fn test_full_mailbox_unchanged_under_backpressure() {
    let panel = Panel::new();
    panel.turn(EdgeMask::RIGHT);

    for _ in 0..50 {
        for edges in [EdgeMask::MENU, EdgeMask::UP, EdgeMask::LEFT, EdgeMask::empty()] {
            panel.turn(edges);
            assert_eq!(panel.mailbox.peek(), KeyCode::Right);
        }
    }

    assert_eq!(panel.stats.dropped(DropReason::MailboxFull), 200);
    assert_eq!(panel.mailbox.get_key(), KeyCode::Right);
    assert_eq!(panel.turn(EdgeMask::MENU), Decoded::Stored(KeyCode::Menu));
}

#[test]
fn test_handler_leaves_source_enabled_and_clear() {
    let panel = Panel::new();

    for edges in [EdgeMask::UP, EdgeMask::UP | EdgeMask::DOWN, EdgeMask::LEFT] {
        panel.turn(edges);
        assert_eq!(panel.pio.irq_mask(), ENABLE_INT);
        assert_eq!(panel.pio.edge_capture(), 0);
    }
    // One disable per run
    assert_eq!(panel.pio.mask_disables(), 3);
}

#[test]
fn test_at_most_one_pending_key() {
    let panel = Panel::new();
    let script = [
        EdgeMask::UP,
        EdgeMask::DOWN,
        EdgeMask::MENU | EdgeMask::UP,
        EdgeMask::LEFT,
        EdgeMask::RIGHT,
        EdgeMask::empty(),
    ];

    let mut taken = 0;
    for (i, edges) in script.iter().cycle().take(60).enumerate() {
        let before = panel.mailbox.peek();
        let decoded = panel.turn(*edges);

        if before.is_valid() {
            assert_eq!(decoded, Decoded::Dropped(DropReason::MailboxFull));
            assert_eq!(panel.mailbox.peek(), before);
        }
        if i % 3 == 0 && panel.mailbox.try_get_key().is_some() {
            taken += 1;
        }
    }

    let snap = panel.stats.snapshot();
    let pending = panel.mailbox.key_available() as u32;
    assert_eq!(snap.stored, taken + pending);
}
