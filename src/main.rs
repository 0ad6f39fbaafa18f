//! PanelInput - Main entry point
//!
//! On ESP-IDF: installs the encoder interrupt and runs the key loop.
//! On host: replays a scripted sequence of encoder edges through a
//! simulated PIO block, so the decode path can be watched without hardware.

use core::ffi::c_void;

use panel_input::log_drain::LogDrain;
use panel_input::stats::DropStats;
use panel_input::{
    plog_info, EdgeDecoder, FaultState, InterruptController, KEY_MAILBOX, MAIN_LOG_STREAM,
    PANEL_CONFIG,
};

#[cfg(target_os = "espidf")]
type Pio = panel_input::MmioPio;
#[cfg(not(target_os = "espidf"))]
type Pio = panel_input::SimulatedPio;

// SAFETY: PANEL_CONFIG.pio_base is the PIO block of this board and nothing
// else in the firmware touches it.
#[cfg(target_os = "espidf")]
static PIO: Pio = unsafe { Pio::new(PANEL_CONFIG.pio_base) };
#[cfg(not(target_os = "espidf"))]
static PIO: Pio = Pio::new();

static DROP_STATS: DropStats = DropStats::new();
static FAULT_STATE: FaultState = FaultState::new();
static DECODER: EdgeDecoder<'static, Pio> = EdgeDecoder::new(&PIO, &KEY_MAILBOX, &DROP_STATS);

/// Encoder interrupt trampoline.
unsafe extern "C" fn encoder_isr(_context: *mut c_void) {
    DECODER.on_interrupt();
}

/// Log sink writing to the process stdout (UART0 console on the target).
struct Stdout;

impl core::fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        print!("{}", s);
        Ok(())
    }
}

fn flush_logs(drain: &LogDrain<'_>) {
    let _ = drain.drain_into(&mut Stdout);
    drain.report_dropped(&mut Stdout);
}

#[cfg(target_os = "espidf")]
fn main() {
    use panel_input::hal::EspIntrRegistrar;

    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();
    println!("{}", env!("VERSION_STRING"));

    let drain = LogDrain::global();
    let controller = InterruptController::new(&PIO, PANEL_CONFIG, &FAULT_STATE);
    let mut registrar = EspIntrRegistrar::new();

    if let Err(err) = controller.install_and_enable(&mut registrar, encoder_isr) {
        flush_logs(&drain);
        println!("panel input disabled: {}", err);
        // Fault is latched; the UI task reads FAULT_STATE and shows it.
        loop {
            unsafe {
                esp_idf_svc::sys::vTaskDelay(1000);
            }
        }
    }

    loop {
        let key = KEY_MAILBOX.get_key_with(|| {
            flush_logs(&drain);
            unsafe {
                esp_idf_svc::sys::vTaskDelay(1);
            }
        });
        plog_info!(MAIN_LOG_STREAM, "key {}", key);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use panel_input::{EdgeMask, IrqLine, IrqRegistrar, IsrFn};

    /// Stands in for the platform allocator; fails the first attempts.
    struct SimRegistrar {
        failures_left: u32,
        handler: Option<IsrFn>,
    }

    impl IrqRegistrar for SimRegistrar {
        fn register(&mut self, _line: IrqLine, handler: IsrFn) -> Result<(), i32> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(-1);
            }
            self.handler = Some(handler);
            Ok(())
        }
    }

    // (edges latched, consume afterwards)
    const SCRIPT: [(EdgeMask, bool); 8] = [
        (EdgeMask::UP, true),
        (EdgeMask::DOWN, false),
        (EdgeMask::LEFT, true),
        (EdgeMask::LEFT.union(EdgeMask::RIGHT), true),
        (EdgeMask::UP.union(EdgeMask::DOWN), true),
        (EdgeMask::empty(), true),
        (EdgeMask::MENU.union(EdgeMask::RIGHT), true),
        (EdgeMask::MENU, true),
    ];

    println!("{}", env!("VERSION_STRING"));

    let drain = LogDrain::global();
    let controller = InterruptController::new(&PIO, PANEL_CONFIG, &FAULT_STATE);
    let mut registrar = SimRegistrar {
        failures_left: 2,
        handler: None,
    };

    if let Err(err) = controller.install_and_enable(&mut registrar, encoder_isr) {
        flush_logs(&drain);
        println!("panel input disabled: {}", err);
        std::process::exit(1);
    }
    let Some(isr) = registrar.handler else {
        println!("no handler registered");
        std::process::exit(1);
    };

    for (edges, consume) in SCRIPT {
        PIO.latch(edges.bits());
        // An empty latch still fires once: a spurious interrupt.
        if PIO.irq_pending() || edges.is_empty() {
            // SAFETY: the handler ignores its context pointer.
            unsafe { isr(core::ptr::null_mut()) };
        }

        if consume {
            match KEY_MAILBOX.try_get_key() {
                Some(key) => plog_info!(MAIN_LOG_STREAM, "{:?} -> {}", edges, key),
                None => plog_info!(MAIN_LOG_STREAM, "{:?} -> (none)", edges),
            }
        }
        flush_logs(&drain);
    }

    println!("{:?}", DROP_STATS.snapshot());
}
