//! Interrupt source setup tests

use core::ffi::c_void;

use panel_input::{
    logging::{LogLevel, LogStream},
    EdgeMask, FaultCode, FaultState, InstallError, InterruptController, IrqLine,
    IrqRegistrar, IsrFn, PanelConfig, PioRegisters, SimulatedPio, ENABLE_INT,
};

unsafe extern "C" fn noop_isr(_context: *mut c_void) {}

/// Fails a fixed number of times, then accepts.
struct ScriptedRegistrar {
    failures_left: u32,
    status: i32,
    calls: u32,
    registered: Option<(IrqLine, IsrFn)>,
}

impl ScriptedRegistrar {
    fn failing(times: u32) -> Self {
        Self {
            failures_left: times,
            status: -7,
            calls: 0,
            registered: None,
        }
    }
}

impl IrqRegistrar for ScriptedRegistrar {
    fn register(&mut self, line: IrqLine, handler: IsrFn) -> Result<(), i32> {
        self.calls += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(self.status);
        }
        self.registered = Some((line, handler));
        Ok(())
    }
}

#[test]
fn test_install_registers_enables_and_clears() {
    let pio = SimulatedPio::new();
    let fault = FaultState::new();
    let log = LogStream::new();
    pio.latch(EdgeMask::UP.bits() | EdgeMask::MENU.bits());

    let config = PanelConfig::new();
    let controller = InterruptController::new(&pio, config, &fault).with_log(&log);
    let mut registrar = ScriptedRegistrar::failing(0);

    assert_eq!(controller.install_and_enable(&mut registrar, noop_isr), Ok(1));

    let (line, _) = registrar.registered.unwrap();
    assert_eq!(line, config.irq);
    assert_eq!(pio.irq_mask(), ENABLE_INT);
    assert_eq!(pio.edge_capture(), 0);
    assert!(!pio.irq_pending());
    assert!(!fault.is_active());
}

#[test]
fn test_retries_until_success() {
    let pio = SimulatedPio::new();
    let fault = FaultState::new();
    let log = LogStream::new();
    let controller = InterruptController::new(&pio, PanelConfig::new(), &fault).with_log(&log);
    let mut registrar = ScriptedRegistrar::failing(5);

    assert_eq!(controller.install_and_enable(&mut registrar, noop_isr), Ok(6));
    assert_eq!(registrar.calls, 6);
    assert!(!fault.is_active());

    // One warning per failed attempt, then the enable notice
    let mut warnings = 0;
    while let Some(entry) = log.drain() {
        if entry.level == LogLevel::Warn {
            warnings += 1;
        }
    }
    assert_eq!(warnings, 5);
}

#[test]
fn test_bounded_retries_latch_fault() {
    let pio = SimulatedPio::new();
    let fault = FaultState::new();
    let log = LogStream::new();
    let config = PanelConfig::new().with_registration_attempts(3);
    let controller = InterruptController::new(&pio, config, &fault).with_log(&log);
    let mut registrar = ScriptedRegistrar::failing(10);

    assert_eq!(
        controller.install_and_enable(&mut registrar, noop_isr),
        Err(InstallError::RetriesExhausted {
            attempts: 3,
            last_status: -7
        })
    );
    assert_eq!(registrar.calls, 3);
    assert!(fault.is_active());
    assert_eq!(fault.code(), FaultCode::IrqRegistration);
    assert_eq!(fault.data(), 3);

    // Lines stay masked
    assert_eq!(pio.mask_writes(), 0);
    assert_eq!(pio.irq_mask(), 0);
}

#[test]
fn test_unbounded_retries_keep_going() {
    let pio = SimulatedPio::new();
    let fault = FaultState::new();
    let log = LogStream::new();
    let config = PanelConfig::new().with_registration_attempts(0);
    let controller = InterruptController::new(&pio, config, &fault).with_log(&log);
    let mut registrar = ScriptedRegistrar::failing(100);

    assert_eq!(controller.install_and_enable(&mut registrar, noop_isr), Ok(101));
    assert!(!fault.is_active());
    assert_eq!(pio.irq_mask(), ENABLE_INT);
    // Ring full of warnings, the rest counted as dropped
    assert!(log.dropped() > 0);
}
