//! # Vibration Monitor Simulation
//!
//! Runs the full pipeline against a simulated ADXL345 on a fake I2C bus.
//! A motor hums at a steady 0.25 g for the learning phase and the first
//! inference windows, then develops a bearing rattle, then recovers. The
//! bus drops the occasional transaction to show retries being absorbed.
//!
//! Serial output goes to stdout exactly as the UART would carry it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use accel_sentinel::adxl345::{regs, Adxl345, DEVICE_ID};
use accel_sentinel::config::{PipelineConfig, WINDOW_LENGTH};
use accel_sentinel::profile::NominalProfile;
use accel_sentinel::report::SerialReporter;
use accel_sentinel::{Orchestrator, Step};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

// ── Simulated bus ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Nack;

impl embedded_hal::i2c::Error for Nack {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// Motor condition, shared with the driver loop.
#[derive(Clone, Copy, PartialEq)]
enum Motor {
    Healthy,
    Rattling,
}

struct SimBus {
    motor: Rc<Cell<Motor>>,
    t: u32,
    transactions: u32,
}

impl ErrorType for SimBus {
    type Error = Nack;
}

impl I2c for SimBus {
    fn transaction(&mut self, _address: u8, ops: &mut [Operation<'_>]) -> Result<(), Nack> {
        self.transactions += 1;
        if self.transactions % 997 == 0 {
            return Err(Nack);
        }
        let mut reg = 0u8;
        for op in ops.iter_mut() {
            match op {
                Operation::Write(bytes) => reg = bytes[0],
                Operation::Read(buf) if reg == regs::DEVID => buf[0] = DEVICE_ID,
                Operation::Read(buf) => {
                    let (x, z) = self.sample();
                    buf[0..2].copy_from_slice(&x.to_le_bytes());
                    buf[2..4].copy_from_slice(&0i16.to_le_bytes());
                    buf[4..6].copy_from_slice(&z.to_le_bytes());
                }
            }
        }
        Ok(())
    }
}

impl SimBus {
    /// Raw (x, z) counts at 256 counts per g.
    fn sample(&mut self) -> (i16, i16) {
        let phase = self.t as f32 * 0.35;
        self.t = self.t.wrapping_add(1);
        let hum = 64.0 * phase.sin();
        match self.motor.get() {
            Motor::Healthy => (0, (256.0 + hum) as i16),
            Motor::Rattling => {
                let knock = if self.t % 7 == 0 { 180.0 } else { 0.0 };
                (90, (256.0 + 2.5 * hum + knock) as i16)
            }
        }
    }
}

// ── Host plumbing ────────────────────────────────────────────────────────────

/// Stands in for the board's UART.
struct Stdout;

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        print!("{}", s);
        Ok(())
    }
}

/// Simulated time runs as fast as the host can go.
struct Instant;

impl DelayNs for Instant {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() {
    let motor = Rc::new(Cell::new(Motor::Healthy));
    let bus = SimBus { motor: motor.clone(), t: 0, transactions: 0 };

    let mut pipeline: Orchestrator<_, _, NominalProfile<WINDOW_LENGTH>, _> = Orchestrator::new(
        Adxl345::new(bus),
        Instant,
        NominalProfile::new(),
        SerialReporter::new(Stdout),
        PipelineConfig::default(),
    );

    if let Err(e) = pipeline.start() {
        eprintln!("bring-up failed: {}", e);
        return;
    }

    let learning = pipeline.config().learning_iterations;
    let mut retried = 0;
    for window in 0..learning as u32 + 12 {
        match window {
            w if w == learning as u32 + 4 => motor.set(Motor::Rattling),
            w if w == learning as u32 + 8 => motor.set(Motor::Healthy),
            _ => {}
        }
        match pipeline.step() {
            Ok(Step::Learned { stats, .. }) | Ok(Step::Classified { stats, .. }) => {
                retried += stats.failures;
            }
            Err(e) => {
                eprintln!("window failed: {}", e);
                return;
            }
        }
    }

    println!();
    println!("windows learned : {}", pipeline.engine().learned());
    println!("reads retried   : {}", retried);
    println!("lines dropped   : {}", pipeline.reporter().dropped());
}
