use clap::Parser;
use embedded_hal::i2c::{ErrorType, I2c, Operation};
use jetbot_core::mk_static;
use jetbot_core::utils::{MotorCommand, SpeedPolicy, SystemController};
use std::convert::Infallible;
use tracing::{error, info};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// I2C address of the motor board (decimal or 0x-prefixed hex)
    #[clap(long, default_value = "0x14", value_parser = parse_address)]
    address: u8,
    /// refuse speeds outside -255..=255 instead of saturating them
    #[clap(long)]
    reject: bool,
    /// run every command on its own thread against the shared controller
    #[clap(long)]
    parallel: bool,
    /// JSON motor commands, e.g. '{"mc":"set","m":1,"s":100}'
    commands: Vec<String>,
}

fn parse_address(raw: &str) -> Result<u8, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    match parsed {
        Ok(addr) if addr <= 0x7F => Ok(addr),
        Ok(addr) => Err(format!("0x{addr:02X} is not a 7-bit address")),
        Err(e) => Err(e.to_string()),
    }
}

// I2C bus that logs to console
struct ConsoleI2c;

impl ErrorType for ConsoleI2c {
    type Error = Infallible;
}

impl I2c for ConsoleI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => info!("I2C 0x{:02X} write {:02X?}", address, bytes),
                // the motor board is write-only
                Operation::Read(buf) => info!("I2C 0x{:02X} read {} bytes", address, buf.len()),
            }
        }
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opts: Opts = Opts::parse();

    let commands: Vec<MotorCommand> = opts
        .commands
        .iter()
        .filter_map(|raw| match serde_json::from_str(raw) {
            Ok(cmd) => Some(cmd),
            Err(error) => {
                error!(?error, raw = %raw, "error deserializing MotorCommand");
                None
            }
        })
        .collect();
    let mut failed = opts.commands.len() - commands.len();

    let policy = opts.reject.then_some(SpeedPolicy::Reject);
    let ctrl = match SystemController::new(ConsoleI2c, Some(opts.address), policy) {
        Ok(ctrl) => ctrl,
        Err(e) => {
            error!("Failed to open motor board: {:?}", e);
            std::process::exit(1);
        }
    };
    let ctrl: &'static SystemController<ConsoleI2c> = mk_static!(SystemController<ConsoleI2c>, ctrl);

    if opts.parallel {
        let handles: Vec<_> = commands
            .into_iter()
            .map(|cmd| std::thread::spawn(move || ctrl.execute(cmd).is_ok()))
            .collect();
        for handle in handles {
            if !handle.join().unwrap_or(false) {
                failed += 1;
            }
        }
    } else {
        for cmd in commands {
            if ctrl.execute(cmd).is_err() {
                failed += 1;
            }
        }
    }

    info!("Stopping all motors");
    if let Err(e) = ctrl.with_driver(|driver| driver.stop_all()) {
        error!("Failed to stop motors: {:?}", e);
        failed += 1;
    }

    if failed > 0 {
        error!("{} command(s) failed", failed);
        std::process::exit(1);
    }
}
