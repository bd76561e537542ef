use anyhow::{Context, Result};
use colored::Colorize;
use platform::mocks::{MockKernel, MockUserReader, MockUserWriter};
use platform::{to_ssize, FileOperations, GpioNum, OpenFile};
use sevenseg::{BootDisplay, Digit, DriverConfig, SegmentPattern, SevenSegDevice, MODULE_INFO};
use tracing_subscriber::EnvFilter;

const SESSION: OpenFile = OpenFile::new(1);

pub fn run(payloads: &[String], first_gpio: u32, boot_digit: Option<u8>, verbose: bool) -> Result<()> {
    init_logging(verbose);

    println!();
    println!(
        "{}",
        format!(
            "📟 {} v{} ({}, {})",
            MODULE_INFO.name, MODULE_INFO.version, MODULE_INFO.description, MODULE_INFO.license
        )
        .cyan()
        .bold()
    );
    println!();

    let mut config = DriverConfig::new().with_first_gpio(GpioNum::new(first_gpio));
    if let Some(raw) = boot_digit {
        let digit = Digit::new(raw).context("--boot-digit must be 0..=9")?;
        config = config.with_boot_display(BootDisplay::Digit(digit));
    }

    let device = SevenSegDevice::new(MockKernel::new(), config);
    if let Err(err) = device.load() {
        eprintln!("{}", format!("  ✗ load failed: {err}").red().bold());
        return Err(err).with_context(|| format!("insmod failed with errno {}", err.to_errno()));
    }
    println!("{}", "  ✓ loaded".green());
    print_display(&device);

    device
        .open(&SESSION)
        .map_err(|err| anyhow::anyhow!("open failed: {err}"))?;
    for payload in payloads {
        let mut reader = MockUserReader::new(payload.as_bytes());
        let result = device.write(&SESSION, &mut reader, 0);
        match result {
            Ok(count) => println!(
                "{}",
                format!("  ✓ write {payload:?} → {count}").green()
            ),
            Err(err) => println!(
                "{}",
                format!("  ✗ write {payload:?} → {} ({err})", to_ssize::<sevenseg::IoError>(Err(err))).yellow()
            ),
        }

        let mut writer = MockUserWriter::with_capacity(1);
        match device.read(&SESSION, &mut writer, 0) {
            Ok(_) => println!(
                "    read → {:?}",
                String::from_utf8_lossy(writer.written())
            ),
            Err(err) => println!("{}", format!("    read failed: {err}").red()),
        }
        print_display(&device);
    }
    device.release(&SESSION);

    let kernel = device.into_kernel();
    println!("{}", "  ✓ unloaded".green());
    println!();

    if kernel.held().is_empty() && kernel.bad_releases().is_empty() {
        println!("{}", "✓ No kernel resources left behind".green().bold());
    } else {
        for resource in kernel.held() {
            eprintln!("{}", format!("  leaked: {resource:?}").red());
        }
        for resource in kernel.bad_releases() {
            eprintln!("{}", format!("  bad release: {resource:?}").red());
        }
        anyhow::bail!("resource ledger not clean after unload");
    }
    println!();

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn print_display(device: &SevenSegDevice<MockKernel>) {
    let Some((digit, pattern)) = device.snapshot() else {
        return;
    };
    println!("    pins {pattern}  digit {digit}");
    for row in render_rows(pattern) {
        println!("      {}", row.bold());
    }
}

fn render_rows(pattern: SegmentPattern) -> Vec<String> {
    pattern
        .render()
        .iter()
        .map(|row| row.iter().collect())
        .collect()
}
