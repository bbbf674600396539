//! Devices command implementation

use anyhow::Result;
use clap::Args;
use convbench_runtime::DeviceDescriptor;

use super::Backend;
use crate::output;

#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// Compute runtime to query
    #[arg(long, env = "CONVBENCH_BACKEND", value_enum, default_value_t)]
    pub backend: Backend,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DevicesArgs) -> Result<()> {
    let devices = match args.backend {
        Backend::Host => convbench_runtime::host::list_devices(),
        Backend::Opencl => opencl_devices()?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    if devices.is_empty() {
        output::info("No devices found.");
        return Ok(());
    }

    println!("{:<4} {:<5} {:<30} {}", "#", "KIND", "PLATFORM", "DEVICE");
    for (i, d) in devices.iter().enumerate() {
        println!(
            "{:<4} {:<5} {:<30} {}",
            i,
            format!("{:?}", d.kind).to_uppercase(),
            d.platform,
            d.name
        );
    }

    Ok(())
}

#[cfg(feature = "opencl")]
fn opencl_devices() -> Result<Vec<DeviceDescriptor>> {
    Ok(convbench_runtime::opencl::list_devices()?)
}

#[cfg(not(feature = "opencl"))]
fn opencl_devices() -> Result<Vec<DeviceDescriptor>> {
    Err(super::opencl_unavailable())
}
