//! OpenCL session setup and per-iteration calls

use std::path::Path;

use ocl::core::{get_event_profiling_info, ProfilingInfo};
use ocl::{
    Buffer, CommandQueueProperties, Context, Device, DeviceType, Event, Kernel, MemFlags,
    Platform, Program, Queue,
};
use tracing::{debug, info};

use super::call_error;
use crate::{
    ArgKind, ComputeRuntime, DeviceDescriptor, DeviceKind, EventTimestamps, KernelArg, Result,
    RuntimeError,
};

/// Long-lived OpenCL session
pub struct OpenClRuntime {
    device_name: String,
    program: Program,
    queue: Queue,
}

impl OpenClRuntime {
    /// Select a device, build `source_path` and create a profiling queue
    pub fn open(source_path: &Path) -> Result<Self> {
        let (platform, device) = select_device()?;
        let device_name = device.name().unwrap_or_else(|_| "unknown device".to_string());
        info!(
            "Using platform {} / device {}",
            platform.name().unwrap_or_default(),
            device_name
        );

        let context = Context::builder()
            .platform(platform)
            .devices(device)
            .build()
            .map_err(call_error("clCreateContext"))?;

        let program = build_program(&context, device, source_path)?;

        let queue = Queue::new(
            &context,
            device,
            Some(CommandQueueProperties::PROFILING_ENABLE),
        )
        .map_err(call_error("clCreateCommandQueue"))?;

        Ok(Self {
            device_name,
            program,
            queue,
        })
    }
}

/// First platform's GPU, falling back to its CPU
fn select_device() -> Result<(Platform, Device)> {
    let platform = ocl::core::get_platform_ids()
        .ok()
        .and_then(|ids| ids.into_iter().next())
        .map(Platform::new)
        .ok_or(RuntimeError::NoPlatform)?;

    for kind in [DeviceType::GPU, DeviceType::CPU] {
        match Device::list(platform, Some(kind)) {
            Ok(devices) => {
                if let Some(device) = devices.first() {
                    return Ok((platform, *device));
                }
            }
            Err(e) => debug!("No {:?} device: {}", kind, e),
        }
    }

    Err(RuntimeError::NoDevice {
        platform: platform.name().unwrap_or_default(),
    })
}

fn build_program(context: &Context, device: Device, source_path: &Path) -> Result<Program> {
    let source =
        std::fs::read_to_string(source_path).map_err(|source| RuntimeError::SourceNotFound {
            path: source_path.to_path_buf(),
            source,
        })?;

    let program = Program::builder()
        .devices(device)
        .src(source)
        .build(context)
        .map_err(|e| RuntimeError::Build { log: e.to_string() })?;

    info!("Built program {}", source_path.display());
    Ok(program)
}

/// Every GPU and CPU device on every platform
pub fn list_devices() -> Result<Vec<DeviceDescriptor>> {
    let ids = ocl::core::get_platform_ids().map_err(|_| RuntimeError::NoPlatform)?;
    let mut found = Vec::new();

    for platform in ids.into_iter().map(Platform::new) {
        let platform_name = platform.name().unwrap_or_default();
        for (flag, kind) in [(DeviceType::GPU, DeviceKind::Gpu), (DeviceType::CPU, DeviceKind::Cpu)] {
            let devices = Device::list(platform, Some(flag)).unwrap_or_default();
            found.extend(devices.into_iter().map(|device| DeviceDescriptor {
                platform: platform_name.clone(),
                name: device.name().unwrap_or_default(),
                kind,
            }));
        }
    }

    Ok(found)
}

impl ComputeRuntime for OpenClRuntime {
    type Buffer = Buffer<f32>;
    type Kernel = Kernel;
    type Event = Event;

    fn backend_name(&self) -> &'static str {
        "opencl"
    }

    fn device_name(&self) -> &str {
        &self.device_name
    }

    fn create_buffer(&self, len: usize) -> Result<Buffer<f32>> {
        Buffer::<f32>::builder()
            .queue(self.queue.clone())
            .flags(MemFlags::READ_WRITE)
            .len(len)
            .build()
            .map_err(call_error("clCreateBuffer"))
    }

    fn write_buffer(&self, buffer: &Buffer<f32>, data: &[f32]) -> Result<()> {
        buffer
            .write(data)
            .enq()
            .map_err(call_error("clEnqueueWriteBuffer"))
    }

    fn read_buffer(&self, buffer: &Buffer<f32>, data: &mut [f32]) -> Result<()> {
        buffer
            .read(data)
            .enq()
            .map_err(call_error("clEnqueueReadBuffer"))
    }

    fn create_kernel(&self, name: &str, signature: &[ArgKind]) -> Result<Kernel> {
        let mut builder = Kernel::builder();
        builder
            .program(&self.program)
            .name(name)
            .queue(self.queue.clone());

        // Placeholders; real values are bound through `set_kernel_arg`.
        for kind in signature {
            match kind {
                ArgKind::Buffer => builder.arg(None::<&Buffer<f32>>),
                ArgKind::Int => builder.arg(&0i32),
            };
        }

        builder.build().map_err(call_error("clCreateKernel"))
    }

    fn set_kernel_arg(
        &self,
        kernel: &mut Kernel,
        index: u32,
        arg: KernelArg<'_, Buffer<f32>>,
    ) -> Result<()> {
        match arg {
            KernelArg::Buffer(buffer) => kernel.set_arg(index, buffer),
            KernelArg::Int(value) => kernel.set_arg(index, &value),
        }
        .map_err(call_error("clSetKernelArg"))
    }

    fn launch(&self, kernel: &Kernel, global: [usize; 2], local: [usize; 2]) -> Result<Event> {
        let mut event = Event::empty();
        unsafe {
            kernel
                .cmd()
                .global_work_size(global)
                .local_work_size(local)
                .enew(&mut event)
                .enq()
                .map_err(call_error("clEnqueueNDRangeKernel"))?;
        }
        Ok(event)
    }

    fn wait(&self, event: &Event) -> Result<()> {
        event.wait_for().map_err(call_error("clWaitForEvents"))
    }

    fn event_timestamps(&self, event: &Event) -> Result<EventTimestamps> {
        let read = || -> ocl::Result<EventTimestamps> {
            let start_ns = get_event_profiling_info(event, ProfilingInfo::Start)?.time()?;
            let end_ns = get_event_profiling_info(event, ProfilingInfo::End)?.time()?;
            Ok(EventTimestamps { start_ns, end_ns })
        };
        read().map_err(call_error("clGetEventProfilingInfo"))
    }
}
