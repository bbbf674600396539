//! Host reference backend
//!
//! Runs the convolution on the calling thread. The program source is still
//! read and scanned for kernel entry points so that a missing or broken
//! source fails the same way it would on a real driver. Event timestamps
//! come from the process monotonic clock.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use convbench_shared::utils::time::monotonic_nanos;
use tracing::{debug, info};

use crate::{
    ArgKind, ComputeRuntime, DeviceDescriptor, DeviceKind, EventTimestamps, KernelArg, Result,
    RuntimeError,
};

const PLATFORM_NAME: &str = "convbench host";
const DEVICE_NAME: &str = "host reference (single thread)";

/// 3x3 smoothing mask applied by the `convolution` kernel, normalized by 16
const MASK: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
const MASK_NORM: f32 = 16.0;

/// Host-memory buffer shared between the pipeline and bound kernels
pub type HostBuffer = Rc<RefCell<Vec<f32>>>;

type NativeKernel = fn(&[f32], &mut [f32], usize, [usize; 2]);

#[derive(Debug, Clone)]
enum BoundArg {
    Buffer(HostBuffer),
    Int(i32),
}

/// Kernel instance with its argument table
#[derive(Debug)]
pub struct HostKernel {
    name: String,
    signature: Vec<ArgKind>,
    args: Vec<Option<BoundArg>>,
    entry: NativeKernel,
}

/// Completed command; host launches finish before `launch` returns
#[derive(Debug, Clone, Copy)]
pub struct HostEvent {
    timestamps: EventTimestamps,
}

/// Session on the host reference device
#[derive(Debug)]
pub struct HostRuntime {
    kernel_names: Vec<String>,
}

impl HostRuntime {
    /// Open a session: load and check the program source
    pub fn open(source_path: &Path) -> Result<Self> {
        info!("Using device: {}", DEVICE_NAME);

        let source =
            std::fs::read_to_string(source_path).map_err(|source| RuntimeError::SourceNotFound {
                path: source_path.to_path_buf(),
                source,
            })?;

        let kernel_names = kernel_entry_points(&source);
        if kernel_names.is_empty() {
            return Err(RuntimeError::Build {
                log: format!("{}: no __kernel entry points found", source_path.display()),
            });
        }

        info!(
            "Built program {} ({} kernel(s): {})",
            source_path.display(),
            kernel_names.len(),
            kernel_names.join(", ")
        );

        Ok(Self { kernel_names })
    }

    fn buffer_arg<'k>(kernel: &'k HostKernel, index: usize) -> Result<&'k HostBuffer> {
        match kernel.args.get(index) {
            Some(Some(BoundArg::Buffer(buffer))) => Ok(buffer),
            _ => Err(RuntimeError::call(
                "launch",
                format!("{}: argument {} is not a bound buffer", kernel.name, index),
            )),
        }
    }
}

/// Devices exposed by the host backend
pub fn list_devices() -> Vec<DeviceDescriptor> {
    vec![DeviceDescriptor {
        platform: PLATFORM_NAME.to_string(),
        name: DEVICE_NAME.to_string(),
        kind: DeviceKind::Cpu,
    }]
}

impl ComputeRuntime for HostRuntime {
    type Buffer = HostBuffer;
    type Kernel = HostKernel;
    type Event = HostEvent;

    fn backend_name(&self) -> &'static str {
        "host"
    }

    fn device_name(&self) -> &str {
        DEVICE_NAME
    }

    fn create_buffer(&self, len: usize) -> Result<HostBuffer> {
        if len == 0 {
            return Err(RuntimeError::call("create_buffer", "buffer size is zero"));
        }
        Ok(Rc::new(RefCell::new(vec![0.0; len])))
    }

    fn write_buffer(&self, buffer: &HostBuffer, data: &[f32]) -> Result<()> {
        let mut dst = buffer.borrow_mut();
        if data.len() > dst.len() {
            return Err(RuntimeError::call(
                "write_buffer",
                format!("{} values do not fit in a buffer of {}", data.len(), dst.len()),
            ));
        }
        dst[..data.len()].copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&self, buffer: &HostBuffer, data: &mut [f32]) -> Result<()> {
        let src = buffer.borrow();
        if data.len() > src.len() {
            return Err(RuntimeError::call(
                "read_buffer",
                format!("{} values requested from a buffer of {}", data.len(), src.len()),
            ));
        }
        data.copy_from_slice(&src[..data.len()]);
        Ok(())
    }

    fn create_kernel(&self, name: &str, signature: &[ArgKind]) -> Result<HostKernel> {
        if !self.kernel_names.iter().any(|k| k == name) {
            return Err(RuntimeError::KernelNotFound(name.to_string()));
        }

        let entry = native_kernel(name, signature).ok_or_else(|| {
            RuntimeError::Unsupported(format!(
                "kernel `{}` with {} argument(s) has no host implementation",
                name,
                signature.len()
            ))
        })?;

        Ok(HostKernel {
            name: name.to_string(),
            signature: signature.to_vec(),
            args: vec![None; signature.len()],
            entry,
        })
    }

    fn set_kernel_arg(
        &self,
        kernel: &mut HostKernel,
        index: u32,
        arg: KernelArg<'_, HostBuffer>,
    ) -> Result<()> {
        let idx = index as usize;
        let expected = *kernel.signature.get(idx).ok_or_else(|| {
            RuntimeError::call(
                "set_kernel_arg",
                format!("{} has no argument {}", kernel.name, index),
            )
        })?;

        if arg.kind() != expected {
            return Err(RuntimeError::call(
                "set_kernel_arg",
                format!(
                    "argument {} of {} expects {:?}, got {:?}",
                    index,
                    kernel.name,
                    expected,
                    arg.kind()
                ),
            ));
        }

        kernel.args[idx] = Some(match arg {
            KernelArg::Buffer(buffer) => BoundArg::Buffer(Rc::clone(buffer)),
            KernelArg::Int(value) => BoundArg::Int(value),
        });
        Ok(())
    }

    fn launch(
        &self,
        kernel: &HostKernel,
        global: [usize; 2],
        local: [usize; 2],
    ) -> Result<HostEvent> {
        if local.contains(&0) || global[0] % local[0] != 0 || global[1] % local[1] != 0 {
            return Err(RuntimeError::call(
                "launch",
                format!(
                    "global size {:?} is not a multiple of local size {:?}",
                    global, local
                ),
            ));
        }

        let input = Self::buffer_arg(kernel, 0)?;
        let output = Self::buffer_arg(kernel, 1)?;
        let dim = match kernel.args.get(2) {
            Some(Some(BoundArg::Int(dim))) if *dim >= 0 => *dim as usize,
            _ => {
                return Err(RuntimeError::call(
                    "launch",
                    format!("{}: argument 2 is not a bound dimension", kernel.name),
                ))
            }
        };

        if Rc::ptr_eq(input, output) {
            return Err(RuntimeError::call(
                "launch",
                "input and output must be distinct buffers",
            ));
        }

        let src = input.borrow();
        let mut dst = output.borrow_mut();
        if src.len() < dim * dim || dst.len() < dim * dim {
            return Err(RuntimeError::call(
                "launch",
                format!("buffers are too small for a {}x{} matrix", dim, dim),
            ));
        }

        let start_ns = monotonic_nanos();
        (kernel.entry)(&src, &mut dst, dim, global);
        let end_ns = monotonic_nanos();

        debug!("{} finished in {} ns", kernel.name, end_ns - start_ns);

        Ok(HostEvent {
            timestamps: EventTimestamps { start_ns, end_ns },
        })
    }

    fn wait(&self, _event: &HostEvent) -> Result<()> {
        Ok(())
    }

    fn event_timestamps(&self, event: &HostEvent) -> Result<EventTimestamps> {
        Ok(event.timestamps)
    }
}

/// Names following `__kernel void` in an OpenCL C source
fn kernel_entry_points(source: &str) -> Vec<String> {
    source
        .split("__kernel")
        .skip(1)
        .filter_map(|rest| {
            let rest = rest.trim_start().strip_prefix("void")?;
            let name: String = rest
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

fn native_kernel(name: &str, signature: &[ArgKind]) -> Option<NativeKernel> {
    match (name, signature) {
        ("convolution", [ArgKind::Buffer, ArgKind::Buffer, ArgKind::Int]) => Some(convolution),
        _ => None,
    }
}

/// One work-item per output element; items outside `dim` do nothing
fn convolution(input: &[f32], output: &mut [f32], dim: usize, global: [usize; 2]) {
    for y in 0..global[1] {
        for x in 0..global[0] {
            if x >= dim || y >= dim {
                continue;
            }
            output[y * dim + x] = convolve_at(input, dim, x, y);
        }
    }
}

/// Zero-padded 3x3 convolution of `input` at (`x`, `y`)
pub fn convolve_at(input: &[f32], dim: usize, x: usize, y: usize) -> f32 {
    let mut acc = 0.0;
    for (my, row) in MASK.iter().enumerate() {
        for (mx, weight) in row.iter().enumerate() {
            let (Some(sy), Some(sx)) = ((y + my).checked_sub(1), (x + mx).checked_sub(1)) else {
                continue;
            };
            if sx < dim && sy < dim {
                acc += input[sy * dim + sx] * weight;
            }
        }
    }
    acc / MASK_NORM
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SIGNATURE: [ArgKind; 3] = [ArgKind::Buffer, ArgKind::Buffer, ArgKind::Int];

    fn open_with(source: &str) -> Result<HostRuntime> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        HostRuntime::open(file.path())
    }

    fn runtime() -> HostRuntime {
        open_with("__kernel void convolution(__global float* a, __global float* b, int n) {}")
            .unwrap()
    }

    #[test]
    fn test_entry_points() {
        let src = "__kernel void first(int a) {}\n__kernel  void second_2(void) {}";
        assert_eq!(kernel_entry_points(src), vec!["first", "second_2"]);
        assert!(kernel_entry_points("void helper() {}").is_empty());
    }

    #[test]
    fn test_open_missing_source() {
        let err = HostRuntime::open(Path::new("/nonexistent/convolution.cl")).unwrap_err();
        assert!(matches!(err, RuntimeError::SourceNotFound { .. }));
    }

    #[test]
    fn test_open_source_without_kernels() {
        let err = open_with("int main() { return 0; }").unwrap_err();
        assert!(matches!(err, RuntimeError::Build { .. }));
    }

    #[test]
    fn test_unknown_kernel() {
        let err = runtime().create_kernel("transpose", &SIGNATURE).unwrap_err();
        assert!(matches!(err, RuntimeError::KernelNotFound(name) if name == "transpose"));
    }

    #[test]
    fn test_arg_type_mismatch() {
        let rt = runtime();
        let mut kernel = rt.create_kernel("convolution", &SIGNATURE).unwrap();
        assert!(rt.set_kernel_arg(&mut kernel, 0, KernelArg::Int(4)).is_err());
        assert!(rt.set_kernel_arg(&mut kernel, 3, KernelArg::Int(4)).is_err());
    }

    #[test]
    fn test_launch_requires_bound_args() {
        let rt = runtime();
        let kernel = rt.create_kernel("convolution", &SIGNATURE).unwrap();
        assert!(rt.launch(&kernel, [16, 16], [16, 16]).is_err());
    }

    #[test]
    fn test_convolution_matches_reference() {
        let rt = runtime();
        let dim = 3;
        let input: Vec<f32> = (1..=9).map(|v| v as f32).collect();

        let a = rt.create_buffer(dim * dim).unwrap();
        let b = rt.create_buffer(dim * dim).unwrap();
        rt.write_buffer(&a, &input).unwrap();

        let mut kernel = rt.create_kernel("convolution", &SIGNATURE).unwrap();
        rt.set_kernel_arg(&mut kernel, 0, KernelArg::Buffer(&a)).unwrap();
        rt.set_kernel_arg(&mut kernel, 1, KernelArg::Buffer(&b)).unwrap();
        rt.set_kernel_arg(&mut kernel, 2, KernelArg::Int(dim as i32)).unwrap();

        let event = rt.launch(&kernel, [16, 16], [16, 16]).unwrap();
        rt.wait(&event).unwrap();
        let ts = rt.event_timestamps(&event).unwrap();
        assert!(ts.end_ns >= ts.start_ns);

        let mut output = vec![0.0; dim * dim];
        rt.read_buffer(&b, &mut output).unwrap();

        // Centre element sees the full mask: (1+3+7+9) + 2*(2+4+6+8) + 4*5 = 80
        assert_eq!(output[4], 80.0 / 16.0);
        // Corner (0,0): 4*1 + 2*2 + 2*4 + 1*5 = 21
        assert_eq!(output[0], 21.0 / 16.0);
    }

    #[test]
    fn test_launch_rejects_partial_work_groups() {
        let rt = runtime();
        let kernel = rt.create_kernel("convolution", &SIGNATURE).unwrap();
        let err = rt.launch(&kernel, [20, 16], [16, 16]).unwrap_err();
        assert!(err.to_string().contains("multiple"));
    }
}
