use std::fmt;

use crate::DeviceSupport;

/// Device voice models are loaded onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    /// A CUDA-compatible GPU. AMD ROCm devices are driven through the same
    /// interface.
    Cuda,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda => f.write_str("cuda"),
        }
    }
}

/// Kind of accelerator found on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
    NvidiaCuda,
    AmdRocm,
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accelerator::NvidiaCuda => f.write_str("NVIDIA CUDA"),
            Accelerator::AmdRocm => f.write_str("AMD ROCm"),
        }
    }
}

/// Reports which accelerator, if any, this process can use.
pub trait AcceleratorProbe {
    fn probe(&self) -> Option<Accelerator>;
}

/// A probe for machines without accelerators.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuOnly;

impl AcceleratorProbe for CpuOnly {
    fn probe(&self) -> Option<Accelerator> {
        None
    }
}

/// Probe backed by ONNX Runtime's execution providers: CUDA first, then ROCm.
#[cfg(feature = "onnx")]
#[derive(Debug, Clone, Copy, Default)]
pub struct OrtAcceleratorProbe;

#[cfg(feature = "onnx")]
impl AcceleratorProbe for OrtAcceleratorProbe {
    fn probe(&self) -> Option<Accelerator> {
        use ort::execution_providers::{
            CUDAExecutionProvider, ExecutionProvider, ROCmExecutionProvider,
        };

        let available = |result: ort::Result<bool>, name: &str| match result {
            Ok(available) => available,
            Err(e) => {
                log::warn!("Could not check {name} availability: {e}");
                false
            }
        };

        if available(CUDAExecutionProvider::default().is_available(), "CUDA") {
            Some(Accelerator::NvidiaCuda)
        } else if available(ROCmExecutionProvider::default().is_available(), "ROCm") {
            Some(Accelerator::AmdRocm)
        } else {
            None
        }
    }
}

/// Device chosen once when the engine is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSelection {
    pub device: Device,
    /// An accelerator exists, whether or not it was chosen.
    pub accelerator: Option<Accelerator>,
}

impl DeviceSelection {
    /// Pick the accelerator when one is available and `use_gpu` asks for it,
    /// the CPU otherwise.
    pub fn select(probe: &dyn AcceleratorProbe, use_gpu: bool) -> Self {
        let accelerator = probe.probe();
        let device = match (accelerator, use_gpu) {
            (Some(accelerator), true) => {
                log::info!("Using GPU ({accelerator}) for inference.");
                Device::Cuda
            }
            (Some(accelerator), false) => {
                log::info!("Using CPU for inference. (but {accelerator} is available!)");
                Device::Cpu
            }
            (None, true) => {
                log::warn!("GPU is not available. Using CPU instead.");
                Device::Cpu
            }
            (None, false) => {
                log::info!("Using CPU for inference.");
                Device::Cpu
            }
        };
        Self {
            device,
            accelerator,
        }
    }

    pub fn is_accelerator_available(&self) -> bool {
        self.accelerator.is_some()
    }

    /// Devices reported to clients. DirectML is never supported.
    pub fn supported_devices(&self) -> DeviceSupport {
        DeviceSupport {
            cpu: true,
            cuda: self.is_accelerator_available(),
            dml: false,
        }
    }
}
