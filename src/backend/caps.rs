use crate::backend::{BackendKind, ResolvedBackend};

/// Answers which backends can execute on this machine.
///
/// Queries must be cheap and free of side effects; they may be asked repeatedly.
pub trait CapabilityProvider {
    fn cpu_available(&self) -> bool {
        true
    }

    fn gpu_available(&self) -> bool;
}

/// Capabilities of the running process. The GPU probe runs once and is cached.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCapabilities;

impl CapabilityProvider for SystemCapabilities {
    fn gpu_available(&self) -> bool {
        #[cfg(feature = "gpu")]
        {
            crate::backend::gpu::probe_available()
        }
        #[cfg(not(feature = "gpu"))]
        {
            false
        }
    }
}

/// Fixed answers, for tests and for callers that already know the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticCapabilities {
    pub cpu: bool,
    pub gpu: bool,
}

impl StaticCapabilities {
    pub fn cpu_only() -> Self {
        Self {
            cpu: true,
            gpu: false,
        }
    }

    pub fn with_gpu() -> Self {
        Self {
            cpu: true,
            gpu: true,
        }
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn cpu_available(&self) -> bool {
        self.cpu
    }

    fn gpu_available(&self) -> bool {
        self.gpu
    }
}

/// Map a request onto an executable backend. An explicit GPU request never falls back to CPU.
pub fn resolve_backend(
    kind: BackendKind,
    caps: &dyn CapabilityProvider,
) -> Option<ResolvedBackend> {
    match kind {
        BackendKind::Cpu => caps.cpu_available().then_some(ResolvedBackend::Cpu),
        BackendKind::Gpu => caps.gpu_available().then_some(ResolvedBackend::Gpu),
        BackendKind::Auto => {
            if caps.gpu_available() {
                Some(ResolvedBackend::Gpu)
            } else {
                caps.cpu_available().then_some(ResolvedBackend::Cpu)
            }
        }
    }
}

/// Whether `kind` can run here; for [`BackendKind::Auto`], whether any backend can.
pub fn backend_available(kind: BackendKind, caps: &dyn CapabilityProvider) -> bool {
    match kind {
        BackendKind::Cpu => caps.cpu_available(),
        BackendKind::Gpu => caps.gpu_available(),
        BackendKind::Auto => caps.cpu_available() || caps.gpu_available(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/caps.rs"]
mod tests;
