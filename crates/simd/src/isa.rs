use std::sync::OnceLock;

/// Instruction-set level the specialized kernels may use.
///
/// Levels are ordered, so `level >= IsaLevel::Sse3` means every SSE3 kernel
/// is allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsaLevel {
    Portable,
    Sse2,
    Sse3,
    Avx,
}

impl IsaLevel {
    pub const ALL: [IsaLevel; 4] = [
        IsaLevel::Portable,
        IsaLevel::Sse2,
        IsaLevel::Sse3,
        IsaLevel::Avx,
    ];

    /// Highest level supported by this CPU, probed once per process.
    ///
    /// `KPM_SIMD=portable|sse2|sse3|avx` caps the result, which is handy for
    /// comparing kernels on the same machine.
    pub fn detect() -> Self {
        static LEVEL: OnceLock<IsaLevel> = OnceLock::new();
        *LEVEL.get_or_init(|| {
            let probed = probe();
            match std::env::var("KPM_SIMD").ok().and_then(|v| Self::parse(&v)) {
                Some(cap) => probed.min(cap),
                None => probed,
            }
        })
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "portable" | "scalar" => Some(IsaLevel::Portable),
            "sse2" => Some(IsaLevel::Sse2),
            "sse3" => Some(IsaLevel::Sse3),
            "avx" => Some(IsaLevel::Avx),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IsaLevel::Portable => "portable",
            IsaLevel::Sse2 => "sse2",
            IsaLevel::Sse3 => "sse3",
            IsaLevel::Avx => "avx",
        }
    }

    pub fn is_available(self) -> bool {
        self <= Self::detect()
    }
}

#[cfg(target_arch = "x86_64")]
fn probe() -> IsaLevel {
    if is_x86_feature_detected!("avx") {
        IsaLevel::Avx
    } else if is_x86_feature_detected!("sse3") {
        IsaLevel::Sse3
    } else {
        // SSE2 is part of the x86_64 baseline.
        IsaLevel::Sse2
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn probe() -> IsaLevel {
    IsaLevel::Portable
}
