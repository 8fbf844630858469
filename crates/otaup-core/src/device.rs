use tracing::warn;

/// Sentinel returned by probes when a value cannot be detected.
pub const UNKNOWN: &str = "Unknown";

/// SoC model of the head unit, as reported by the device probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuModel {
    Uis8581a,
    Uis8141e,
    Unknown,
}

impl CpuModel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uis8581a => "UIS8581A",
            Self::Uis8141e => "UIS8141E",
            Self::Unknown => UNKNOWN,
        }
    }

    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_uppercase().as_str() {
            "UIS8581A" => Self::Uis8581a,
            "UIS8141E" => Self::Uis8141e,
            _ => Self::Unknown,
        }
    }

    /// MCU firmware line paired with this SoC. Unknown SoCs fall back to
    /// L6315, matching the shipping bucket layout.
    pub fn mcu_tag(self) -> McuTag {
        match self {
            Self::Uis8581a => McuTag::L6315,
            Self::Uis8141e => McuTag::L6523,
            Self::Unknown => {
                warn!("unknown CPU model, defaulting MCU tag to L6315");
                McuTag::L6315
            }
        }
    }
}

/// Firmware tag of the MCU companion processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuTag {
    L6315,
    L6523,
}

impl McuTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L6315 => "L6315",
            Self::L6523 => "L6523",
        }
    }

    /// Version token carried by MCU candidates, e.g. `L6315_MCU`.
    pub fn version_token(self) -> String {
        format!("{}_MCU", self.as_str())
    }

    /// Object file name in the MCU catalog folder, e.g. `L6315_MCU.zip`.
    pub fn archive_name(self) -> String {
        format!("{}_MCU.zip", self.as_str())
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "L6315" => Some(Self::L6315),
            "L6523" => Some(Self::L6523),
            _ => None,
        }
    }
}

/// CPU model plus normalized screen resolution, built once per session and
/// used only to filter the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFingerprint {
    pub cpu: CpuModel,
    pub resolution: String,
}

impl DeviceFingerprint {
    pub fn new(cpu: CpuModel, raw_resolution: &str) -> Self {
        Self {
            cpu,
            resolution: normalize_resolution(raw_resolution),
        }
    }

    pub fn from_probe(probe: &dyn DeviceProbe) -> Self {
        Self::new(probe.cpu_model(), &probe.resolution())
    }

    /// `<CPU>_<WxH>` segment as it appears in catalog object names.
    pub fn catalog_token(&self) -> String {
        format!("{}_{}", self.cpu.as_str(), self.resolution)
    }
}

/// Normalizes a `WxH` resolution string so the smaller dimension comes
/// first, which is how the catalog names its objects. Unparseable input is
/// returned as-is.
pub fn normalize_resolution(raw: &str) -> String {
    let Some((w, h)) = raw.trim().split_once('x') else {
        return raw.trim().to_string();
    };
    match (w.parse::<u32>(), h.parse::<u32>()) {
        (Ok(w), Ok(h)) if w > h => format!("{h}x{w}"),
        (Ok(w), Ok(h)) => format!("{w}x{h}"),
        _ => {
            warn!(resolution = raw, "unparseable resolution, using raw value");
            raw.trim().to_string()
        }
    }
}

/// Hardware detection surface. Implementations never fail; they report the
/// `Unknown` sentinel when a value cannot be determined.
pub trait DeviceProbe: Send + Sync {
    fn cpu_model(&self) -> CpuModel;
    /// Screen resolution as `WxH`, or `Unknown`.
    fn resolution(&self) -> String;
    /// System build date as 8 digits `YYYYMMDD`, or `Unknown`.
    fn system_build_date(&self) -> String;
    /// App bundle build date as 8 digits `YYYYMMDD`, or `Unknown`.
    fn app_build_timestamp(&self) -> String;
}

/// Probe with values fixed up front, for configuration-driven hosts and
/// tests.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    pub cpu: CpuModel,
    pub resolution: String,
    pub system_build_date: String,
    pub app_build_timestamp: String,
}

impl Default for StaticProbe {
    fn default() -> Self {
        Self {
            cpu: CpuModel::Unknown,
            resolution: UNKNOWN.to_string(),
            system_build_date: UNKNOWN.to_string(),
            app_build_timestamp: UNKNOWN.to_string(),
        }
    }
}

impl DeviceProbe for StaticProbe {
    fn cpu_model(&self) -> CpuModel {
        self.cpu
    }

    fn resolution(&self) -> String {
        self.resolution.clone()
    }

    fn system_build_date(&self) -> String {
        self.system_build_date.clone()
    }

    fn app_build_timestamp(&self) -> String {
        self.app_build_timestamp.clone()
    }
}
