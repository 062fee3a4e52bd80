use serde::{Deserialize, Serialize};

/// Enough about the host to tell benchmark runs on different machines apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareConfig {
    pub os: String,
    pub os_family: String,
    pub architecture: String,
    pub logical_cpus: u64,
}

impl HardwareConfig {
    pub fn detect() -> HardwareConfig {
        // available_parallelism can fail in odd sandboxes; 0 means "unknown" to whoever reads the table.
        let logical_cpus = std::thread::available_parallelism()
            .map(|n| n.get() as u64)
            .unwrap_or(0);

        HardwareConfig {
            os: std::env::consts::OS.to_string(),
            os_family: std::env::consts::FAMILY.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            logical_cpus,
        }
    }
}

#[test]
fn test_detect_matches_compile_target() {
    let hw = HardwareConfig::detect();
    assert_eq!(hw.os, std::env::consts::OS);
    assert_eq!(hw.architecture, std::env::consts::ARCH);

    let value = serde_json::to_value(&hw).unwrap();
    assert!(value.is_object());
    assert_eq!(value["os_family"], std::env::consts::FAMILY);
}
