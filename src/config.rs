// src/config.rs

/// Process-wide codec constants.
///
/// The default configuration matches files produced by ATC recorders. A
/// custom configuration is only needed to read or produce files with a
/// different version stamp or defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Magic bytes at the start of every file
    pub signature: [u8; 5],
    /// Version written into new files
    pub version: u32,
    /// Value of the format block's `ecg_format` field for new files
    pub ecg_format: u8,
    /// Nanovolts per sample unit for new files
    pub resolution_nv: u16,
}

impl CodecConfig {
    pub const DEFAULT: CodecConfig = CodecConfig {
        signature: *b"ALIVE",
        version: 3,
        ecg_format: 1,
        resolution_nv: 500,
    };
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
