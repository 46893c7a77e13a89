//! Location of the SPK kernel backing a [`JplEphemeris`](super::JplEphemeris).
//!
//! Sources are written as `"<scheme>:<value>"`:
//!
//! * `naif:DE440` – kernel of that version in the platform cache directory,
//!   `<cache>/astroframes_cache/jpl_ephem/de440.bsp`,
//! * `file:/data/kernels/de440s.bsp` – explicit path.
//!
//! Nothing is downloaded: the kernel must already be on disk.
use std::{fmt, str::FromStr};

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::astro_errors::AstroError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EphemerisSource {
    /// Kernel version name, e.g. `DE440`.
    Naif(String),
    File(Utf8PathBuf),
}

/// Directory holding the cached NAIF kernels.
pub fn kernel_cache_dir() -> Result<Utf8PathBuf, AstroError> {
    let base_dir = BaseDirs::new().ok_or_else(|| {
        AstroError::KernelNotFound("no home directory to locate the kernel cache".to_string())
    })?;
    let cache = Utf8Path::from_path(base_dir.cache_dir()).ok_or_else(|| {
        AstroError::KernelNotFound(format!(
            "non UTF-8 cache directory {}",
            base_dir.cache_dir().display()
        ))
    })?;
    Ok(cache.join("astroframes_cache").join("jpl_ephem"))
}

impl EphemerisSource {
    /// Where the kernel is expected, whether it exists or not.
    pub fn path(&self) -> Result<Utf8PathBuf, AstroError> {
        match self {
            EphemerisSource::Naif(version) => {
                Ok(kernel_cache_dir()?.join(format!("{}.bsp", version.to_lowercase())))
            }
            EphemerisSource::File(path) => Ok(path.clone()),
        }
    }

    /// Path of an existing kernel file.
    pub fn resolve(&self) -> Result<Utf8PathBuf, AstroError> {
        let path = self.path()?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(AstroError::KernelNotFound(path.to_string()))
        }
    }
}

impl FromStr for EphemerisSource {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("naif", version)) if !version.trim().is_empty() => {
                Ok(EphemerisSource::Naif(version.trim().to_string()))
            }
            Some(("file", path)) if !path.is_empty() => {
                Ok(EphemerisSource::File(Utf8PathBuf::from(path)))
            }
            _ => Err(AstroError::InvalidEphemerisSource(s.to_string())),
        }
    }
}

impl fmt::Display for EphemerisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EphemerisSource::Naif(version) => write!(f, "naif:{version}"),
            EphemerisSource::File(path) => write!(f, "file:{path}"),
        }
    }
}
