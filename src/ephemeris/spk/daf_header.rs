//! DAF file record (first 1024 bytes of an SPK kernel).
//!
//! # Layout
//!
//! | bytes      | field                                          |
//! |------------|------------------------------------------------|
//! | 0..8       | `idword`, `"DAF/SPK "` for SPK kernels          |
//! | 8..12      | `nd`, doubles per array summary                |
//! | 12..16     | `ni`, integers per array summary               |
//! | 16..76     | internal file name                             |
//! | 76..88     | `fward`, `bward`, `free`                       |
//! | 88..96     | `locfmt`, `"LTL-IEEE"` or `"BIG-IEEE"`         |
//! | 96..699    | reserved                                       |
//! | 699..727   | FTP validation string                          |
//!
//! Only little-endian kernels are decoded.
use std::fmt;

use nom::{bytes::complete::take, number::complete::le_i32, IResult};

use crate::astro_errors::AstroError;

/// Size in bytes of a DAF physical record.
pub const DAF_RECORD_SIZE: usize = 1024;

#[derive(Debug, PartialEq, Clone)]
pub struct DafHeader {
    pub idword: String,
    pub internal_filename: String,
    /// Number of double-precision components in each summary.
    pub nd: i32,
    /// Number of integer components in each summary.
    pub ni: i32,
    /// Record number (1-based) of the first summary record.
    pub fward: i32,
    /// Record number (1-based) of the last summary record.
    pub bward: i32,
    /// First free address, in double-precision words.
    pub free: i32,
    pub locfmt: String,
    pub ftpstr: String,
}

impl DafHeader {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, idword) = take(8usize)(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, ifname) = take(60usize)(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize)(input)?;
        let (input, _) = take(603usize)(input)?;
        let (input, ftpstr) = take(28usize)(input)?;

        let text = |bytes: &[u8]| {
            String::from_utf8_lossy(bytes)
                .trim_end_matches(['\0', ' '])
                .to_string()
        };

        Ok((
            input,
            DafHeader {
                idword: text(idword),
                internal_filename: text(ifname),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: text(locfmt),
                ftpstr: text(ftpstr),
            },
        ))
    }

    /// Reject files that are not little-endian SPK kernels, or whose summary
    /// layout cannot hold an SPK segment descriptor.
    pub fn check_spk(&self) -> Result<(), AstroError> {
        if self.idword != "DAF/SPK" {
            return Err(AstroError::NomParsingError(format!(
                "not an SPK kernel (idword {:?})",
                self.idword
            )));
        }
        if self.locfmt != "LTL-IEEE" {
            return Err(AstroError::NomParsingError(format!(
                "unsupported binary format {:?}",
                self.locfmt
            )));
        }
        if self.nd < 2 || self.ni < 6 || self.fward < 2 {
            return Err(AstroError::NomParsingError(format!(
                "invalid DAF layout: nd = {}, ni = {}, fward = {}",
                self.nd, self.ni, self.fward
            )));
        }
        Ok(())
    }

    /// Size of one array summary, in double-precision words.
    pub fn summary_size(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

impl fmt::Display for DafHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABEL_WIDTH: usize = 14;
        const VALUE_WIDTH: usize = 40;

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = LABEL_WIDTH + 1,
            value = VALUE_WIDTH + 1
        );
        let rows = [
            ("ID word", self.idword.clone()),
            ("Internal name", self.internal_filename.clone()),
            ("ND / NI", format!("{} / {}", self.nd, self.ni)),
            ("Summaries", format!("records {} to {}", self.fward, self.bward)),
            ("Free address", self.free.to_string()),
            ("Binary format", self.locfmt.clone()),
        ];

        writeln!(f, "{border}")?;
        for (label, value) in rows {
            writeln!(f, "| {label:<LABEL_WIDTH$}| {value:<VALUE_WIDTH$}|")?;
        }
        writeln!(f, "{border}")
    }
}
