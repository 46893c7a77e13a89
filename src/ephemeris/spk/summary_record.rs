//! DAF summary records and SPK segment descriptors.
//!
//! A summary record is one 1024-byte DAF record made of three control words
//! (`next`, `prev`, `nsum`) followed by `nsum` packed array summaries. For
//! SPK kernels each summary holds two doubles (coverage start and end, in ET
//! seconds past J2000) and six integers.
use std::fmt;

use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f64, le_i32},
    IResult,
};

use crate::constants::BodyId;

/// SPK segment descriptor.
#[derive(Debug, PartialEq, Clone)]
pub struct Summary {
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub target: BodyId,
    pub center: BodyId,
    pub frame_id: i32,
    pub data_type: i32,
    /// First word (1-based) of the segment data.
    pub initial_addr: i32,
    /// Last word (1-based) of the segment data.
    pub final_addr: i32,
}

impl Summary {
    /// Decode one packed summary of `nd` doubles and `ni` integers.
    ///
    /// Extra components beyond the six SPK integers are skipped.
    pub fn parse(input: &[u8], nd: usize, ni: usize) -> IResult<&[u8], Self> {
        let (input, start_epoch) = le_f64(input)?;
        let (input, end_epoch) = le_f64(input)?;
        let (input, _) = count(le_f64, nd.saturating_sub(2))(input)?;

        let (input, target) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, frame_id) = le_i32(input)?;
        let (input, data_type) = le_i32(input)?;
        let (input, initial_addr) = le_i32(input)?;
        let (input, final_addr) = le_i32(input)?;
        let (input, _) = count(le_i32, ni.saturating_sub(6))(input)?;

        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target,
                center,
                frame_id,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    pub fn covers(&self, et: f64) -> bool {
        (self.start_epoch..=self.end_epoch).contains(&et)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "segment {} -> {} (frame {}, type {}) [{}, {}] ET s, words {}..={}",
            self.center,
            self.target,
            self.frame_id,
            self.data_type,
            self.start_epoch,
            self.end_epoch,
            self.initial_addr,
            self.final_addr
        )
    }
}

/// Content of one summary record.
#[derive(Debug, PartialEq, Clone)]
pub struct SummaryRecord {
    /// Record number of the next summary record, 0 for the last one.
    pub next: usize,
    pub summaries: Vec<Summary>,
}

impl SummaryRecord {
    /// Decode a full summary record.
    ///
    /// `summary_size` is the stride between summaries, in words
    /// (`nd + ceil(ni / 2)`).
    pub fn parse(
        input: &[u8],
        nd: usize,
        ni: usize,
        summary_size: usize,
    ) -> IResult<&[u8], Self> {
        let (input, next) = le_f64(input)?;
        let (input, _prev) = le_f64(input)?;
        let (mut input, nsum) = le_f64(input)?;

        let mut summaries = Vec::new();
        for _ in 0..nsum as usize {
            let (_, summary) = Summary::parse(input, nd, ni)?;
            let (rest, _) = take(summary_size * 8)(input)?;
            summaries.push(summary);
            input = rest;
        }

        Ok((
            input,
            SummaryRecord {
                next: next as usize,
                summaries,
            },
        ))
    }
}
