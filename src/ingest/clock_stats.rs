//! NTP WWV/H reference clock statistics
//!
//! The driver writes one `wwv5` line per minute, cycling through the
//! stations. Fields are separated by spaces or `/`:
//!
//! ```text
//!  0 mjd    1 seconds  2 clock ip  3 wwv5   4 status  5 gain (AGC)
//!  6 yepoch 7 epomax   8 eposnr    9 datsig 10 datsnr
//! 11 WV<MHz>  12 reach 13 metric 14 synmax 15 synsnr 16 min epoch 17 sec epoch
//! 18 WH<MHz>  19 reach 20 metric 21 synmax 22 synsnr 23 min epoch 24 sec epoch
//! 25 delay
//! ```
//!
//! Only the synmax of each station is kept, scaled by the gain.

use super::{IngestError, IngestResult};
use crate::registry::ColumnSpec;

/// Marker identifying a statistics line
pub(super) const IDENT: &str = "wwv5";

/// Carrier frequencies in MHz
pub const STATIONS: [u32; 5] = [2, 5, 10, 15, 20];

/// Minutes per cycle through the stations
const RESOLUTION: u32 = 5;

const FIELD_COUNT: usize = 26;
const GAIN_INDEX: usize = 5;
const WWV_REFID_INDEX: usize = 11;
const WWVH_REFID_INDEX: usize = 18;
/// Offset of synmax after a refid
const SYNMAX_OFFSET: usize = 3;

/// One decoded statistics line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ClockLine {
    pub station: u32,
    /// WWV synmax times gain
    pub vsynmax: i64,
    /// WWVH synmax times gain
    pub hsynmax: i64,
}

impl ClockLine {
    pub fn labels(&self) -> (String, String) {
        (
            format!("vsynmax{}", self.station),
            format!("hsynmax{}", self.station),
        )
    }
}

/// The ten synmax columns, WWV then WWVH per station
pub(super) fn columns() -> Vec<ColumnSpec> {
    STATIONS
        .iter()
        .flat_map(|mhz| {
            [
                ColumnSpec::int(format!("vsynmax{}", mhz), RESOLUTION),
                ColumnSpec::int(format!("hsynmax{}", mhz), RESOLUTION),
            ]
        })
        .collect()
}

/// Station frequency named by a refid such as `WV10`
fn station(refid: &str) -> Option<u32> {
    refid
        .strip_prefix("WV")?
        .parse()
        .ok()
        .filter(|mhz| STATIONS.contains(mhz))
}

fn int_field(tokens: &[&str], idx: usize, name: &str) -> IngestResult<i64> {
    tokens[idx]
        .parse()
        .map_err(|e| IngestError::Parse(format!("{} '{}': {}", name, tokens[idx], e)))
}

/// Decode one `wwv5` line
pub(super) fn parse_line(line: &str) -> IngestResult<ClockLine> {
    let tokens: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == '/')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() < FIELD_COUNT {
        return Err(IngestError::Parse(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            tokens.len()
        )));
    }

    let refid = tokens[WWV_REFID_INDEX];
    let station = station(refid)
        .ok_or_else(|| IngestError::Parse(format!("unknown station refid '{}'", refid)))?;

    let gain = int_field(&tokens, GAIN_INDEX, "gain")?;
    let scaled = |idx: usize, name: &str| -> IngestResult<i64> {
        let synmax = int_field(&tokens, idx, name)?;
        synmax
            .checked_mul(gain)
            .ok_or_else(|| IngestError::Parse(format!("{} {} x gain {} overflows", name, synmax, gain)))
    };

    Ok(ClockLine {
        station,
        vsynmax: scaled(WWV_REFID_INDEX + SYNMAX_OFFSET, "vsynmax")?,
        hsynmax: scaled(WWVH_REFID_INDEX + SYNMAX_OFFSET, "hsynmax")?,
    })
}
