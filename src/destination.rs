//! Where a file belongs: `./<year>/<month name>/<file name>`.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use sortera::destination::canonical_path;
//!
//! let instant = Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();
//! let path = canonical_path("photo.jpg".as_ref(), &instant).unwrap();
//! assert_eq!(path.to_string(), "./2023/Juni/photo.jpg");
//! ```

use chrono::{DateTime, Datelike, Local, TimeZone};
use std::ffi::OsStr;
use std::fs::Metadata;
use std::io;

use crate::error::{OrganizeError, OrganizeResult};
use crate::tree_scanner::TreePath;

/// Month directory names, indexed by calendar month minus one.
pub const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Mars",
    "April",
    "Maj",
    "Juni",
    "Juli",
    "Augusti",
    "September",
    "Oktober",
    "November",
    "December",
];

/// Returns the directory name for a calendar month (1-12).
pub fn month_name(month: u32) -> OrganizeResult<&'static str> {
    month
        .checked_sub(1)
        .and_then(|index| MONTHS.get(index as usize))
        .copied()
        .ok_or(OrganizeError::InvalidMonth(month))
}

/// Computes the path a file should occupy, given its name and the instant
/// that classifies it.
pub fn canonical_path<Tz: TimeZone>(
    file_name: &OsStr,
    instant: &DateTime<Tz>,
) -> OrganizeResult<TreePath> {
    let month = month_name(instant.month())?;
    Ok(TreePath::root()
        .join(format!("{:04}", instant.year()))
        .join(month)
        .join(file_name))
}

/// The instant used to classify a file: its creation time on Windows, its
/// modification time everywhere else.
pub fn classifying_instant(metadata: &Metadata) -> io::Result<DateTime<Local>> {
    #[cfg(windows)]
    let time = metadata.created()?;
    #[cfg(not(windows))]
    let time = metadata.modified()?;

    Ok(DateTime::<Local>::from(time))
}
