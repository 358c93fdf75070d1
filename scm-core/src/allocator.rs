//! Gap-filling allocator for booking identifiers.
//!
//! Identifiers are `<prefix><zero-padded number>`. The next identifier is the
//! smallest positive number not currently in use, so deleting a booking frees
//! its number for the next one created. Allocation works on a snapshot and is
//! not safe against two writers; the store's primary key catches collisions.

use scm_shared::BookingId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFormat {
    prefix: String,
    width: usize,
}

impl Default for IdFormat {
    fn default() -> Self {
        Self::new("REQ-", 5)
    }
}

impl IdFormat {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into().to_uppercase(),
            width,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn format(&self, number: u32) -> BookingId {
        BookingId(format!("{}{:0width$}", self.prefix, number, width = self.width))
    }

    /// Numeric suffix of an identifier matching this format, any case and
    /// any amount of zero padding.
    pub fn suffix(&self, raw: &str) -> Option<u32> {
        let raw = raw.trim();
        let head = raw.get(..self.prefix.len())?;
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        let digits = &raw[self.prefix.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().filter(|n| *n > 0)
    }

    /// `req-1`, `REQ-0001` and `REQ-00001` all name `REQ-00001`.
    pub fn canonicalize(&self, raw: &str) -> Option<BookingId> {
        self.suffix(raw).map(|n| self.format(n))
    }

    pub fn next_id<'a, I>(&self, existing: I) -> BookingId
    where
        I: IntoIterator<Item = &'a BookingId>,
    {
        let mut used: Vec<u32> = existing
            .into_iter()
            .filter_map(|id| self.suffix(id.as_str()))
            .collect();
        used.sort_unstable();
        used.dedup();

        let mut candidate = 1u32;
        for n in used {
            if n == candidate {
                candidate += 1;
            } else if n > candidate {
                break;
            }
        }
        self.format(candidate)
    }
}
