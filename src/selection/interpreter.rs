//! Turns the model's free-text reply into a batch member.
//!
//! Everything here is pure: the same reply and batch always give the same answer.

/// Anything in a batch that can be matched by file name.
pub trait Named {
    /// The file name used for by-name resolution.
    fn name(&self) -> &str;
}

impl<T: Named> Named for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Parse the 1-based sequence number in `reply` and convert it to a 0-based index.
///
/// The reply is trimmed and its leading integer is read (an optional sign followed
/// by decimal digits; anything after the digits is ignored). Returns `None` when
/// there are no digits, or the number is `<= 0` or `> batch_len`. Out-of-range
/// numbers are never clamped.
#[must_use]
pub fn parse_best_index(reply: &str, batch_len: usize) -> Option<usize> {
    let trimmed = reply.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() || negative {
        return None;
    }

    // Overflow means the number is larger than any batch.
    let number: usize = digits.parse().ok()?;
    if number == 0 || number > batch_len {
        return None;
    }
    Some(number - 1)
}

/// The outcome of resolving a reply against a batch.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a, T> {
    /// A batch member was found.
    Resolved {
        /// 0-based position of the member in the batch.
        index: usize,
        /// The member itself.
        item: &'a T,
    },
    /// Neither strategy matched; the batch stays unselected.
    Unresolved,
}

impl<'a, T> Resolution<'a, T> {
    /// The resolved member, if any.
    #[must_use]
    pub fn item(&self) -> Option<&'a T> {
        match self {
            Self::Resolved { item, .. } => Some(*item),
            Self::Unresolved => None,
        }
    }

    /// The resolved position, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Resolved { index, .. } => Some(*index),
            Self::Unresolved => None,
        }
    }
}

/// A way of finding the selected member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    ByIndex,
    ByName,
}

/// Strategies are tried in this order; the first hit wins.
const STRATEGIES: [Strategy; 2] = [Strategy::ByIndex, Strategy::ByName];

/// Resolve a 0-based index and/or a file name to a member of `batch`.
///
/// The index is tried first and must be in range. The name is then matched
/// case-insensitively against each member's full name.
#[must_use]
pub fn resolve<'a, T: Named>(
    batch: &'a [T],
    index: Option<usize>,
    name: Option<&str>,
) -> Resolution<'a, T> {
    let wanted = name.map(str::to_lowercase);
    STRATEGIES
        .iter()
        .find_map(|strategy| match strategy {
            Strategy::ByIndex => index.and_then(|i| batch.get(i).map(|item| (i, item))),
            Strategy::ByName => wanted.as_deref().and_then(|wanted| {
                batch.iter().enumerate().find(|(_, item)| item.name().to_lowercase() == wanted)
            }),
        })
        .map_or(Resolution::Unresolved, |(index, item)| Resolution::Resolved { index, item })
}

/// Parse a reply and resolve it against `batch` by position.
#[must_use]
pub fn interpret<'a, T: Named>(reply: &str, batch: &'a [T]) -> Resolution<'a, T> {
    resolve(batch, parse_best_index(reply, batch.len()), None)
}
