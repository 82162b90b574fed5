//! Parser for cpu-list expressions (`"0,2-4,7"`).
//!
//! Grammar: comma-separated tokens, each `N` or `N-M` with `0 <= N <= M`.
//! Only ASCII digits are accepted in numbers; signs, whitespace inside a
//! token and empty tokens are rejected. An empty (or all-whitespace)
//! expression is the empty set.

use core::str::FromStr;

use cyclicdl_errors::CpuSetError;

use crate::interval::{CpuInterval, CpuIntervalSet};

/// Parse `expr` and check that every CPU lies in `[0, cpu_count)`.
///
/// # Errors
///
/// - [`CpuSetError::InvalidRangeSyntax`] for a malformed token
/// - [`CpuSetError::CpuOutOfRange`] if a CPU is `>= cpu_count`
///
/// # Example
///
/// ```
/// use cyclicdl_cpuset::parse;
///
/// let set = parse("1-3,3-5", 8)?;
/// assert_eq!(set.to_string(), "1-5");
/// assert!(parse("3-1", 8).is_err());
/// # Ok::<(), cyclicdl_cpuset::CpuSetError>(())
/// ```
pub fn parse(expr: &str, cpu_count: usize) -> Result<CpuIntervalSet, CpuSetError> {
    let set: CpuIntervalSet = expr.parse()?;
    set.total_cpus(cpu_count)?;
    Ok(set)
}

impl FromStr for CpuIntervalSet {
    type Err = CpuSetError;

    /// Parse without a CPU-count bound.
    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let expr = expr.trim();
        let mut set = CpuIntervalSet::new();
        if expr.is_empty() {
            return Ok(set);
        }

        for token in expr.split(',') {
            set.insert(parse_token(token)?);
        }
        Ok(set)
    }
}

impl FromStr for CpuInterval {
    type Err = CpuSetError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        parse_token(token)
    }
}

fn parse_token(token: &str) -> Result<CpuInterval, CpuSetError> {
    match token.split_once('-') {
        None => parse_cpu(token, token).map(CpuInterval::single),
        Some((start, end)) => {
            let start = parse_cpu(start, token)?;
            let end = parse_cpu(end, token)?;
            CpuInterval::new(start, end)
                .ok_or_else(|| CpuSetError::syntax(token, "end is below start"))
        }
    }
}

fn parse_cpu(digits: &str, token: &str) -> Result<u32, CpuSetError> {
    if digits.is_empty() {
        return Err(CpuSetError::syntax(token, "missing CPU number"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CpuSetError::syntax(token, "not a non-negative integer"));
    }
    digits
        .parse()
        .ok()
        .ok_or_else(|| CpuSetError::syntax(token, "CPU number too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_reason(result: Result<CpuIntervalSet, CpuSetError>) -> String {
        match result {
            Err(CpuSetError::InvalidRangeSyntax { reason, .. }) => reason,
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_example() -> Result<(), CpuSetError> {
        let set = parse("0,2-4,5", 8)?;
        assert_eq!(set.render(), "0,2-5");
        assert_eq!(set.complement(8).render(), "1,6-7");
        Ok(())
    }

    #[test]
    fn test_parse_overlapping() -> Result<(), CpuSetError> {
        let set: CpuIntervalSet = "1-3,3-5".parse()?;
        assert_eq!(set.render(), "1-5");
        Ok(())
    }

    #[test]
    fn test_parse_empty() -> Result<(), CpuSetError> {
        assert!(parse("", 4)?.is_empty());
        assert!(parse("   ", 4)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_single_cpu_is_degenerate() -> Result<(), CpuSetError> {
        let set = parse("3", 4)?;
        let only = set.intervals();
        assert_eq!(only.len(), 1);
        assert!(only.iter().all(|iv| iv.start() == 3 && iv.end() == 3));
        Ok(())
    }

    #[test]
    fn test_parse_reversed_range_fails() {
        assert_eq!(syntax_reason(parse("3-1", 8)), "end is below start");
    }

    #[test]
    fn test_parse_negative_fails() {
        assert_eq!(syntax_reason(parse("-1", 8)), "missing CPU number");
        assert_eq!(syntax_reason(parse("0,-2", 8)), "missing CPU number");
    }

    #[test]
    fn test_parse_non_numeric_fails() {
        assert_eq!(syntax_reason(parse("a", 8)), "not a non-negative integer");
        assert_eq!(syntax_reason(parse("1-b", 8)), "not a non-negative integer");
        assert_eq!(syntax_reason(parse("+1", 8)), "not a non-negative integer");
        assert_eq!(syntax_reason(parse("1-2-3", 8)), "not a non-negative integer");
    }

    #[test]
    fn test_parse_empty_token_fails() {
        assert_eq!(syntax_reason(parse("0,,1", 8)), "missing CPU number");
        assert_eq!(syntax_reason(parse("0,", 8)), "missing CPU number");
    }

    #[test]
    fn test_parse_huge_number_fails() {
        assert_eq!(syntax_reason(parse("99999999999", 8)), "CPU number too large");
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(
            parse("0-8", 8),
            Err(CpuSetError::CpuOutOfRange { cpu: 8, cpu_count: 8 })
        ));
    }

    #[test]
    fn test_parse_unbounded_accepts_large_cpus() -> Result<(), CpuSetError> {
        let set: CpuIntervalSet = "1000-1003".parse()?;
        assert_eq!(set.total_cpus(2048)?, 4);
        Ok(())
    }
}
