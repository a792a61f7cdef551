//! Grouped counter extraction from screen output.
//!
//! Counter screens such as `show mac address-table count` print a label
//! line (`Mac Entries for Vlan 10:`) and, a fixed number of lines further
//! down, the line carrying that group's count. [`CounterScan`] consumes
//! such label/value pairs and blanks them so that a final catch-all pass
//! only sees what is left, typically the overall total.

use once_cell::sync::Lazy;
use regex::Regex;

use netval_common::{FormatError, FormatResult};

/// Trailing integer on a value line (`Total Mac Addresses    : 5`).
static TRAILING_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*$").expect("valid trailing count regex"));

/// A mutable view over raw lines that blanks lines as they are consumed.
#[derive(Debug, Clone)]
pub struct CounterScan {
    lines: Vec<String>,
}

impl CounterScan {
    /// Creates a scan over a copy of `lines`.
    pub fn new(lines: &[String]) -> Self {
        Self {
            lines: lines.to_vec(),
        }
    }

    /// Consumes every `label` match together with the line `offset` lines
    /// below it.
    ///
    /// `label` must have one capture group naming the group. The count is
    /// the trailing integer of the value line.
    ///
    /// # Errors
    ///
    /// [`FormatError::InvalidValue`] if the value line is missing or holds
    /// no count.
    pub fn take_grouped(&mut self, label: &Regex, offset: usize) -> FormatResult<Vec<(String, i64)>> {
        let mut groups = Vec::new();
        for i in 0..self.lines.len() {
            let name = match label.captures(&self.lines[i]).and_then(|c| c.get(1)) {
                Some(m) => m.as_str().to_string(),
                None => continue,
            };
            let value_line = self
                .lines
                .get(i + offset)
                .ok_or_else(|| FormatError::invalid(name.clone(), "<end of output>"))?;
            let count = trailing_count(value_line)
                .ok_or_else(|| FormatError::invalid(name.clone(), value_line.trim()))?;
            self.lines[i].clear();
            self.lines[i + offset].clear();
            groups.push((name, count));
        }
        Ok(groups)
    }

    /// Returns the count on the first remaining line matching `total`.
    pub fn take_total(&mut self, total: &Regex) -> Option<i64> {
        let line = self.lines.iter_mut().find(|l| total.is_match(l.as_str()))?;
        let count = trailing_count(line);
        line.clear();
        count
    }

    /// Lines not consumed so far.
    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
    }
}

fn trailing_count(line: &str) -> Option<i64> {
    TRAILING_COUNT
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_grouped_then_total() {
        let label = Regex::new(r"^Group (\w+)").unwrap();
        let total = Regex::new(r"^Total").unwrap();
        let mut scan = CounterScan::new(&lines("Group a\ncount 3\nGroup b\ncount 4\nTotal 7"));
        let groups = scan.take_grouped(&label, 1).unwrap();
        assert_eq!(groups, vec![("a".to_string(), 3), ("b".to_string(), 4)]);
        assert_eq!(scan.take_total(&total), Some(7));
        assert_eq!(scan.remaining().count(), 0);
    }

    #[test]
    fn test_consumed_value_line_not_seen_by_total() {
        let label = Regex::new(r"^Vlan (\d+)").unwrap();
        let total = Regex::new(r"^Total").unwrap();
        let mut scan = CounterScan::new(&lines("Vlan 10\nTotal 2\nTotal 9"));
        scan.take_grouped(&label, 1).unwrap();
        assert_eq!(scan.take_total(&total), Some(9));
    }

    #[test]
    fn test_missing_value_line_is_error() {
        let label = Regex::new(r"^Vlan (\d+)").unwrap();
        let mut scan = CounterScan::new(&lines("Vlan 10"));
        assert!(matches!(
            scan.take_grouped(&label, 4),
            Err(FormatError::InvalidValue { .. })
        ));
    }
}
