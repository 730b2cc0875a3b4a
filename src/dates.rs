/// Inclusive range of calendar dates stepped one day at a time.
///
/// The range is a value: iterating it does not consume it, so the same range
/// can be walked again (for computing, then for validating the output).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
}

impl DateRange {
    pub fn new(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn start(&self) -> chrono::NaiveDate {
        self.start
    }

    pub fn end(&self) -> chrono::NaiveDate {
        self.end
    }

    /// Number of dates in the range; zero when `end` precedes `start`.
    pub fn len(&self) -> usize {
        let days = self.end.signed_duration_since(self.start).num_days();
        if days < 0 { 0 } else { days as usize + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn iter(&self) -> DateIter {
        DateIter {
            next: if self.is_empty() { None } else { Some(self.start) },
            end: self.end,
        }
    }
}

impl<'a> IntoIterator for &'a DateRange {
    type Item = chrono::NaiveDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

/// Lazy iterator over a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DateIter {
    next: Option<chrono::NaiveDate>,
    end: chrono::NaiveDate,
}

impl Iterator for DateIter {
    type Item = chrono::NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = current.succ_opt();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(next) => DateRange::new(next, self.end).len(),
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateIter {}
