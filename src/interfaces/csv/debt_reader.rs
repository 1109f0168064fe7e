use crate::domain::debt::Debt;
use crate::error::{PlanError, Result};
use std::io::Read;

/// Reads debts from a CSV source.
///
/// Expects the header `id,name,balance,interest_rate,minimum_payment,due_date,debt_type`.
/// Whitespace around fields is trimmed and `debt_type` may be left empty.
pub struct DebtReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> DebtReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily deserializes debts, one result per row.
    pub fn debts(self) -> impl Iterator<Item = Result<Debt>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PlanError::from))
    }
}
