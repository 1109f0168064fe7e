use crate::domain::schedule::PaymentPeriod;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PeriodRow {
    month: u32,
    principal: Decimal,
    interest: Decimal,
    total_payment: Decimal,
    remaining_balance: Decimal,
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp(2).normalize()
}

impl From<&PaymentPeriod> for PeriodRow {
    fn from(period: &PaymentPeriod) -> Self {
        Self {
            month: period.month,
            principal: cents(period.principal),
            interest: cents(period.interest),
            total_payment: cents(period.total_payment),
            remaining_balance: cents(period.remaining_balance),
        }
    }
}

/// Writes a payment schedule as CSV, amounts rounded to cents.
pub struct ScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ScheduleWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_periods<'a>(
        &mut self,
        periods: impl IntoIterator<Item = &'a PaymentPeriod>,
    ) -> Result<()> {
        for period in periods {
            self.writer.serialize(PeriodRow::from(period))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
