pub mod debt_reader;
pub mod schedule_writer;
