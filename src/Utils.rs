//! utility modules used by the binary and the reports
/// terminal and file logging through simplelog
pub mod logger;
/// pretty-printing of the Hessian matrix and of verdicts with tabled
pub mod report_table;
