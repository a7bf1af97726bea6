//! Company information lookups and the salary calculator for cover letters.

pub mod brief;
pub mod clock;
pub mod handlers;
pub mod lookup;
pub mod salary;
pub mod source;

pub use clock::{Clock, SystemClock};
pub use lookup::{CompanyLookup, LookupError};
pub use source::{CompanyInfo, CompanySource, HttpCompanySource, SourceError};
