pub mod bead;
pub mod series;
pub mod session;
pub mod style;

pub use bead::{BeadRecord, BeadTable, ClassValue, IssueKind, RowIssue};
pub use series::RawSeries;
pub use session::{Rendered, Session, SessionError};
pub use style::{ClassEntry, ClassStyle, ResolvedStyle};
