//! Turns two stats responses into a side-by-side table and marks the
//! better value in each row.

pub mod awards;
pub mod export;
pub mod format;
pub mod highlight;
pub mod registry;
pub mod table;

pub use highlight::highlight;
pub use table::{
    Cell, Comparison, Header, Mark, Row, StatContext, build_player_comparison,
    build_team_comparison,
};
