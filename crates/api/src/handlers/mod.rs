pub mod runs;
pub mod sprints;
