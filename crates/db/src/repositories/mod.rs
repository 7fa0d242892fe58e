pub mod progress_repo;
