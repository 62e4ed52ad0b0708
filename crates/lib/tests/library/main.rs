mod common;
mod compose_tests;
mod project_tests;
